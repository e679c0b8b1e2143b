//! Typed client for the clinic API plus the booking-form state the
//! booking page drives.

pub mod api;
pub mod booking;
pub mod error;
pub mod flow;
pub mod models;
pub mod session;

pub use api::ApiClient;
pub use booking::{BookingAction, BookingForm, FormIssue};
pub use error::ClientError;
pub use flow::{BookingFlow, PaymentWidget};
pub use session::AuthSession;
