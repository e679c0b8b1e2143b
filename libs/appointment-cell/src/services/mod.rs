pub mod booking;
pub mod export;
pub mod lifecycle;
pub mod payment;
pub mod pricing;
pub mod records;
pub mod report;
pub mod uploads;

pub use booking::AppointmentBookingService;
pub use lifecycle::AppointmentLifecycleService;
pub use payment::PaymentService;
pub use pricing::PricingService;
pub use records::AppointmentRecordService;
pub use report::ReportService;
pub use uploads::UploadService;
