pub mod doctor;
pub mod availability;

pub use doctor::DoctorService;
pub use availability::AvailabilityService;
