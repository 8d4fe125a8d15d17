pub mod availability;
pub mod registry;

pub use availability::AvailabilityService;
pub use registry::PatientRegistry;
