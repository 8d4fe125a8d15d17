pub mod error;
pub mod ids;

pub use error::StoreError;
pub use ids::{PatientId, StaffId};
