pub mod models;
pub mod notify;
pub mod services;
pub mod store;

pub use models::*;
pub use notify::{NoticeReason, PatientNotifier, RescheduleNotice};
pub use services::*;
pub use store::AppointmentStore;
