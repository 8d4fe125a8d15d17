// libs/inquiry-cell/src/lib.rs
pub mod models;
pub mod services;
pub mod store;

pub use models::{Inquiry, InquiryError, InquiryStatus};
pub use services::InquiryService;
pub use store::InquiryStore;
