// libs/inquiry-cell/src/store.rs
use async_trait::async_trait;
use shared_models::{PatientId, StaffId, StoreError};
use uuid::Uuid;

use crate::models::Inquiry;

#[async_trait]
pub trait InquiryStore: Send + Sync {
    async fn insert(&self, inquiry: Inquiry) -> Result<(), StoreError>;

    async fn fetch(&self, id: Uuid) -> Result<Option<Inquiry>, StoreError>;

    /// Replace the stored inquiry with the same id. `NotFound` if absent.
    async fn update(&self, inquiry: Inquiry) -> Result<(), StoreError>;

    async fn pending_for_doctor(&self, doctor_id: &StaffId) -> Result<Vec<Inquiry>, StoreError>;

    async fn for_patient(&self, patient_id: &PatientId) -> Result<Vec<Inquiry>, StoreError>;
}
