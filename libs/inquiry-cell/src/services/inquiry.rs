// libs/inquiry-cell/src/services/inquiry.rs
use std::sync::Arc;

use chrono::Utc;
use directory_cell::store::StaffDirectory;
use shared_models::{PatientId, StaffId};
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::{Inquiry, InquiryError, InquiryStatus};
use crate::store::InquiryStore;

/// Routes patient questions to doctors and tracks the reply lifecycle:
/// pending until the doctor answers, then replied, then closed.
pub struct InquiryService {
    directory: Arc<dyn StaffDirectory>,
    store: Arc<dyn InquiryStore>,
}

impl InquiryService {
    pub fn new(directory: Arc<dyn StaffDirectory>, store: Arc<dyn InquiryStore>) -> Self {
        Self { directory, store }
    }

    /// Submit a question to a doctor. The target must exist and actually be
    /// a doctor; inquiries cannot be addressed to other staff.
    pub async fn submit(
        &self,
        patient_id: PatientId,
        doctor_id: StaffId,
        symptoms: String,
    ) -> Result<Inquiry, InquiryError> {
        let staff = self.directory.get(&doctor_id).await?;
        if !staff.map(|s| s.is_doctor).unwrap_or(false) {
            return Err(InquiryError::NotADoctor(doctor_id));
        }

        let inquiry = Inquiry::new(patient_id, doctor_id, symptoms);
        self.store.insert(inquiry.clone()).await?;
        info!(
            "Inquiry {} submitted to doctor {}",
            inquiry.id, inquiry.doctor_id
        );
        Ok(inquiry)
    }

    /// Record the doctor's answer. Only pending inquiries accept a reply.
    pub async fn reply(&self, inquiry_id: Uuid, reply: String) -> Result<Inquiry, InquiryError> {
        let mut inquiry = self
            .store
            .fetch(inquiry_id)
            .await?
            .ok_or(InquiryError::InquiryNotFound(inquiry_id))?;

        if inquiry.status != InquiryStatus::Pending {
            return Err(InquiryError::NotPending(inquiry.status));
        }

        inquiry.status = InquiryStatus::Replied;
        inquiry.reply = Some(reply);
        inquiry.replied_at = Some(Utc::now());
        self.store.update(inquiry.clone()).await?;
        info!("Inquiry {} replied", inquiry.id);
        Ok(inquiry)
    }

    /// Close an inquiry in any non-closed state. Closing is idempotent.
    pub async fn close(&self, inquiry_id: Uuid) -> Result<Inquiry, InquiryError> {
        let mut inquiry = self
            .store
            .fetch(inquiry_id)
            .await?
            .ok_or(InquiryError::InquiryNotFound(inquiry_id))?;

        if inquiry.status == InquiryStatus::Closed {
            debug!("Inquiry {} already closed", inquiry.id);
            return Ok(inquiry);
        }

        inquiry.status = InquiryStatus::Closed;
        self.store.update(inquiry.clone()).await?;
        info!("Inquiry {} closed", inquiry.id);
        Ok(inquiry)
    }

    /// The doctor's work queue: unanswered inquiries, oldest first.
    pub async fn pending_for_doctor(
        &self,
        doctor_id: &StaffId,
    ) -> Result<Vec<Inquiry>, InquiryError> {
        let mut queue = self.store.pending_for_doctor(doctor_id).await?;
        queue.sort_by_key(|inq| inq.asked_at);
        Ok(queue)
    }

    /// Everything a patient has asked, newest first.
    pub async fn history_for_patient(
        &self,
        patient_id: &PatientId,
    ) -> Result<Vec<Inquiry>, InquiryError> {
        let mut history = self.store.for_patient(patient_id).await?;
        history.sort_by(|a, b| b.asked_at.cmp(&a.asked_at));
        Ok(history)
    }
}
