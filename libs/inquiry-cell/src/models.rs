// libs/inquiry-cell/src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared_models::{PatientId, StaffId, StoreError};
use uuid::Uuid;

/// A written question from a patient to a specific doctor, answered
/// asynchronously outside any appointment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inquiry {
    pub id: Uuid,
    pub patient_id: PatientId,
    pub doctor_id: StaffId,
    pub asked_at: DateTime<Utc>,
    pub symptoms: String,
    pub status: InquiryStatus,
    pub reply: Option<String>,
    pub replied_at: Option<DateTime<Utc>>,
}

impl Inquiry {
    pub fn new(patient_id: PatientId, doctor_id: StaffId, symptoms: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            patient_id,
            doctor_id,
            asked_at: Utc::now(),
            symptoms,
            status: InquiryStatus::Pending,
            reply: None,
            replied_at: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InquiryStatus {
    Pending,
    Replied,
    Closed,
}

impl std::fmt::Display for InquiryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            InquiryStatus::Pending => "pending",
            InquiryStatus::Replied => "replied",
            InquiryStatus::Closed => "closed",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InquiryError {
    #[error("Inquiry not found: {0}")]
    InquiryNotFound(Uuid),

    #[error("Staff member {0} is not a doctor or does not exist")]
    NotADoctor(StaffId),

    #[error("Inquiry is {0}, only pending inquiries can be replied to")]
    NotPending(InquiryStatus),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
