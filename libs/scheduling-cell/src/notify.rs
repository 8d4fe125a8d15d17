// libs/scheduling-cell/src/notify.rs
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared_models::PatientId;
use uuid::Uuid;

/// Raised for every appointment displaced by an emergency insertion. The
/// scheduler only signals; delivery (SMS, app push) is the notification
/// collaborator's concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RescheduleNotice {
    pub appointment_id: Uuid,
    pub patient_id: PatientId,
    pub previous_time: DateTime<Utc>,
    pub new_time: DateTime<Utc>,
    pub reason: NoticeReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeReason {
    EmergencyDisplacement,
}

#[async_trait]
pub trait PatientNotifier: Send + Sync {
    async fn notify(&self, notice: RescheduleNotice);
}

/// Drops every notice; for deployments without a delivery channel wired up.
pub struct NullNotifier;

#[async_trait]
impl PatientNotifier for NullNotifier {
    async fn notify(&self, notice: RescheduleNotice) {
        tracing::debug!(
            "Dropping reschedule notice for appointment {} (no notifier configured)",
            notice.appointment_id
        );
    }
}
