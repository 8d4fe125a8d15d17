// libs/scheduling-cell/src/store.rs
//
// Persistence collaborator trait for the appointment store, the one shared
// mutable resource in the scheduler. The snapshot/commit pair is the
// mechanism behind every atomicity guarantee: a commit carries the version
// token of the snapshot it reasoned over and is rejected wholesale if that
// slice of the store has moved on.

use async_trait::async_trait;
use chrono::NaiveDate;
use shared_models::{PatientId, StoreError};
use uuid::Uuid;

use crate::models::{
    Appointment, AppointmentStatus, ScanScope, ScheduleCommit, ScheduleSnapshot,
};

#[async_trait]
pub trait AppointmentStore: Send + Sync {
    async fn fetch(&self, id: Uuid) -> Result<Option<Appointment>, StoreError>;

    /// All appointments in scope plus the version token a later commit must
    /// present.
    async fn snapshot(&self, scope: ScanScope) -> Result<ScheduleSnapshot, StoreError>;

    /// Apply updates and inserts atomically, or fail with
    /// `StoreError::VersionConflict` when the basis version is stale.
    async fn commit(&self, commit: ScheduleCommit) -> Result<(), StoreError>;

    /// Durable single-record replacement, used by lifecycle transitions.
    /// `StoreError::NotFound` if the appointment does not exist.
    async fn update(&self, appointment: Appointment) -> Result<(), StoreError>;

    // Read-only projections; ordering is applied by the view service.

    async fn on_date(&self, date: NaiveDate) -> Result<Vec<Appointment>, StoreError>;

    async fn for_patient(&self, patient_id: &PatientId) -> Result<Vec<Appointment>, StoreError>;

    async fn with_status(
        &self,
        status: AppointmentStatus,
    ) -> Result<Vec<Appointment>, StoreError>;
}
