// libs/directory-cell/src/store.rs
//
// Persistence collaborator traits for the staff directory. Backends must
// provide durable, atomic single-record writes; everything here is
// read-mostly compared to the appointment store.

use async_trait::async_trait;
use shared_models::{PatientId, StaffId, StoreError};

use crate::models::{Patient, StaffMember, WeeklyAvailability};

#[async_trait]
pub trait StaffDirectory: Send + Sync {
    async fn get(&self, id: &StaffId) -> Result<Option<StaffMember>, StoreError>;

    async fn list(&self) -> Result<Vec<StaffMember>, StoreError>;

    /// Case-insensitive exact match on the display name.
    async fn find_by_name(&self, name: &str) -> Result<Option<StaffMember>, StoreError>;
}

/// Keyed by staff identifier, so the at-most-one-record-per-staff invariant
/// is structural rather than checked.
#[async_trait]
pub trait AvailabilityStore: Send + Sync {
    async fn get(&self, staff_id: &StaffId) -> Result<Option<WeeklyAvailability>, StoreError>;

    async fn upsert(
        &self,
        staff_id: &StaffId,
        week: WeeklyAvailability,
    ) -> Result<(), StoreError>;
}

#[async_trait]
pub trait PatientStore: Send + Sync {
    async fn get(&self, id: &PatientId) -> Result<Option<Patient>, StoreError>;

    /// Create-if-absent: an existing record wins and is returned unchanged,
    /// so repeated walk-in registration is idempotent.
    async fn upsert(&self, patient: Patient) -> Result<Patient, StoreError>;
}
