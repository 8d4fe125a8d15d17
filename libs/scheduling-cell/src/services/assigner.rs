// libs/scheduling-cell/src/services/assigner.rs
use std::sync::Arc;

use chrono::{Datelike, Duration};
use directory_cell::services::AvailabilityService;
use directory_cell::store::{PatientStore, StaffDirectory};
use shared_config::SchedulerConfig;
use shared_models::StoreError;
use tracing::{debug, info, warn};

use crate::models::{
    Appointment, ScanScope, ScheduleCommit, SchedulingError, SlotOutcome, SlotRequest,
};
use crate::services::{bounded, bounded_store};
use crate::store::AppointmentStore;

/// Decides whether a staff member can be booked at a given time and reserves
/// the slot. The overlap-check-then-insert runs as snapshot/compare-and-commit
/// so no two committed, non-cancelled appointments for one staff member can
/// ever overlap, even under concurrent callers.
#[derive(Clone)]
pub struct SlotAssigner {
    directory: Arc<dyn StaffDirectory>,
    patients: Arc<dyn PatientStore>,
    availability: AvailabilityService,
    appointments: Arc<dyn AppointmentStore>,
    config: SchedulerConfig,
}

impl SlotAssigner {
    pub fn new(
        directory: Arc<dyn StaffDirectory>,
        patients: Arc<dyn PatientStore>,
        availability: AvailabilityService,
        appointments: Arc<dyn AppointmentStore>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            directory,
            patients,
            availability,
            appointments,
            config,
        }
    }

    /// Try to reserve `[start, start + duration)` with the staff member.
    /// `Unavailable` and `SlotTaken` are normal outcomes; only missing
    /// identities and persistence trouble are errors. The assigner is
    /// time-agnostic: past timestamps are accepted, non-past enforcement
    /// belongs to callers.
    pub async fn try_assign_slot(
        &self,
        request: &SlotRequest,
    ) -> Result<SlotOutcome, SchedulingError> {
        let limit = self.config.store_timeout();

        bounded(limit, self.directory.get(&request.staff_id))
            .await?
            .ok_or_else(|| SchedulingError::StaffNotFound(request.staff_id.clone()))?;
        bounded(limit, self.patients.get(&request.patient_id))
            .await?
            .ok_or_else(|| SchedulingError::PatientNotFound(request.patient_id.clone()))?;

        let week = self
            .availability
            .weekly_for(&request.staff_id)
            .await
            .map_err(|e| SchedulingError::Persistence(e.to_string()))?;
        let works_that_day = week
            .map(|w| w.is_available_on(request.start.weekday()))
            .unwrap_or(false);
        if !works_that_day {
            debug!(
                "Staff {} does not work on {:?}",
                request.staff_id,
                request.start.weekday()
            );
            return Ok(SlotOutcome::Unavailable);
        }

        let end = request.start + Duration::minutes(request.duration_minutes);
        let scope = ScanScope::Staff(request.staff_id.clone());

        for attempt in 1..=self.config.max_commit_retries {
            let snapshot =
                bounded(limit, self.appointments.snapshot(scope.clone())).await?;

            let taken = snapshot
                .appointments
                .iter()
                .any(|apt| apt.holds_slot() && apt.overlaps(request.start, end));
            if taken {
                debug!(
                    "Slot {}..{} already taken for staff {}",
                    request.start, end, request.staff_id
                );
                return Ok(SlotOutcome::SlotTaken);
            }

            let appointment = Appointment::pending(
                request.staff_id.clone(),
                request.patient_id.clone(),
                request.start,
                request.duration_minutes,
            );
            let commit = ScheduleCommit {
                scope: scope.clone(),
                basis_version: snapshot.version,
                updates: vec![],
                inserts: vec![appointment.clone()],
            };

            match bounded_store(limit, self.appointments.commit(commit)).await {
                Ok(()) => {
                    info!(
                        "Reserved slot {} for staff {} (appointment {})",
                        request.start, request.staff_id, appointment.id
                    );
                    return Ok(SlotOutcome::Reserved(appointment));
                }
                Err(StoreError::VersionConflict) if attempt < self.config.max_commit_retries => {
                    warn!(
                        "Slot commit lost a race for staff {}, retrying attempt {}/{}",
                        request.staff_id, attempt, self.config.max_commit_retries
                    );
                    tokio::time::sleep(std::time::Duration::from_millis(100 * attempt as u64))
                        .await;
                }
                Err(StoreError::VersionConflict) => break,
                Err(e) => return Err(SchedulingError::Persistence(e.to_string())),
            }
        }

        Err(SchedulingError::Persistence(
            "slot assignment kept losing the commit race".to_string(),
        ))
    }
}
