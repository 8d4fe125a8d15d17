// libs/scheduling-cell/src/services/conflict.rs
use std::sync::Arc;

use chrono::Duration;
use shared_config::{EmergencyScanScope, SchedulerConfig};
use shared_models::StoreError;
use tracing::{debug, info, warn};

use crate::models::{
    Appointment, AppointmentStatus, EmergencyInsertion, EmergencyRequest, ScanScope,
    ScheduleCommit, SchedulingError,
};
use crate::notify::{NoticeReason, PatientNotifier, RescheduleNotice};
use crate::services::{bounded, bounded_store};
use crate::store::AppointmentStore;

/// Inserts urgent appointments by displacing conflicting bookings forward in
/// time instead of rejecting the emergency. Displacement and insertion land
/// in one atomic commit; a notice is raised for every displaced patient once
/// the commit succeeds.
pub struct ConflictResolver {
    appointments: Arc<dyn AppointmentStore>,
    notifier: Arc<dyn PatientNotifier>,
    config: SchedulerConfig,
}

impl ConflictResolver {
    pub fn new(
        appointments: Arc<dyn AppointmentStore>,
        notifier: Arc<dyn PatientNotifier>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            appointments,
            notifier,
            config,
        }
    }

    /// Insert an emergency appointment. Always results in the emergency
    /// being persisted, whatever conflicts are found.
    ///
    /// Displacement is a single pass: an appointment shifted into a third
    /// appointment's interval is not re-checked. That cascade is a known,
    /// accepted gap.
    pub async fn insert_emergency(
        &self,
        request: EmergencyRequest,
    ) -> Result<EmergencyInsertion, SchedulingError> {
        let limit = self.config.store_timeout();
        let scope = self.scan_scope(&request);

        let Some(target) = request.target else {
            // Unscheduled advisory emergency: append, no conflict scan.
            let emergency = Appointment::emergency(
                request.staff_id.clone(),
                request.patient_id.clone(),
                None,
                request.shift_minutes,
            );
            self.commit_with_retry(scope, vec![], emergency.clone())
                .await?;
            info!("Inserted unscheduled emergency appointment {}", emergency.id);
            return Ok(EmergencyInsertion {
                emergency,
                rescheduled: vec![],
            });
        };

        let shift = Duration::minutes(request.shift_minutes);
        let occupied_end = target + shift;

        for attempt in 1..=self.config.max_commit_retries {
            let snapshot = bounded(limit, self.appointments.snapshot(scope.clone())).await?;

            let mut displaced = Vec::new();
            for apt in &snapshot.appointments {
                if !apt.holds_slot() {
                    continue;
                }
                if apt.overlaps(target, occupied_end) {
                    let mut moved = apt.clone();
                    moved.appointed_at = apt.appointed_at.map(|start| start + shift);
                    moved.status = AppointmentStatus::Rescheduled;
                    displaced.push(moved);
                }
            }
            debug!(
                "Emergency at {} displaces {} appointment(s)",
                target,
                displaced.len()
            );

            let emergency = Appointment::emergency(
                request.staff_id.clone(),
                request.patient_id.clone(),
                Some(target),
                request.shift_minutes,
            );
            let commit = ScheduleCommit {
                scope: scope.clone(),
                basis_version: snapshot.version,
                updates: displaced.clone(),
                inserts: vec![emergency.clone()],
            };

            match bounded_store(limit, self.appointments.commit(commit)).await {
                Ok(()) => {
                    info!(
                        "Inserted emergency appointment {} at {}, rescheduling {} booking(s)",
                        emergency.id,
                        target,
                        displaced.len()
                    );
                    self.raise_notices(&snapshot.appointments, &displaced).await;
                    return Ok(EmergencyInsertion {
                        emergency,
                        rescheduled: displaced,
                    });
                }
                Err(StoreError::VersionConflict) if attempt < self.config.max_commit_retries => {
                    warn!(
                        "Emergency commit lost a race, retrying attempt {}/{}",
                        attempt, self.config.max_commit_retries
                    );
                    tokio::time::sleep(std::time::Duration::from_millis(100 * attempt as u64))
                        .await;
                }
                Err(StoreError::VersionConflict) => break,
                Err(e) => return Err(SchedulingError::Persistence(e.to_string())),
            }
        }

        Err(SchedulingError::Persistence(
            "emergency insertion kept losing the commit race".to_string(),
        ))
    }

    fn scan_scope(&self, request: &EmergencyRequest) -> ScanScope {
        match self.config.emergency_scan_scope {
            EmergencyScanScope::SameStaff => ScanScope::Staff(request.staff_id.clone()),
            EmergencyScanScope::AllStaff => ScanScope::AllStaff,
        }
    }

    async fn raise_notices(&self, before: &[Appointment], displaced: &[Appointment]) {
        for moved in displaced {
            let previous = before
                .iter()
                .find(|apt| apt.id == moved.id)
                .and_then(|apt| apt.appointed_at);
            let (Some(previous_time), Some(new_time)) = (previous, moved.appointed_at) else {
                continue;
            };
            self.notifier
                .notify(RescheduleNotice {
                    appointment_id: moved.id,
                    patient_id: moved.patient_id.clone(),
                    previous_time,
                    new_time,
                    reason: NoticeReason::EmergencyDisplacement,
                })
                .await;
        }
    }

    async fn commit_with_retry(
        &self,
        scope: ScanScope,
        updates: Vec<Appointment>,
        insert: Appointment,
    ) -> Result<(), SchedulingError> {
        let limit = self.config.store_timeout();

        for attempt in 1..=self.config.max_commit_retries {
            let snapshot = bounded(limit, self.appointments.snapshot(scope.clone())).await?;
            let commit = ScheduleCommit {
                scope: scope.clone(),
                basis_version: snapshot.version,
                updates: updates.clone(),
                inserts: vec![insert.clone()],
            };
            match bounded_store(limit, self.appointments.commit(commit)).await {
                Ok(()) => return Ok(()),
                Err(StoreError::VersionConflict) if attempt < self.config.max_commit_retries => {
                    tokio::time::sleep(std::time::Duration::from_millis(100 * attempt as u64))
                        .await;
                }
                Err(StoreError::VersionConflict) => break,
                Err(e) => return Err(SchedulingError::Persistence(e.to_string())),
            }
        }

        Err(SchedulingError::Persistence(
            "emergency insertion kept losing the commit race".to_string(),
        ))
    }
}
