// libs/scheduling-cell/src/services/walkin.rs
use std::sync::Arc;

use chrono::{Datelike, Duration, NaiveDate};
use directory_cell::models::StaffMember;
use directory_cell::services::{AvailabilityService, PatientRegistry};
use directory_cell::store::StaffDirectory;
use rand::seq::SliceRandom;
use shared_config::SchedulerConfig;
use shared_models::{PatientId, StoreError};
use tracing::{debug, info};

use crate::models::{
    Appointment, ScanScope, ScheduleCommit, SchedulingError, SlotOutcome, SlotRequest,
    WalkInAssignment, WalkInRequest,
};
use crate::services::assigner::SlotAssigner;
use crate::services::{bounded, bounded_store};
use crate::store::AppointmentStore;

/// Assigns an arriving walk-in patient to a doctor and a slot: the named
/// doctor when one is given and bookable, otherwise any available doctor in
/// uniform random order. The shuffle spreads load; it is not a correctness
/// requirement.
pub struct WalkInPolicy {
    directory: Arc<dyn StaffDirectory>,
    registry: PatientRegistry,
    availability: AvailabilityService,
    assigner: SlotAssigner,
    appointments: Arc<dyn AppointmentStore>,
    config: SchedulerConfig,
}

impl WalkInPolicy {
    pub fn new(
        directory: Arc<dyn StaffDirectory>,
        registry: PatientRegistry,
        availability: AvailabilityService,
        assigner: SlotAssigner,
        appointments: Arc<dyn AppointmentStore>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            directory,
            registry,
            availability,
            assigner,
            appointments,
            config,
        }
    }

    /// "No doctor available" is a normal outcome, returned as a persisted
    /// `NoSlot` appointment, never an error.
    pub async fn assign_walk_in(
        &self,
        request: WalkInRequest,
    ) -> Result<WalkInAssignment, SchedulingError> {
        let limit = self.config.store_timeout();

        let patient = bounded(limit, self.registry.register(request.patient.clone())).await?;
        debug!("Walk-in patient {} registered", patient.id);

        // Preferred-doctor branch: an unresolvable name or a failed slot
        // search falls through to the random fallback rather than erroring.
        let mut preferred: Option<StaffMember> = None;
        if let Some(name) = &request.preferred_doctor {
            let resolved = bounded(limit, self.directory.find_by_name(name)).await?;
            match resolved {
                Some(staff) if staff.is_doctor => {
                    if let Some(appointment) =
                        self.scan_working_day(&staff, request.date, &patient.id).await?
                    {
                        return Ok(WalkInAssignment {
                            doctor: staff,
                            appointment,
                        });
                    }
                    preferred = Some(staff);
                }
                _ => debug!("Preferred doctor '{}' did not resolve", name),
            }
        }

        let mut doctors: Vec<StaffMember> = bounded(limit, self.directory.list())
            .await?
            .into_iter()
            .filter(|staff| staff.is_doctor)
            .collect();
        if doctors.is_empty() {
            return Err(SchedulingError::NoDoctorsRegistered);
        }
        doctors.shuffle(&mut rand::thread_rng());

        let day = request.date.weekday();
        for doctor in &doctors {
            let week = self
                .availability
                .weekly_for(&doctor.id)
                .await
                .map_err(|e| SchedulingError::Persistence(e.to_string()))?;
            if !week.map(|w| w.is_available_on(day)).unwrap_or(false) {
                continue;
            }
            if let Some(appointment) =
                self.scan_working_day(doctor, request.date, &patient.id).await?
            {
                return Ok(WalkInAssignment {
                    doctor: doctor.clone(),
                    appointment,
                });
            }
        }

        // Nothing free anywhere today: persist the request as NoSlot, pinned
        // to the preferred doctor when one resolved, else the first shuffled
        // candidate.
        let pin = preferred.unwrap_or_else(|| doctors[0].clone());
        let appointment = Appointment::no_slot(pin.id.clone(), patient.id.clone());
        self.persist_no_slot(appointment.clone()).await?;
        info!(
            "No slot found for walk-in patient {} on {}, recorded as no_slot",
            patient.id, request.date
        );

        Ok(WalkInAssignment {
            doctor: pin,
            appointment,
        })
    }

    /// Walk the working-day window in slot-sized steps until the assigner
    /// reserves one. `Unavailable` ends the scan immediately: the whole day
    /// is off, not just the slot.
    async fn scan_working_day(
        &self,
        doctor: &StaffMember,
        date: NaiveDate,
        patient_id: &PatientId,
    ) -> Result<Option<Appointment>, SchedulingError> {
        let slot = Duration::minutes(self.config.default_slot_minutes);
        let mut start = date
            .and_hms_opt(self.config.day_start_hour, 0, 0)
            .unwrap()
            .and_utc();
        let day_end = date
            .and_hms_opt(self.config.day_end_hour, 0, 0)
            .unwrap()
            .and_utc();

        while start + slot <= day_end {
            let outcome = self
                .assigner
                .try_assign_slot(&SlotRequest {
                    staff_id: doctor.id.clone(),
                    patient_id: patient_id.clone(),
                    start,
                    duration_minutes: self.config.default_slot_minutes,
                })
                .await?;

            match outcome {
                SlotOutcome::Reserved(appointment) => return Ok(Some(appointment)),
                SlotOutcome::Unavailable => return Ok(None),
                SlotOutcome::SlotTaken => start += slot,
            }
        }

        Ok(None)
    }

    async fn persist_no_slot(&self, appointment: Appointment) -> Result<(), SchedulingError> {
        let limit = self.config.store_timeout();
        let scope = ScanScope::Staff(appointment.staff_id.clone());

        for attempt in 1..=self.config.max_commit_retries {
            let snapshot = bounded(limit, self.appointments.snapshot(scope.clone())).await?;
            let commit = ScheduleCommit {
                scope: scope.clone(),
                basis_version: snapshot.version,
                updates: vec![],
                inserts: vec![appointment.clone()],
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
            "no_slot record kept losing the commit race".to_string(),
        ))
    }
}
