// libs/scheduling-cell/src/services/lifecycle.rs
use std::sync::Arc;

use shared_config::SchedulerConfig;
use tracing::info;
use uuid::Uuid;

use crate::models::{Appointment, AppointmentStatus, SchedulingError};
use crate::services::bounded;
use crate::store::AppointmentStore;

/// Moves appointments through their status lifecycle, rejecting transitions
/// the matrix below does not allow. `Completed` and `Cancelled` are terminal.
pub struct AppointmentLifecycleService {
    appointments: Arc<dyn AppointmentStore>,
    config: SchedulerConfig,
}

/// Which statuses an appointment may move to from its current one.
pub fn valid_transitions(from: AppointmentStatus) -> &'static [AppointmentStatus] {
    use AppointmentStatus::*;
    match from {
        Pending => &[Scheduled, InProgress, Cancelled],
        Scheduled => &[InProgress, Rescheduled, Cancelled],
        Emergency => &[InProgress, Completed, Cancelled],
        Rescheduled => &[Scheduled, InProgress, Cancelled],
        InProgress => &[Completed, Cancelled],
        NoSlot => &[Scheduled, Cancelled],
        Completed | Cancelled => &[],
    }
}

pub fn validate_status_transition(
    from: AppointmentStatus,
    to: AppointmentStatus,
) -> Result<(), SchedulingError> {
    if valid_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(SchedulingError::InvalidStatusTransition { from, to })
    }
}

impl AppointmentLifecycleService {
    pub fn new(appointments: Arc<dyn AppointmentStore>, config: SchedulerConfig) -> Self {
        Self {
            appointments,
            config,
        }
    }

    /// Apply a status transition and persist the result. Returns the updated
    /// appointment.
    pub async fn transition(
        &self,
        appointment_id: Uuid,
        to: AppointmentStatus,
    ) -> Result<Appointment, SchedulingError> {
        let limit = self.config.store_timeout();

        let mut appointment = bounded(limit, self.appointments.fetch(appointment_id))
            .await?
            .ok_or(SchedulingError::AppointmentNotFound(appointment_id))?;

        validate_status_transition(appointment.status, to)?;

        let from = appointment.status;
        appointment.status = to;
        bounded(limit, self.appointments.update(appointment.clone())).await?;
        info!(
            "Appointment {} moved {} -> {}",
            appointment_id, from, to
        );

        Ok(appointment)
    }

    /// Cancel from any live status. Cancelling releases the slot: cancelled
    /// appointments no longer count in overlap scans.
    pub async fn cancel_appointment(
        &self,
        appointment_id: Uuid,
    ) -> Result<Appointment, SchedulingError> {
        self.transition(appointment_id, AppointmentStatus::Cancelled)
            .await
    }
}
