// libs/scheduling-cell/src/services/views.rs
use std::cmp::Ordering;
use std::sync::Arc;

use chrono::NaiveDate;
use shared_config::SchedulerConfig;
use shared_models::PatientId;

use crate::models::{Appointment, AppointmentStatus, SchedulingError};
use crate::services::bounded;
use crate::store::AppointmentStore;

/// Read-only projections over the appointment book. Nothing here mutates
/// state; ordering is applied in memory so the store contract stays minimal.
pub struct QueueViews {
    appointments: Arc<dyn AppointmentStore>,
    config: SchedulerConfig,
}

impl QueueViews {
    pub fn new(appointments: Arc<dyn AppointmentStore>, config: SchedulerConfig) -> Self {
        Self {
            appointments,
            config,
        }
    }

    /// All appointments scheduled on a calendar day, earliest first.
    pub async fn appointments_on_date(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<Appointment>, SchedulingError> {
        let limit = self.config.store_timeout();
        let mut day = bounded(limit, self.appointments.on_date(date)).await?;
        day.sort_by_key(|apt| apt.appointed_at);
        Ok(day)
    }

    /// A patient's full appointment history, newest first. Appointments with
    /// no scheduled time (unscheduled emergencies, no_slot records) sort
    /// after every timed one.
    pub async fn history_for_patient(
        &self,
        patient_id: &PatientId,
    ) -> Result<Vec<Appointment>, SchedulingError> {
        let limit = self.config.store_timeout();
        let mut history = bounded(limit, self.appointments.for_patient(patient_id)).await?;
        history.sort_by(|a, b| match (a.appointed_at, b.appointed_at) {
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });
        Ok(history)
    }

    /// Completed appointments clinic-wide, most recent first.
    pub async fn completed_queue(&self) -> Result<Vec<Appointment>, SchedulingError> {
        let limit = self.config.store_timeout();
        let mut done = bounded(
            limit,
            self.appointments.with_status(AppointmentStatus::Completed),
        )
        .await?;
        done.sort_by(|a, b| b.appointed_at.cmp(&a.appointed_at));
        Ok(done)
    }
}
