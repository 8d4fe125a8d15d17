// libs/directory-cell/src/services/availability.rs
use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use shared_models::StaffId;
use tracing::debug;

use crate::models::{DirectoryError, StaffMember, WeeklyAvailability};
use crate::store::{AvailabilityStore, StaffDirectory};

#[derive(Clone)]
pub struct AvailabilityService {
    directory: Arc<dyn StaffDirectory>,
    store: Arc<dyn AvailabilityStore>,
}

impl AvailabilityService {
    pub fn new(directory: Arc<dyn StaffDirectory>, store: Arc<dyn AvailabilityStore>) -> Self {
        Self { directory, store }
    }

    /// Replace the recurring weekly pattern for a staff member.
    pub async fn set_weekly(
        &self,
        staff_id: &StaffId,
        week: WeeklyAvailability,
    ) -> Result<(), DirectoryError> {
        debug!("Setting weekly availability for staff {}", staff_id);

        self.directory
            .get(staff_id)
            .await?
            .ok_or_else(|| DirectoryError::StaffNotFound(staff_id.clone()))?;

        self.store.upsert(staff_id, week).await?;
        Ok(())
    }

    /// The recurring pattern, if one has ever been recorded.
    pub async fn weekly_for(
        &self,
        staff_id: &StaffId,
    ) -> Result<Option<WeeklyAvailability>, DirectoryError> {
        Ok(self.store.get(staff_id).await?)
    }

    /// Whether the staff member works on the given calendar date. A missing
    /// availability record counts as not working.
    pub async fn is_available_on(
        &self,
        staff_id: &StaffId,
        date: NaiveDate,
    ) -> Result<bool, DirectoryError> {
        let week = self.store.get(staff_id).await?;
        Ok(week.is_some_and(|w| w.is_available_on(date.weekday())))
    }

    /// All staff members whose pattern flags the date's day of week.
    pub async fn staff_available_on(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<StaffMember>, DirectoryError> {
        let day = date.weekday();
        let mut working = Vec::new();

        for staff in self.directory.list().await? {
            if let Some(week) = self.store.get(&staff.id).await? {
                if week.is_available_on(day) {
                    working.push(staff);
                }
            }
        }

        debug!("{} staff members available on {}", working.len(), date);
        Ok(working)
    }
}
