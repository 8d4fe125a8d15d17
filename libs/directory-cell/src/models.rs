// libs/directory-cell/src/models.rs
use chrono::Weekday;
use serde::{Deserialize, Serialize};
use shared_models::{PatientId, StaffId, StoreError};

// ==============================================================================
// STAFF AND PATIENT MODELS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffMember {
    pub id: StaffId,
    pub full_name: String,
    pub contact: Option<String>,
    pub is_doctor: bool,
    pub speciality: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: PatientId,
    pub full_name: String,
    pub contact: Option<String>,
    pub email: Option<String>,
    /// Registered app users can log in and book ahead; walk-in-only patients
    /// exist purely as scheduling records.
    pub is_app_user: bool,
}

impl Patient {
    /// A walk-in record: identity and name only, no app account.
    pub fn walk_in(id: PatientId, full_name: impl Into<String>) -> Self {
        Self {
            id,
            full_name: full_name.into(),
            contact: None,
            email: None,
            is_app_user: false,
        }
    }
}

// ==============================================================================
// WEEKLY AVAILABILITY
// ==============================================================================

/// Recurring working-day pattern for one staff member. Day granularity only:
/// a flagged day means the whole working-day window is bookable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyAvailability {
    pub monday: bool,
    pub tuesday: bool,
    pub wednesday: bool,
    pub thursday: bool,
    pub friday: bool,
    pub saturday: bool,
    pub sunday: bool,
}

impl WeeklyAvailability {
    /// Monday through Friday.
    pub fn weekdays() -> Self {
        Self {
            monday: true,
            tuesday: true,
            wednesday: true,
            thursday: true,
            friday: true,
            saturday: false,
            sunday: false,
        }
    }

    pub fn only(days: &[Weekday]) -> Self {
        let mut week = Self::default();
        for day in days {
            match day {
                Weekday::Mon => week.monday = true,
                Weekday::Tue => week.tuesday = true,
                Weekday::Wed => week.wednesday = true,
                Weekday::Thu => week.thursday = true,
                Weekday::Fri => week.friday = true,
                Weekday::Sat => week.saturday = true,
                Weekday::Sun => week.sunday = true,
            }
        }
        week
    }

    pub fn is_available_on(&self, day: Weekday) -> bool {
        match day {
            Weekday::Mon => self.monday,
            Weekday::Tue => self.tuesday,
            Weekday::Wed => self.wednesday,
            Weekday::Thu => self.thursday,
            Weekday::Fri => self.friday,
            Weekday::Sat => self.saturday,
            Weekday::Sun => self.sunday,
        }
    }

    pub fn has_any_day(&self) -> bool {
        self.monday
            || self.tuesday
            || self.wednesday
            || self.thursday
            || self.friday
            || self.saturday
            || self.sunday
    }
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("staff member {0} not found")]
    StaffNotFound(StaffId),

    #[error("patient {0} not found")]
    PatientNotFound(PatientId),

    #[error(transparent)]
    Store(#[from] StoreError),
}
