// libs/scheduling-cell/src/models.rs
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use shared_models::{PatientId, StaffId};
use uuid::Uuid;

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub staff_id: StaffId,
    pub patient_id: PatientId,
    pub booked_at: DateTime<Utc>,
    /// None for unscheduled records: pending slot requests, advisory
    /// emergencies, NoSlot outcomes.
    pub appointed_at: Option<DateTime<Utc>>,
    pub duration_minutes: i64,
    pub status: AppointmentStatus,
    pub payment_status: PaymentStatus,
}

impl Appointment {
    pub fn pending(
        staff_id: StaffId,
        patient_id: PatientId,
        start: DateTime<Utc>,
        duration_minutes: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            staff_id,
            patient_id,
            booked_at: Utc::now(),
            appointed_at: Some(start),
            duration_minutes,
            status: AppointmentStatus::Pending,
            payment_status: PaymentStatus::Unpaid,
        }
    }

    pub fn emergency(
        staff_id: StaffId,
        patient_id: PatientId,
        target: Option<DateTime<Utc>>,
        duration_minutes: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            staff_id,
            patient_id,
            booked_at: Utc::now(),
            appointed_at: target,
            duration_minutes,
            status: AppointmentStatus::Emergency,
            payment_status: PaymentStatus::Unpaid,
        }
    }

    pub fn no_slot(staff_id: StaffId, patient_id: PatientId) -> Self {
        Self {
            id: Uuid::new_v4(),
            staff_id,
            patient_id,
            booked_at: Utc::now(),
            appointed_at: None,
            duration_minutes: 0,
            status: AppointmentStatus::NoSlot,
            payment_status: PaymentStatus::Unpaid,
        }
    }

    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.appointed_at
            .map(|start| start + Duration::minutes(self.duration_minutes))
    }

    /// Half-open interval overlap against `[start, end)`. Unscheduled
    /// appointments never overlap anything.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        match (self.appointed_at, self.end_time()) {
            (Some(own_start), Some(own_end)) => own_start < end && start < own_end,
            _ => false,
        }
    }

    /// Statuses that still occupy (or may come to occupy) a slot. Cancelled
    /// appointments free their interval; completed ones are history.
    pub fn holds_slot(&self) -> bool {
        !matches!(
            self.status,
            AppointmentStatus::Cancelled | AppointmentStatus::Completed
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Pending,
    Scheduled,
    Emergency,
    Rescheduled,
    InProgress,
    Completed,
    Cancelled,
    NoSlot,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Pending => write!(f, "pending"),
            AppointmentStatus::Scheduled => write!(f, "scheduled"),
            AppointmentStatus::Emergency => write!(f, "emergency"),
            AppointmentStatus::Rescheduled => write!(f, "rescheduled"),
            AppointmentStatus::InProgress => write!(f, "in_progress"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
            AppointmentStatus::NoSlot => write!(f, "no_slot"),
        }
    }
}

/// Billing state, tracked independently of scheduling status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Unpaid,
    Paid,
    Refunded,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentStatus::Unpaid => write!(f, "unpaid"),
            PaymentStatus::Paid => write!(f, "paid"),
            PaymentStatus::Refunded => write!(f, "refunded"),
        }
    }
}

// ==============================================================================
// STORE SNAPSHOT / COMMIT MODELS
// ==============================================================================

/// Which slice of the appointment store a snapshot (and the commit based on
/// it) covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanScope {
    Staff(StaffId),
    AllStaff,
}

/// Appointments plus the version token the following commit must carry.
#[derive(Debug, Clone)]
pub struct ScheduleSnapshot {
    pub appointments: Vec<Appointment>,
    pub version: u64,
}

/// A compare-and-commit write: applied only if nothing in `scope` changed
/// since `basis_version` was read, otherwise rejected with a version
/// conflict.
#[derive(Debug, Clone)]
pub struct ScheduleCommit {
    pub scope: ScanScope,
    pub basis_version: u64,
    pub updates: Vec<Appointment>,
    pub inserts: Vec<Appointment>,
}

// ==============================================================================
// REQUEST / OUTCOME MODELS
// ==============================================================================

#[derive(Debug, Clone)]
pub struct SlotRequest {
    pub staff_id: StaffId,
    pub patient_id: PatientId,
    pub start: DateTime<Utc>,
    pub duration_minutes: i64,
}

/// Negative outcomes are normal results, not errors, so the presentation
/// layer can word each one precisely.
#[derive(Debug, Clone, PartialEq)]
pub enum SlotOutcome {
    Reserved(Appointment),
    /// Staff member does not work on that day (or has no availability
    /// record at all).
    Unavailable,
    /// The requested interval overlaps an existing commitment.
    SlotTaken,
}

impl SlotOutcome {
    pub fn is_reserved(&self) -> bool {
        matches!(self, SlotOutcome::Reserved(_))
    }
}

#[derive(Debug, Clone)]
pub struct EmergencyRequest {
    pub staff_id: StaffId,
    pub patient_id: PatientId,
    /// None inserts an unscheduled advisory emergency with no conflict scan.
    pub target: Option<DateTime<Utc>>,
    /// Both the emergency's occupied interval and the displacement applied
    /// to each conflicting appointment.
    pub shift_minutes: i64,
}

#[derive(Debug, Clone)]
pub struct EmergencyInsertion {
    pub emergency: Appointment,
    /// Appointments displaced forward by the insertion, in their post-shift
    /// state.
    pub rescheduled: Vec<Appointment>,
}

#[derive(Debug, Clone)]
pub struct WalkInRequest {
    pub patient: directory_cell::Patient,
    /// Display name, matched case-insensitively against the directory.
    pub preferred_doctor: Option<String>,
    pub date: chrono::NaiveDate,
}

#[derive(Debug, Clone)]
pub struct WalkInAssignment {
    pub doctor: directory_cell::StaffMember,
    /// `Pending` with a time when a slot was found, `NoSlot` otherwise.
    pub appointment: Appointment,
}

impl WalkInAssignment {
    pub fn found_slot(&self) -> bool {
        self.appointment.status == AppointmentStatus::Pending
    }
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum SchedulingError {
    #[error("staff member {0} not found")]
    StaffNotFound(StaffId),

    #[error("patient {0} not found")]
    PatientNotFound(PatientId),

    #[error("appointment {0} not found")]
    AppointmentNotFound(Uuid),

    #[error("no doctors are registered in the staff directory")]
    NoDoctorsRegistered,

    #[error("appointment cannot move from {from} to {to}")]
    InvalidStatusTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    #[error("persistence failure: {0}")]
    Persistence(String),
}
