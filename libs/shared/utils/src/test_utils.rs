// libs/shared/utils/src/test_utils.rs
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;
use uuid::Uuid;

use directory_cell::models::{Patient, StaffMember, WeeklyAvailability};
use directory_cell::store::{AvailabilityStore, PatientStore, StaffDirectory};
use inquiry_cell::models::Inquiry;
use inquiry_cell::store::InquiryStore;
use scheduling_cell::models::{
    Appointment, AppointmentStatus, ScanScope, ScheduleCommit, ScheduleSnapshot,
};
use scheduling_cell::notify::{PatientNotifier, RescheduleNotice};
use scheduling_cell::store::AppointmentStore;
use shared_models::{PatientId, StaffId, StoreError};

// ==============================================================================
// FIXTURE BUILDERS
// ==============================================================================

pub fn doctor(id: &str, name: &str) -> StaffMember {
    StaffMember {
        id: StaffId::from(id),
        full_name: name.to_string(),
        contact: None,
        is_doctor: true,
        speciality: Some("general".to_string()),
    }
}

pub fn nurse(id: &str, name: &str) -> StaffMember {
    StaffMember {
        id: StaffId::from(id),
        full_name: name.to_string(),
        contact: None,
        is_doctor: false,
        speciality: None,
    }
}

pub fn patient(id: &str, name: &str) -> Patient {
    Patient {
        id: PatientId::from(id),
        full_name: name.to_string(),
        contact: Some("555-0100".to_string()),
        email: None,
        is_app_user: true,
    }
}

// ==============================================================================
// DIRECTORY DOUBLES
// ==============================================================================

#[derive(Default)]
pub struct MemoryStaffDirectory {
    staff: RwLock<Vec<StaffMember>>,
}

impl MemoryStaffDirectory {
    pub fn with_staff(staff: Vec<StaffMember>) -> Arc<Self> {
        Arc::new(Self {
            staff: RwLock::new(staff),
        })
    }
}

#[async_trait]
impl StaffDirectory for MemoryStaffDirectory {
    async fn get(&self, id: &StaffId) -> Result<Option<StaffMember>, StoreError> {
        Ok(self.staff.read().await.iter().find(|s| &s.id == id).cloned())
    }

    async fn list(&self) -> Result<Vec<StaffMember>, StoreError> {
        Ok(self.staff.read().await.clone())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<StaffMember>, StoreError> {
        Ok(self
            .staff
            .read()
            .await
            .iter()
            .find(|s| s.full_name.eq_ignore_ascii_case(name))
            .cloned())
    }
}

#[derive(Default)]
pub struct MemoryAvailabilityStore {
    weeks: RwLock<HashMap<StaffId, WeeklyAvailability>>,
}

impl MemoryAvailabilityStore {
    pub fn empty() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

#[async_trait]
impl AvailabilityStore for MemoryAvailabilityStore {
    async fn get(&self, staff_id: &StaffId) -> Result<Option<WeeklyAvailability>, StoreError> {
        Ok(self.weeks.read().await.get(staff_id).copied())
    }

    async fn upsert(
        &self,
        staff_id: &StaffId,
        week: WeeklyAvailability,
    ) -> Result<(), StoreError> {
        self.weeks.write().await.insert(staff_id.clone(), week);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryPatientStore {
    patients: RwLock<HashMap<PatientId, Patient>>,
}

impl MemoryPatientStore {
    pub fn with_patients(patients: Vec<Patient>) -> Arc<Self> {
        let map = patients.into_iter().map(|p| (p.id.clone(), p)).collect();
        Arc::new(Self {
            patients: RwLock::new(map),
        })
    }

    pub fn empty() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

#[async_trait]
impl PatientStore for MemoryPatientStore {
    async fn get(&self, id: &PatientId) -> Result<Option<Patient>, StoreError> {
        Ok(self.patients.read().await.get(id).cloned())
    }

    async fn upsert(&self, patient: Patient) -> Result<Patient, StoreError> {
        let mut patients = self.patients.write().await;
        Ok(patients
            .entry(patient.id.clone())
            .or_insert(patient)
            .clone())
    }
}

// ==============================================================================
// APPOINTMENT STORE DOUBLE
// ==============================================================================

#[derive(Default)]
struct AppointmentInner {
    appointments: Vec<Appointment>,
    version: u64,
}

/// Versioned in-memory appointment book. A single global version counter
/// stands in for per-scope tokens; it is strictly more conservative, so
/// commit-race tests still exercise the conflict path.
#[derive(Default)]
pub struct MemoryAppointmentStore {
    inner: RwLock<AppointmentInner>,
}

impl MemoryAppointmentStore {
    pub fn empty() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub async fn all(&self) -> Vec<Appointment> {
        self.inner.read().await.appointments.clone()
    }
}

#[async_trait]
impl AppointmentStore for MemoryAppointmentStore {
    async fn fetch(&self, id: Uuid) -> Result<Option<Appointment>, StoreError> {
        Ok(self
            .inner
            .read()
            .await
            .appointments
            .iter()
            .find(|a| a.id == id)
            .cloned())
    }

    async fn snapshot(&self, scope: ScanScope) -> Result<ScheduleSnapshot, StoreError> {
        let inner = self.inner.read().await;
        let appointments = inner
            .appointments
            .iter()
            .filter(|a| match &scope {
                ScanScope::Staff(staff_id) => &a.staff_id == staff_id,
                ScanScope::AllStaff => true,
            })
            .cloned()
            .collect();
        Ok(ScheduleSnapshot {
            appointments,
            version: inner.version,
        })
    }

    async fn commit(&self, commit: ScheduleCommit) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if commit.basis_version != inner.version {
            return Err(StoreError::VersionConflict);
        }
        for update in commit.updates {
            let slot = inner
                .appointments
                .iter_mut()
                .find(|a| a.id == update.id)
                .ok_or(StoreError::NotFound)?;
            *slot = update;
        }
        inner.appointments.extend(commit.inserts);
        inner.version += 1;
        Ok(())
    }

    async fn update(&self, appointment: Appointment) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let slot = inner
            .appointments
            .iter_mut()
            .find(|a| a.id == appointment.id)
            .ok_or(StoreError::NotFound)?;
        *slot = appointment;
        inner.version += 1;
        Ok(())
    }

    async fn on_date(&self, date: NaiveDate) -> Result<Vec<Appointment>, StoreError> {
        Ok(self
            .inner
            .read()
            .await
            .appointments
            .iter()
            .filter(|a| a.appointed_at.map(|t| t.date_naive()) == Some(date))
            .cloned()
            .collect())
    }

    async fn for_patient(&self, patient_id: &PatientId) -> Result<Vec<Appointment>, StoreError> {
        Ok(self
            .inner
            .read()
            .await
            .appointments
            .iter()
            .filter(|a| &a.patient_id == patient_id)
            .cloned()
            .collect())
    }

    async fn with_status(
        &self,
        status: AppointmentStatus,
    ) -> Result<Vec<Appointment>, StoreError> {
        Ok(self
            .inner
            .read()
            .await
            .appointments
            .iter()
            .filter(|a| a.status == status)
            .cloned()
            .collect())
    }
}

// ==============================================================================
// NOTIFIER AND INQUIRY DOUBLES
// ==============================================================================

/// Records every notice it receives so tests can assert on displacement
/// notifications.
#[derive(Default)]
pub struct RecordingNotifier {
    notices: RwLock<Vec<RescheduleNotice>>,
}

impl RecordingNotifier {
    pub fn empty() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub async fn notices(&self) -> Vec<RescheduleNotice> {
        self.notices.read().await.clone()
    }
}

#[async_trait]
impl PatientNotifier for RecordingNotifier {
    async fn notify(&self, notice: RescheduleNotice) {
        self.notices.write().await.push(notice);
    }
}

#[derive(Default)]
pub struct MemoryInquiryStore {
    inquiries: RwLock<Vec<Inquiry>>,
}

impl MemoryInquiryStore {
    pub fn empty() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

#[async_trait]
impl InquiryStore for MemoryInquiryStore {
    async fn insert(&self, inquiry: Inquiry) -> Result<(), StoreError> {
        self.inquiries.write().await.push(inquiry);
        Ok(())
    }

    async fn fetch(&self, id: Uuid) -> Result<Option<Inquiry>, StoreError> {
        Ok(self
            .inquiries
            .read()
            .await
            .iter()
            .find(|i| i.id == id)
            .cloned())
    }

    async fn update(&self, inquiry: Inquiry) -> Result<(), StoreError> {
        let mut inquiries = self.inquiries.write().await;
        let slot = inquiries
            .iter_mut()
            .find(|i| i.id == inquiry.id)
            .ok_or(StoreError::NotFound)?;
        *slot = inquiry;
        Ok(())
    }

    async fn pending_for_doctor(&self, doctor_id: &StaffId) -> Result<Vec<Inquiry>, StoreError> {
        use inquiry_cell::models::InquiryStatus;
        Ok(self
            .inquiries
            .read()
            .await
            .iter()
            .filter(|i| &i.doctor_id == doctor_id && i.status == InquiryStatus::Pending)
            .cloned()
            .collect())
    }

    async fn for_patient(&self, patient_id: &PatientId) -> Result<Vec<Inquiry>, StoreError> {
        Ok(self
            .inquiries
            .read()
            .await
            .iter()
            .filter(|i| &i.patient_id == patient_id)
            .cloned()
            .collect())
    }
}
