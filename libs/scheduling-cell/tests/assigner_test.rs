// libs/scheduling-cell/tests/assigner_test.rs
use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::{DateTime, NaiveDate, Utc, Weekday};
use directory_cell::models::WeeklyAvailability;
use directory_cell::services::AvailabilityService;
use scheduling_cell::models::{SchedulingError, SlotOutcome, SlotRequest};
use scheduling_cell::services::SlotAssigner;
use scheduling_cell::store::AppointmentStore;
use shared_config::SchedulerConfig;
use shared_models::{PatientId, StaffId};
use shared_utils::test_utils::{
    doctor, patient, MemoryAppointmentStore, MemoryAvailabilityStore, MemoryPatientStore,
    MemoryStaffDirectory,
};

struct Setup {
    assigner: SlotAssigner,
    availability: AvailabilityService,
    appointments: Arc<MemoryAppointmentStore>,
}

fn setup() -> Setup {
    let directory = MemoryStaffDirectory::with_staff(vec![doctor("dr-chen", "Amara Chen")]);
    let patients = MemoryPatientStore::with_patients(vec![patient("pt-ines", "Ines Duarte")]);
    let availability_store = MemoryAvailabilityStore::empty();
    let appointments = MemoryAppointmentStore::empty();

    let availability = AvailabilityService::new(directory.clone(), availability_store);
    let assigner = SlotAssigner::new(
        directory,
        patients,
        availability.clone(),
        appointments.clone(),
        SchedulerConfig::default(),
    );

    Setup {
        assigner,
        availability,
        appointments,
    }
}

// 2025-06-02 is a Monday.
fn monday_at(hour: u32, minute: u32) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(2025, 6, 2)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
        .and_utc()
}

fn request_at(start: DateTime<Utc>) -> SlotRequest {
    SlotRequest {
        staff_id: StaffId::from("dr-chen"),
        patient_id: PatientId::from("pt-ines"),
        start,
        duration_minutes: 30,
    }
}

#[tokio::test]
async fn reserves_a_free_slot_on_a_working_day() {
    let s = setup();
    s.availability
        .set_weekly(&StaffId::from("dr-chen"), WeeklyAvailability::weekdays())
        .await
        .unwrap();

    let outcome = s.assigner.try_assign_slot(&request_at(monday_at(10, 0))).await.unwrap();

    let appointment = match outcome {
        SlotOutcome::Reserved(apt) => apt,
        other => panic!("expected Reserved, got {:?}", other),
    };
    assert_eq!(appointment.appointed_at, Some(monday_at(10, 0)));
    assert_eq!(s.appointments.all().await.len(), 1);
}

#[tokio::test]
async fn unavailable_when_the_day_is_not_flagged() {
    let s = setup();
    s.availability
        .set_weekly(
            &StaffId::from("dr-chen"),
            WeeklyAvailability::only(&[Weekday::Tue]),
        )
        .await
        .unwrap();

    let outcome = s.assigner.try_assign_slot(&request_at(monday_at(10, 0))).await.unwrap();

    assert_eq!(outcome, SlotOutcome::Unavailable);
    assert!(s.appointments.all().await.is_empty());
}

#[tokio::test]
async fn unavailable_when_no_availability_record_exists() {
    let s = setup();

    let outcome = s.assigner.try_assign_slot(&request_at(monday_at(10, 0))).await.unwrap();

    assert_eq!(outcome, SlotOutcome::Unavailable);
}

#[tokio::test]
async fn rejects_an_overlapping_slot() {
    let s = setup();
    s.availability
        .set_weekly(&StaffId::from("dr-chen"), WeeklyAvailability::weekdays())
        .await
        .unwrap();

    let first = s.assigner.try_assign_slot(&request_at(monday_at(10, 0))).await.unwrap();
    assert!(first.is_reserved());

    // 10:15 overlaps the 10:00-10:30 booking.
    let overlapping = s.assigner.try_assign_slot(&request_at(monday_at(10, 15))).await.unwrap();
    assert_eq!(overlapping, SlotOutcome::SlotTaken);
}

#[tokio::test]
async fn back_to_back_slots_do_not_conflict() {
    let s = setup();
    s.availability
        .set_weekly(&StaffId::from("dr-chen"), WeeklyAvailability::weekdays())
        .await
        .unwrap();

    assert!(s
        .assigner
        .try_assign_slot(&request_at(monday_at(10, 0)))
        .await
        .unwrap()
        .is_reserved());

    // Half-open intervals: a 10:30 start touches but does not overlap.
    assert!(s
        .assigner
        .try_assign_slot(&request_at(monday_at(10, 30)))
        .await
        .unwrap()
        .is_reserved());
}

#[tokio::test]
async fn unknown_staff_is_an_error() {
    let s = setup();

    let result = s
        .assigner
        .try_assign_slot(&SlotRequest {
            staff_id: StaffId::from("dr-ghost"),
            patient_id: PatientId::from("pt-ines"),
            start: monday_at(10, 0),
            duration_minutes: 30,
        })
        .await;

    assert_matches!(result, Err(SchedulingError::StaffNotFound(_)));
}

#[tokio::test]
async fn unknown_patient_is_an_error() {
    let s = setup();

    let result = s
        .assigner
        .try_assign_slot(&SlotRequest {
            staff_id: StaffId::from("dr-chen"),
            patient_id: PatientId::from("pt-ghost"),
            start: monday_at(10, 0),
            duration_minutes: 30,
        })
        .await;

    assert_matches!(result, Err(SchedulingError::PatientNotFound(_)));
}

#[tokio::test]
async fn concurrent_requests_for_one_slot_reserve_exactly_once() {
    let s = setup();
    s.availability
        .set_weekly(&StaffId::from("dr-chen"), WeeklyAvailability::weekdays())
        .await
        .unwrap();

    let mut tasks = Vec::new();
    for _ in 0..4 {
        let assigner = s.assigner.clone();
        tasks.push(tokio::spawn(async move {
            assigner.try_assign_slot(&request_at(monday_at(10, 0))).await
        }));
    }

    let outcomes = futures::future::join_all(tasks).await;
    let reserved = outcomes
        .into_iter()
        .map(|joined| joined.unwrap().unwrap())
        .filter(SlotOutcome::is_reserved)
        .count();

    assert_eq!(reserved, 1);
    assert_eq!(s.appointments.all().await.len(), 1);
}

#[tokio::test]
async fn cancelled_appointments_release_their_slot() {
    let s = setup();
    s.availability
        .set_weekly(&StaffId::from("dr-chen"), WeeklyAvailability::weekdays())
        .await
        .unwrap();

    let reserved = match s
        .assigner
        .try_assign_slot(&request_at(monday_at(10, 0)))
        .await
        .unwrap()
    {
        SlotOutcome::Reserved(apt) => apt,
        other => panic!("expected Reserved, got {:?}", other),
    };

    let mut cancelled = reserved;
    cancelled.status = scheduling_cell::models::AppointmentStatus::Cancelled;
    s.appointments.update(cancelled).await.unwrap();

    let retaken = s.assigner.try_assign_slot(&request_at(monday_at(10, 0))).await.unwrap();
    assert!(retaken.is_reserved());
}
