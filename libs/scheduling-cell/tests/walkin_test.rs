// libs/scheduling-cell/tests/walkin_test.rs
use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::NaiveDate;
use directory_cell::models::{Patient, StaffMember, WeeklyAvailability};
use directory_cell::services::{AvailabilityService, PatientRegistry};
use directory_cell::store::PatientStore;
use scheduling_cell::models::{
    Appointment, AppointmentStatus, ScanScope, ScheduleCommit, SchedulingError, WalkInRequest,
};
use scheduling_cell::services::{SlotAssigner, WalkInPolicy};
use scheduling_cell::store::AppointmentStore;
use shared_config::SchedulerConfig;
use shared_models::{PatientId, StaffId};
use shared_utils::test_utils::{
    doctor, nurse, MemoryAppointmentStore, MemoryAvailabilityStore, MemoryPatientStore,
    MemoryStaffDirectory,
};

struct Setup {
    policy: WalkInPolicy,
    availability: AvailabilityService,
    appointments: Arc<MemoryAppointmentStore>,
    patients: Arc<MemoryPatientStore>,
}

fn setup_with(staff: Vec<StaffMember>, config: SchedulerConfig) -> Setup {
    let directory = MemoryStaffDirectory::with_staff(staff);
    let patients = MemoryPatientStore::empty();
    let availability_store = MemoryAvailabilityStore::empty();
    let appointments = MemoryAppointmentStore::empty();

    let availability = AvailabilityService::new(directory.clone(), availability_store);
    let registry = PatientRegistry::new(patients.clone());
    let assigner = SlotAssigner::new(
        directory.clone(),
        patients.clone(),
        availability.clone(),
        appointments.clone(),
        config.clone(),
    );
    let policy = WalkInPolicy::new(
        directory,
        registry,
        availability.clone(),
        assigner,
        appointments.clone(),
        config,
    );

    Setup {
        policy,
        availability,
        appointments,
        patients,
    }
}

fn setup(staff: Vec<StaffMember>) -> Setup {
    setup_with(staff, SchedulerConfig::default())
}

// A Monday.
fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
}

fn walk_in(name: &str, preferred: Option<&str>) -> WalkInRequest {
    WalkInRequest {
        patient: Patient::walk_in(PatientId::from(name), name),
        preferred_doctor: preferred.map(str::to_string),
        date: monday(),
    }
}

#[tokio::test]
async fn assigns_the_first_slot_of_the_day() {
    let s = setup(vec![doctor("dr-chen", "Amara Chen")]);
    s.availability
        .set_weekly(&StaffId::from("dr-chen"), WeeklyAvailability::weekdays())
        .await
        .unwrap();

    let assignment = s.policy.assign_walk_in(walk_in("pt-walkin", None)).await.unwrap();

    assert!(assignment.found_slot());
    assert_eq!(assignment.doctor.id, StaffId::from("dr-chen"));
    let start = assignment.appointment.appointed_at.unwrap();
    assert_eq!(start, monday().and_hms_opt(9, 0, 0).unwrap().and_utc());
}

#[tokio::test]
async fn consecutive_walk_ins_fill_consecutive_slots() {
    let s = setup(vec![doctor("dr-chen", "Amara Chen")]);
    s.availability
        .set_weekly(&StaffId::from("dr-chen"), WeeklyAvailability::weekdays())
        .await
        .unwrap();

    let first = s.policy.assign_walk_in(walk_in("pt-one", None)).await.unwrap();
    let second = s.policy.assign_walk_in(walk_in("pt-two", None)).await.unwrap();

    assert_eq!(
        first.appointment.appointed_at.unwrap(),
        monday().and_hms_opt(9, 0, 0).unwrap().and_utc()
    );
    assert_eq!(
        second.appointment.appointed_at.unwrap(),
        monday().and_hms_opt(9, 30, 0).unwrap().and_utc()
    );
}

#[tokio::test]
async fn preferred_doctor_name_is_matched_case_insensitively() {
    let s = setup(vec![
        doctor("dr-chen", "Amara Chen"),
        doctor("dr-okafor", "Ngozi Okafor"),
    ]);
    for id in ["dr-chen", "dr-okafor"] {
        s.availability
            .set_weekly(&StaffId::from(id), WeeklyAvailability::weekdays())
            .await
            .unwrap();
    }

    let assignment = s
        .policy
        .assign_walk_in(walk_in("pt-walkin", Some("ngozi okafor")))
        .await
        .unwrap();

    assert!(assignment.found_slot());
    assert_eq!(assignment.doctor.id, StaffId::from("dr-okafor"));
}

#[tokio::test]
async fn unresolvable_preferred_name_falls_back_to_any_doctor() {
    let s = setup(vec![doctor("dr-chen", "Amara Chen")]);
    s.availability
        .set_weekly(&StaffId::from("dr-chen"), WeeklyAvailability::weekdays())
        .await
        .unwrap();

    let assignment = s
        .policy
        .assign_walk_in(walk_in("pt-walkin", Some("Doctor Nobody")))
        .await
        .unwrap();

    assert!(assignment.found_slot());
    assert_eq!(assignment.doctor.id, StaffId::from("dr-chen"));
}

#[tokio::test]
async fn a_nurse_cannot_be_the_preferred_doctor() {
    let s = setup(vec![
        doctor("dr-chen", "Amara Chen"),
        nurse("nu-silva", "Rui Silva"),
    ]);
    s.availability
        .set_weekly(&StaffId::from("dr-chen"), WeeklyAvailability::weekdays())
        .await
        .unwrap();
    s.availability
        .set_weekly(&StaffId::from("nu-silva"), WeeklyAvailability::weekdays())
        .await
        .unwrap();

    let assignment = s
        .policy
        .assign_walk_in(walk_in("pt-walkin", Some("Rui Silva")))
        .await
        .unwrap();

    assert_eq!(assignment.doctor.id, StaffId::from("dr-chen"));
}

#[tokio::test]
async fn full_day_yields_a_persisted_no_slot_record() {
    // One bookable slot: 09:00-10:00.
    let config = SchedulerConfig {
        day_start_hour: 9,
        day_end_hour: 10,
        default_slot_minutes: 60,
        ..SchedulerConfig::default()
    };
    let s = setup_with(vec![doctor("dr-chen", "Amara Chen")], config);
    s.availability
        .set_weekly(&StaffId::from("dr-chen"), WeeklyAvailability::weekdays())
        .await
        .unwrap();

    let first = s.policy.assign_walk_in(walk_in("pt-one", None)).await.unwrap();
    assert!(first.found_slot());

    let second = s.policy.assign_walk_in(walk_in("pt-two", None)).await.unwrap();
    assert!(!second.found_slot());
    assert_eq!(second.appointment.status, AppointmentStatus::NoSlot);

    // The no_slot outcome is persisted, not just returned.
    let stored = s.appointments.all().await;
    assert!(stored
        .iter()
        .any(|a| a.status == AppointmentStatus::NoSlot
            && a.patient_id == PatientId::from("pt-two")));
}

#[tokio::test]
async fn walk_in_always_lands_on_the_free_doctor() {
    // The candidate order is shuffled, so repeat the scenario: whichever
    // doctor is tried first, a booked-out day must never absorb the walk-in.
    for round in 0..10 {
        let config = SchedulerConfig {
            day_start_hour: 9,
            day_end_hour: 10,
            default_slot_minutes: 30,
            ..SchedulerConfig::default()
        };
        let s = setup_with(
            vec![doctor("dr-chen", "Amara Chen"), doctor("dr-okafor", "Ngozi Okafor")],
            config,
        );
        for id in ["dr-chen", "dr-okafor"] {
            s.availability
                .set_weekly(&StaffId::from(id), WeeklyAvailability::weekdays())
                .await
                .unwrap();
        }

        // Fill dr-chen's whole day (two 30-minute slots).
        for minute in [0, 30] {
            let blocker = Appointment::pending(
                StaffId::from("dr-chen"),
                PatientId::from("pt-blocker"),
                monday().and_hms_opt(9, minute, 0).unwrap().and_utc(),
                30,
            );
            let snapshot = s.appointments.snapshot(ScanScope::AllStaff).await.unwrap();
            s.appointments
                .commit(ScheduleCommit {
                    scope: ScanScope::AllStaff,
                    basis_version: snapshot.version,
                    updates: vec![],
                    inserts: vec![blocker],
                })
                .await
                .unwrap();
        }

        let assignment = s.policy.assign_walk_in(walk_in("pt-walkin", None)).await.unwrap();

        assert!(assignment.found_slot(), "round {}: walk-in found no slot", round);
        assert_eq!(
            assignment.doctor.id,
            StaffId::from("dr-okafor"),
            "round {}: landed on the booked-out doctor",
            round
        );
    }
}

#[tokio::test]
async fn off_day_doctor_yields_no_slot() {
    let s = setup(vec![doctor("dr-chen", "Amara Chen")]);
    // No availability record at all.

    let assignment = s.policy.assign_walk_in(walk_in("pt-walkin", None)).await.unwrap();

    assert!(!assignment.found_slot());
    assert_eq!(assignment.appointment.status, AppointmentStatus::NoSlot);
}

#[tokio::test]
async fn no_registered_doctors_is_an_error() {
    let s = setup(vec![nurse("nu-silva", "Rui Silva")]);

    let result = s.policy.assign_walk_in(walk_in("pt-walkin", None)).await;

    assert_matches!(result, Err(SchedulingError::NoDoctorsRegistered));
}

#[tokio::test]
async fn walk_in_registration_never_clobbers_an_existing_patient() {
    let s = setup(vec![doctor("dr-chen", "Amara Chen")]);
    s.availability
        .set_weekly(&StaffId::from("dr-chen"), WeeklyAvailability::weekdays())
        .await
        .unwrap();

    let existing = Patient {
        id: PatientId::from("pt-app"),
        full_name: "Ines Duarte".to_string(),
        contact: Some("555-0100".to_string()),
        email: Some("ines@example.com".to_string()),
        is_app_user: true,
    };
    s.patients.upsert(existing.clone()).await.unwrap();

    s.policy
        .assign_walk_in(WalkInRequest {
            patient: Patient::walk_in(PatientId::from("pt-app"), "I. Duarte"),
            preferred_doctor: None,
            date: monday(),
        })
        .await
        .unwrap();

    let stored = s.patients.get(&PatientId::from("pt-app")).await.unwrap().unwrap();
    assert_eq!(stored, existing);
}
