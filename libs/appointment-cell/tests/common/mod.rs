#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use appointment_cell::models::{DoctorProfile, PatientProfile};
use appointment_cell::services::directory::{DOCTOR_SERVICE, PATIENT_SERVICE};
use appointment_cell::services::{
    AppointmentBookingService, ClinicDirectory, DirectoryError, InMemoryAppointmentStore,
};

/// In-process directory that records how often each lookup is made.
#[derive(Default)]
pub struct FakeDirectory {
    doctors: Mutex<HashMap<String, Result<DoctorProfile, DirectoryError>>>,
    patients: Mutex<HashMap<String, Result<PatientProfile, DirectoryError>>>,
    doctor_calls: AtomicUsize,
    patient_calls: AtomicUsize,
}

impl FakeDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_doctor(self, id: &str, first_name: &str, last_name: &str, is_available: bool) -> Self {
        self.doctors.lock().unwrap().insert(
            id.to_string(),
            Ok(DoctorProfile {
                id: id.to_string(),
                is_available,
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
            }),
        );
        self
    }

    pub fn with_patient(self, id: &str, first_name: &str, last_name: &str) -> Self {
        self.patients.lock().unwrap().insert(
            id.to_string(),
            Ok(PatientProfile {
                id: id.to_string(),
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
                email: format!("{}@example.com", id),
                phone_number: format!("+353-{}", id),
            }),
        );
        self
    }

    pub fn with_failing_doctor(self, id: &str, message: &str) -> Self {
        self.doctors.lock().unwrap().insert(
            id.to_string(),
            Err(DirectoryError::Upstream {
                service: DOCTOR_SERVICE,
                message: message.to_string(),
            }),
        );
        self
    }

    pub fn with_failing_patient(self, id: &str, message: &str) -> Self {
        self.patients.lock().unwrap().insert(
            id.to_string(),
            Err(DirectoryError::Upstream {
                service: PATIENT_SERVICE,
                message: message.to_string(),
            }),
        );
        self
    }

    pub fn doctor_calls(&self) -> usize {
        self.doctor_calls.load(Ordering::SeqCst)
    }

    pub fn patient_calls(&self) -> usize {
        self.patient_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.doctor_calls() + self.patient_calls()
    }

    pub fn reset_calls(&self) {
        self.doctor_calls.store(0, Ordering::SeqCst);
        self.patient_calls.store(0, Ordering::SeqCst);
    }
}

#[async_trait]
impl ClinicDirectory for FakeDirectory {
    async fn fetch_doctor(&self, doctor_id: &str) -> Result<DoctorProfile, DirectoryError> {
        self.doctor_calls.fetch_add(1, Ordering::SeqCst);
        self.doctors
            .lock()
            .unwrap()
            .get(doctor_id)
            .cloned()
            .unwrap_or_else(|| {
                Err(DirectoryError::NotFound {
                    service: DOCTOR_SERVICE,
                    id: doctor_id.to_string(),
                })
            })
    }

    async fn fetch_patient(&self, patient_id: &str) -> Result<PatientProfile, DirectoryError> {
        self.patient_calls.fetch_add(1, Ordering::SeqCst);
        self.patients
            .lock()
            .unwrap()
            .get(patient_id)
            .cloned()
            .unwrap_or_else(|| {
                Err(DirectoryError::NotFound {
                    service: PATIENT_SERVICE,
                    id: patient_id.to_string(),
                })
            })
    }
}

/// Doctor d1 and d2 available, d3 unavailable; patients p1..p3 registered.
pub fn standard_directory() -> FakeDirectory {
    FakeDirectory::new()
        .with_doctor("d1", "Gregory", "House", true)
        .with_doctor("d2", "Lisa", "Cuddy", true)
        .with_doctor("d3", "James", "Wilson", false)
        .with_patient("p1", "Ada", "Lovelace")
        .with_patient("p2", "Alan", "Turing")
        .with_patient("p3", "Grace", "Hopper")
}

pub struct BookingFixture {
    pub directory: Arc<FakeDirectory>,
    pub store: Arc<InMemoryAppointmentStore>,
    pub service: AppointmentBookingService,
}

pub fn booking_fixture(directory: FakeDirectory) -> BookingFixture {
    let directory = Arc::new(directory);
    let store = Arc::new(InMemoryAppointmentStore::new());
    let service = AppointmentBookingService::new(directory.clone(), store.clone());
    BookingFixture { directory, store, service }
}
