use std::sync::Arc;

use tracing::{debug, warn};

use crate::models::{AppointmentError, DoctorProfile, PatientProfile};
use crate::services::directory::ClinicDirectory;

/// Translates directory lookups into admission outcomes.
#[derive(Clone)]
pub struct ExternalValidator {
    directory: Arc<dyn ClinicDirectory>,
}

impl ExternalValidator {
    pub fn new(directory: Arc<dyn ClinicDirectory>) -> Self {
        Self { directory }
    }

    /// Found and flagged available, or `DoctorNotFound` / `DoctorNotAvailable` /
    /// `UpstreamFailure`.
    pub async fn validate_doctor(&self, doctor_id: &str) -> Result<DoctorProfile, AppointmentError> {
        debug!("Validating doctor availability: {}", doctor_id);

        let doctor = self.directory.fetch_doctor(doctor_id).await?;

        if !doctor.is_available {
            warn!("Doctor {} is not available", doctor_id);
            return Err(AppointmentError::DoctorNotAvailable(doctor_id.to_string()));
        }

        Ok(doctor)
    }

    pub async fn validate_patient(&self, patient_id: &str) -> Result<PatientProfile, AppointmentError> {
        debug!("Validating patient: {}", patient_id);
        Ok(self.directory.fetch_patient(patient_id).await?)
    }

    /// Runs both checks concurrently; the first rejection wins and cancels the other call.
    pub async fn validate_participants(
        &self,
        doctor_id: &str,
        patient_id: &str,
    ) -> Result<(DoctorProfile, PatientProfile), AppointmentError> {
        tokio::try_join!(
            self.validate_doctor(doctor_id),
            self.validate_patient(patient_id),
        )
    }
}
