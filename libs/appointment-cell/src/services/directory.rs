use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, error};

use shared_config::AppConfig;

use crate::models::{AppointmentError, DoctorProfile, PatientProfile};

pub const DOCTOR_SERVICE: &str = "doctor";
pub const PATIENT_SERVICE: &str = "patient";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DirectoryError {
    #[error("{service} {id} not found")]
    NotFound { service: &'static str, id: String },

    #[error("{service} service error: {message}")]
    Upstream { service: &'static str, message: String },
}

/// Read access to the doctor and patient services.
#[async_trait]
pub trait ClinicDirectory: Send + Sync {
    async fn fetch_doctor(&self, doctor_id: &str) -> Result<DoctorProfile, DirectoryError>;

    async fn fetch_patient(&self, patient_id: &str) -> Result<PatientProfile, DirectoryError>;
}

pub struct HttpClinicDirectory {
    client: Client,
    doctor_service_url: String,
    patient_service_url: String,
}

impl HttpClinicDirectory {
    pub fn new(config: &AppConfig) -> Result<Self, DirectoryError> {
        let client = Client::builder()
            .timeout(config.external_request_timeout())
            .build()
            .map_err(|e| DirectoryError::Upstream {
                service: "directory",
                message: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            doctor_service_url: config.doctor_service_url.trim_end_matches('/').to_string(),
            patient_service_url: config.patient_service_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_resource<T>(&self, service: &'static str, url: String, id: &str) -> Result<T, DirectoryError>
    where
        T: DeserializeOwned,
    {
        debug!("Fetching {} {} from {}", service, id, url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            let message = if e.is_timeout() {
                format!("request for {} timed out", id)
            } else {
                e.to_string()
            };
            error!("{} service request failed: {}", service, message);
            DirectoryError::Upstream { service, message }
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(DirectoryError::NotFound {
                service,
                id: id.to_string(),
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("{} service returned {}: {}", service, status, body);
            return Err(DirectoryError::Upstream {
                service,
                message: format!("unexpected status {}", status),
            });
        }

        response.json::<T>().await.map_err(|e| {
            error!("{} service returned a malformed body: {}", service, e);
            DirectoryError::Upstream {
                service,
                message: format!("malformed response: {}", e),
            }
        })
    }
}

#[async_trait]
impl ClinicDirectory for HttpClinicDirectory {
    async fn fetch_doctor(&self, doctor_id: &str) -> Result<DoctorProfile, DirectoryError> {
        let url = format!(
            "{}/doctors/{}",
            self.doctor_service_url,
            urlencoding::encode(doctor_id)
        );
        self.get_resource(DOCTOR_SERVICE, url, doctor_id).await
    }

    async fn fetch_patient(&self, patient_id: &str) -> Result<PatientProfile, DirectoryError> {
        let url = format!(
            "{}/patients/{}",
            self.patient_service_url,
            urlencoding::encode(patient_id)
        );
        self.get_resource(PATIENT_SERVICE, url, patient_id).await
    }
}

impl From<DirectoryError> for AppointmentError {
    fn from(error: DirectoryError) -> Self {
        match error {
            DirectoryError::NotFound { service: DOCTOR_SERVICE, id } => AppointmentError::DoctorNotFound(id),
            DirectoryError::NotFound { id, .. } => AppointmentError::PatientNotFound(id),
            DirectoryError::Upstream { service, message } => AppointmentError::UpstreamFailure {
                service: service.to_string(),
                message,
            },
        }
    }
}
