use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;
use uuid::Uuid;

use shared_config::AppConfig;

pub struct TestConfig {
    pub doctor_service_url: String,
    pub patient_service_url: String,
    pub external_request_timeout_secs: u64,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            doctor_service_url: "http://localhost:3001".to_string(),
            patient_service_url: "http://localhost:3000".to_string(),
            external_request_timeout_secs: 2,
        }
    }
}

impl TestConfig {
    /// Both upstream services served by the same mock server.
    pub fn with_mock_uri(uri: &str) -> Self {
        Self {
            doctor_service_url: uri.to_string(),
            patient_service_url: uri.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            doctor_service_url: self.doctor_service_url.clone(),
            patient_service_url: self.patient_service_url.clone(),
            external_request_timeout_secs: self.external_request_timeout_secs,
            ..AppConfig::default()
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

/// Canned bodies in the shape the doctor and patient services return.
pub struct MockServiceResponses;

impl MockServiceResponses {
    pub fn doctor_response(doctor_id: &str, first_name: &str, last_name: &str, is_available: bool) -> serde_json::Value {
        json!({
            "id": doctor_id,
            "firstName": first_name,
            "lastName": last_name,
            "isAvailable": is_available,
            "specialization": "General Practice",
            "createdAt": "2024-01-01T00:00:00Z"
        })
    }

    pub fn patient_response(patient_id: &str, first_name: &str, last_name: &str, email: &str, phone_number: &str) -> serde_json::Value {
        json!({
            "id": patient_id,
            "firstName": first_name,
            "lastName": last_name,
            "email": email,
            "phoneNumber": phone_number,
            "createdAt": "2024-01-01T00:00:00Z"
        })
    }

    /// A row as PostgREST returns it from the `appointments` table.
    pub fn appointment_row(id: Uuid, patient_id: &str, doctor_id: &str, appointment_date: DateTime<Utc>) -> serde_json::Value {
        json!({
            "id": id,
            "patient_id": patient_id,
            "doctor_id": doctor_id,
            "appointment_date": appointment_date.to_rfc3339(),
            "status": "scheduled",
            "created_at": "2024-01-01T00:00:00+00:00",
            "updated_at": "2024-01-01T00:00:00+00:00"
        })
    }

    pub fn error_response(message: &str) -> serde_json::Value {
        json!({
            "statusCode": 404,
            "message": message,
            "error": "Not Found"
        })
    }
}
