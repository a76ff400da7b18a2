use std::time::Duration;

use assert_matches::assert_matches;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use appointment_cell::models::AppointmentError;
use appointment_cell::services::{ClinicDirectory, DirectoryError, HttpClinicDirectory};
use appointment_cell::services::ExternalValidator;
use shared_utils::test_utils::{MockServiceResponses, TestConfig};

use std::sync::Arc;

async fn directory_for(server: &MockServer, timeout_secs: u64) -> HttpClinicDirectory {
    let mut config = TestConfig::with_mock_uri(&server.uri());
    config.external_request_timeout_secs = timeout_secs;
    HttpClinicDirectory::new(&config.to_app_config()).unwrap()
}

#[tokio::test]
async fn test_fetch_doctor_parses_profile() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/doctors/d1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            MockServiceResponses::doctor_response("d1", "Gregory", "House", true),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let directory = directory_for(&server, 2).await;
    let doctor = directory.fetch_doctor("d1").await.unwrap();

    assert_eq!(doctor.id, "d1");
    assert!(doctor.is_available);
    assert_eq!(doctor.full_name(), "Gregory House");
}

#[tokio::test]
async fn test_fetch_patient_parses_profile() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/patients/p1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            MockServiceResponses::patient_response("p1", "Ada", "Lovelace", "ada@example.com", "555-0100"),
        ))
        .mount(&server)
        .await;

    let directory = directory_for(&server, 2).await;
    let patient = directory.fetch_patient("p1").await.unwrap();

    assert_eq!(patient.email, "ada@example.com");
    assert_eq!(patient.phone_number, "555-0100");
}

#[tokio::test]
async fn test_404_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/doctors/d1"))
        .respond_with(ResponseTemplate::new(404).set_body_json(
            MockServiceResponses::error_response("Doctor not found"),
        ))
        .mount(&server)
        .await;

    let directory = directory_for(&server, 2).await;

    assert_matches!(
        directory.fetch_doctor("d1").await,
        Err(DirectoryError::NotFound { service: "doctor", id }) if id == "d1"
    );
}

#[tokio::test]
async fn test_server_error_is_upstream_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/patients/p1"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let directory = directory_for(&server, 2).await;

    assert_matches!(
        directory.fetch_patient("p1").await,
        Err(DirectoryError::Upstream { service: "patient", .. })
    );
}

#[tokio::test]
async fn test_malformed_body_is_upstream_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/doctors/d1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "d1" })))
        .mount(&server)
        .await;

    let directory = directory_for(&server, 2).await;

    assert_matches!(
        directory.fetch_doctor("d1").await,
        Err(DirectoryError::Upstream { message, .. }) if message.contains("malformed")
    );
}

#[tokio::test]
async fn test_timeout_is_upstream_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/doctors/d1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(MockServiceResponses::doctor_response("d1", "Gregory", "House", true))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let validator = ExternalValidator::new(Arc::new(directory_for(&server, 1).await));

    assert_matches!(
        validator.validate_doctor("d1").await,
        Err(AppointmentError::UpstreamFailure { service, .. }) if service == "doctor"
    );
}

#[tokio::test]
async fn test_ids_are_path_encoded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/patients/a%2Fb"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            MockServiceResponses::patient_response("a/b", "Ada", "Lovelace", "ada@example.com", "555-0100"),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let directory = directory_for(&server, 2).await;
    let patient = directory.fetch_patient("a/b").await.unwrap();

    assert_eq!(patient.id, "a/b");
}

#[tokio::test]
async fn test_unavailable_doctor_is_rejected_by_validator() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/doctors/d1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            MockServiceResponses::doctor_response("d1", "Gregory", "House", false),
        ))
        .mount(&server)
        .await;

    let validator = ExternalValidator::new(Arc::new(directory_for(&server, 2).await));

    assert_matches!(
        validator.validate_doctor("d1").await,
        Err(AppointmentError::DoctorNotAvailable(id)) if id == "d1"
    );
}
