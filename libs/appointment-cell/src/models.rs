// libs/appointment-cell/src/models.rs
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: String,
    pub doctor_id: String,
    pub appointment_date: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    pub fn slot(&self) -> Slot {
        Slot::new(self.doctor_id.clone(), self.appointment_date)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    #[default]
    Scheduled,
    Confirmed,
    Completed,
    Cancelled,
    NoShow,
    Rescheduled,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Scheduled => write!(f, "scheduled"),
            AppointmentStatus::Confirmed => write!(f, "confirmed"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
            AppointmentStatus::NoShow => write!(f, "no_show"),
            AppointmentStatus::Rescheduled => write!(f, "rescheduled"),
        }
    }
}

/// Uniqueness key: one appointment per doctor per exact timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Slot {
    pub doctor_id: String,
    pub appointment_date: DateTime<Utc>,
}

impl Slot {
    pub fn new(doctor_id: impl Into<String>, appointment_date: DateTime<Utc>) -> Self {
        Self {
            doctor_id: doctor_id.into(),
            appointment_date,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "doctor {} at {}", self.doctor_id, self.appointment_date.to_rfc3339())
    }
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAppointmentRequest {
    pub patient_id: String,
    pub doctor_id: String,
    pub appointment_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAppointmentRequest {
    #[serde(default)]
    pub patient_id: Option<String>,
    #[serde(default)]
    pub doctor_id: Option<String>,
    #[serde(default)]
    pub appointment_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: Option<AppointmentStatus>,
}

impl UpdateAppointmentRequest {
    pub fn touches_slot(&self) -> bool {
        self.doctor_id.is_some() || self.appointment_date.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.patient_id.is_none()
            && self.doctor_id.is_none()
            && self.appointment_date.is_none()
            && self.status.is_none()
    }
}

/// Fields of a record about to be persisted; id and timestamps are assigned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAppointment {
    pub patient_id: String,
    pub doctor_id: String,
    pub appointment_date: DateTime<Utc>,
    pub status: AppointmentStatus,
}

impl From<CreateAppointmentRequest> for NewAppointment {
    fn from(request: CreateAppointmentRequest) -> Self {
        Self {
            patient_id: request.patient_id,
            doctor_id: request.doctor_id,
            appointment_date: request.appointment_date,
            status: AppointmentStatus::default(),
        }
    }
}

/// Partial update merged over an existing record by the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppointmentChanges {
    pub patient_id: Option<String>,
    pub doctor_id: Option<String>,
    pub appointment_date: Option<DateTime<Utc>>,
    pub status: Option<AppointmentStatus>,
}

impl From<UpdateAppointmentRequest> for AppointmentChanges {
    fn from(request: UpdateAppointmentRequest) -> Self {
        Self {
            patient_id: request.patient_id,
            doctor_id: request.doctor_id,
            appointment_date: request.appointment_date,
            status: request.status,
        }
    }
}

impl AppointmentChanges {
    /// Apply the provided fields over `existing`, leaving identity and `created_at` untouched.
    pub fn apply_to(&self, existing: &Appointment, now: DateTime<Utc>) -> Appointment {
        Appointment {
            id: existing.id,
            patient_id: self.patient_id.clone().unwrap_or_else(|| existing.patient_id.clone()),
            doctor_id: self.doctor_id.clone().unwrap_or_else(|| existing.doctor_id.clone()),
            appointment_date: self.appointment_date.unwrap_or(existing.appointment_date),
            status: self.status.clone().unwrap_or_else(|| existing.status.clone()),
            created_at: existing.created_at,
            updated_at: now,
        }
    }
}

// ==============================================================================
// EXTERNAL DIRECTORY MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DoctorProfile {
    pub id: String,
    pub is_available: bool,
    pub first_name: String,
    pub last_name: String,
}

impl DoctorProfile {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PatientProfile {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
}

impl PatientProfile {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

// ==============================================================================
// UPCOMING WINDOW MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppointmentResponse {
    pub appointment_id: Uuid,
    pub patient_name: String,
    pub doctor_name: String,
    pub appointment_date: DateTime<Utc>,
    pub patient_email: String,
    pub status: AppointmentStatus,
    pub patient_mobile_number: String,
}

impl AppointmentResponse {
    pub fn compose(
        appointment: &Appointment,
        patient: &PatientProfile,
        doctor: &DoctorProfile,
    ) -> Self {
        Self {
            appointment_id: appointment.id,
            patient_name: patient.full_name(),
            doctor_name: doctor.full_name(),
            appointment_date: appointment.appointment_date,
            patient_email: patient.email.clone(),
            status: appointment.status.clone(),
            patient_mobile_number: patient.phone_number.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnrichmentFailure {
    pub code: String,
    pub message: String,
}

/// One entry of the next-day listing; a failed lookup keeps the appointment visible.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum UpcomingAppointment {
    Enriched(AppointmentResponse),
    Failed {
        appointment_id: Uuid,
        appointment_date: DateTime<Utc>,
        status: AppointmentStatus,
        error: EnrichmentFailure,
    },
}

impl UpcomingAppointment {
    pub fn appointment_id(&self) -> Uuid {
        match self {
            UpcomingAppointment::Enriched(response) => response.appointment_id,
            UpcomingAppointment::Failed { appointment_id, .. } => *appointment_id,
        }
    }

    pub fn is_enriched(&self) -> bool {
        matches!(self, UpcomingAppointment::Enriched(_))
    }
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AppointmentError {
    #[error("Appointment {0} not found")]
    NotFound(Uuid),

    #[error("Doctor with ID {0} not found")]
    DoctorNotFound(String),

    #[error("Patient with ID {0} not found")]
    PatientNotFound(String),

    #[error("Doctor {0} is not available for appointments")]
    DoctorNotAvailable(String),

    #[error("Doctor {doctor_id} already has an appointment at {appointment_date}")]
    ConflictDetected {
        doctor_id: String,
        appointment_date: DateTime<Utc>,
    },

    #[error("Failed to reach {service} service: {message}")]
    UpstreamFailure { service: String, message: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl AppointmentError {
    pub fn conflict(slot: &Slot) -> Self {
        AppointmentError::ConflictDetected {
            doctor_id: slot.doctor_id.clone(),
            appointment_date: slot.appointment_date,
        }
    }

    /// Stable snake_case name used in per-item failure payloads.
    pub fn code(&self) -> &'static str {
        match self {
            AppointmentError::NotFound(_)
            | AppointmentError::DoctorNotFound(_)
            | AppointmentError::PatientNotFound(_) => "not_found",
            AppointmentError::DoctorNotAvailable(_) => "doctor_unavailable",
            AppointmentError::ConflictDetected { .. } => "slot_conflict",
            AppointmentError::UpstreamFailure { .. } => "upstream_failure",
            AppointmentError::InvalidInput(_) => "invalid_input",
            AppointmentError::DatabaseError(_) => "internal",
        }
    }
}

impl From<&AppointmentError> for EnrichmentFailure {
    fn from(error: &AppointmentError) -> Self {
        Self {
            code: error.code().to_string(),
            message: error.to_string(),
        }
    }
}
