use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Method;
use serde_json::{json, Map, Value};
use tracing::debug;
use uuid::Uuid;

use shared_database::{SupabaseClient, SupabaseError};

use crate::models::{Appointment, AppointmentChanges, NewAppointment, Slot};
use crate::services::store::{AppointmentStore, StoreError};

const TABLE_PATH: &str = "/rest/v1/appointments";

/// Appointments kept in a PostgREST `appointments` table.
///
/// The table carries a unique index on `(doctor_id, appointment_date)`;
/// PostgREST answers a violation with 409, which surfaces as `SlotTaken`.
pub struct SupabaseAppointmentStore {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseAppointmentStore {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    fn encode_date(date: &DateTime<Utc>) -> String {
        let formatted = date.to_rfc3339_opts(SecondsFormat::AutoSi, true);
        urlencoding::encode(&formatted).into_owned()
    }

    fn backend(error: SupabaseError) -> StoreError {
        StoreError::Backend(error.to_string())
    }

    async fn fetch(&self, path: &str) -> Result<Vec<Appointment>, StoreError> {
        self.supabase
            .request::<Vec<Appointment>>(Method::GET, path, None)
            .await
            .map_err(Self::backend)
    }
}

#[async_trait]
impl AppointmentStore for SupabaseAppointmentStore {
    async fn create(&self, appointment: NewAppointment) -> Result<Appointment, StoreError> {
        let slot = Slot::new(appointment.doctor_id.clone(), appointment.appointment_date);
        let now = Utc::now();

        let body = json!({
            "id": Uuid::new_v4(),
            "patient_id": appointment.patient_id,
            "doctor_id": appointment.doctor_id,
            "appointment_date": appointment.appointment_date.to_rfc3339(),
            "status": appointment.status,
            "created_at": now.to_rfc3339(),
            "updated_at": now.to_rfc3339(),
        });

        let rows: Vec<Appointment> = self
            .supabase
            .request_with_headers(
                Method::POST,
                TABLE_PATH,
                Some(body),
                Some(SupabaseClient::return_representation()),
            )
            .await
            .map_err(|e| match e {
                SupabaseError::Conflict(_) => StoreError::SlotTaken(slot.clone()),
                other => Self::backend(other),
            })?;

        rows.into_iter()
            .next()
            .ok_or_else(|| StoreError::Backend("insert returned no rows".to_string()))
    }

    async fn get(&self, id: Uuid) -> Result<Appointment, StoreError> {
        let path = format!("{}?id=eq.{}", TABLE_PATH, id);
        self.fetch(&path)
            .await?
            .into_iter()
            .next()
            .ok_or(StoreError::NotFound(id))
    }

    async fn list(&self) -> Result<Vec<Appointment>, StoreError> {
        let path = format!("{}?order=appointment_date.asc", TABLE_PATH);
        self.fetch(&path).await
    }

    async fn list_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, StoreError> {
        let path = format!(
            "{}?appointment_date=gte.{}&appointment_date=lte.{}&order=appointment_date.asc",
            TABLE_PATH,
            Self::encode_date(&start),
            Self::encode_date(&end),
        );
        debug!("Listing appointments between {} and {}", start, end);
        self.fetch(&path).await
    }

    async fn find_by_slot(&self, slot: &Slot) -> Result<Option<Appointment>, StoreError> {
        let path = format!(
            "{}?doctor_id=eq.{}&appointment_date=eq.{}&limit=1",
            TABLE_PATH,
            urlencoding::encode(&slot.doctor_id),
            Self::encode_date(&slot.appointment_date),
        );
        Ok(self.fetch(&path).await?.into_iter().next())
    }

    async fn update(&self, id: Uuid, changes: AppointmentChanges) -> Result<Appointment, StoreError> {
        let existing = self.get(id).await?;
        let target_slot = changes.apply_to(&existing, Utc::now()).slot();

        let mut body = Map::new();
        if let Some(patient_id) = changes.patient_id {
            body.insert("patient_id".into(), json!(patient_id));
        }
        if let Some(doctor_id) = changes.doctor_id {
            body.insert("doctor_id".into(), json!(doctor_id));
        }
        if let Some(date) = changes.appointment_date {
            body.insert("appointment_date".into(), json!(date.to_rfc3339()));
        }
        if let Some(status) = changes.status {
            body.insert("status".into(), json!(status));
        }
        body.insert("updated_at".into(), json!(Utc::now().to_rfc3339()));

        let path = format!("{}?id=eq.{}", TABLE_PATH, id);
        let rows: Vec<Appointment> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(Value::Object(body)),
                Some(SupabaseClient::return_representation()),
            )
            .await
            .map_err(|e| match e {
                SupabaseError::Conflict(_) => StoreError::SlotTaken(target_slot.clone()),
                other => Self::backend(other),
            })?;

        rows.into_iter().next().ok_or(StoreError::NotFound(id))
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let path = format!("{}?id=eq.{}", TABLE_PATH, id);
        let rows: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::DELETE,
                &path,
                None,
                Some(SupabaseClient::return_representation()),
            )
            .await
            .map_err(Self::backend)?;

        if rows.is_empty() {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }
}
