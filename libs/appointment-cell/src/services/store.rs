use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::models::{Appointment, AppointmentChanges, AppointmentError, NewAppointment, Slot};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Appointment {0} not found")]
    NotFound(Uuid),

    #[error("Slot already taken: {0}")]
    SlotTaken(Slot),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl From<StoreError> for AppointmentError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound(id) => AppointmentError::NotFound(id),
            StoreError::SlotTaken(slot) => AppointmentError::conflict(&slot),
            StoreError::Backend(message) => AppointmentError::DatabaseError(message),
        }
    }
}

/// Persistence capability for appointment records.
///
/// Implementations must reject a `create` or `update` that would leave two
/// records on the same [`Slot`], returning [`StoreError::SlotTaken`].
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    async fn create(&self, appointment: NewAppointment) -> Result<Appointment, StoreError>;

    async fn get(&self, id: Uuid) -> Result<Appointment, StoreError>;

    async fn list(&self) -> Result<Vec<Appointment>, StoreError>;

    /// Appointments with `start <= appointment_date <= end`.
    async fn list_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, StoreError>;

    async fn find_by_slot(&self, slot: &Slot) -> Result<Option<Appointment>, StoreError>;

    async fn update(&self, id: Uuid, changes: AppointmentChanges) -> Result<Appointment, StoreError>;

    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;
}

#[derive(Default)]
struct StoreState {
    records: HashMap<Uuid, Appointment>,
    slots: HashMap<Slot, Uuid>,
}

/// Process-local store. The slot index and the records are guarded by one
/// lock so the uniqueness check and the write are a single step.
#[derive(Default)]
pub struct InMemoryAppointmentStore {
    state: RwLock<StoreState>,
}

impl InMemoryAppointmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn sorted(mut appointments: Vec<Appointment>) -> Vec<Appointment> {
        appointments.sort_by(|a, b| {
            a.appointment_date
                .cmp(&b.appointment_date)
                .then_with(|| a.created_at.cmp(&b.created_at))
        });
        appointments
    }
}

#[async_trait]
impl AppointmentStore for InMemoryAppointmentStore {
    async fn create(&self, appointment: NewAppointment) -> Result<Appointment, StoreError> {
        let mut state = self.state.write().await;

        let slot = Slot::new(appointment.doctor_id.clone(), appointment.appointment_date);
        if state.slots.contains_key(&slot) {
            return Err(StoreError::SlotTaken(slot));
        }

        let now = Utc::now();
        let record = Appointment {
            id: Uuid::new_v4(),
            patient_id: appointment.patient_id,
            doctor_id: appointment.doctor_id,
            appointment_date: appointment.appointment_date,
            status: appointment.status,
            created_at: now,
            updated_at: now,
        };

        state.slots.insert(slot, record.id);
        state.records.insert(record.id, record.clone());
        debug!("Stored appointment {}", record.id);

        Ok(record)
    }

    async fn get(&self, id: Uuid) -> Result<Appointment, StoreError> {
        let state = self.state.read().await;
        state.records.get(&id).cloned().ok_or(StoreError::NotFound(id))
    }

    async fn list(&self) -> Result<Vec<Appointment>, StoreError> {
        let state = self.state.read().await;
        Ok(Self::sorted(state.records.values().cloned().collect()))
    }

    async fn list_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, StoreError> {
        let state = self.state.read().await;
        let matching = state
            .records
            .values()
            .filter(|a| a.appointment_date >= start && a.appointment_date <= end)
            .cloned()
            .collect();
        Ok(Self::sorted(matching))
    }

    async fn find_by_slot(&self, slot: &Slot) -> Result<Option<Appointment>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .slots
            .get(slot)
            .and_then(|id| state.records.get(id))
            .cloned())
    }

    async fn update(&self, id: Uuid, changes: AppointmentChanges) -> Result<Appointment, StoreError> {
        let mut state = self.state.write().await;

        let existing = state.records.get(&id).cloned().ok_or(StoreError::NotFound(id))?;
        let merged = changes.apply_to(&existing, Utc::now());

        let old_slot = existing.slot();
        let new_slot = merged.slot();
        if new_slot != old_slot {
            if let Some(owner) = state.slots.get(&new_slot) {
                if *owner != id {
                    return Err(StoreError::SlotTaken(new_slot));
                }
            }
            state.slots.remove(&old_slot);
            state.slots.insert(new_slot, id);
        }

        state.records.insert(id, merged.clone());
        debug!("Updated appointment {}", id);

        Ok(merged)
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let mut state = self.state.write().await;

        let removed = state.records.remove(&id).ok_or(StoreError::NotFound(id))?;
        state.slots.remove(&removed.slot());
        debug!("Removed appointment {}", id);

        Ok(())
    }
}
