use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::{AppointmentError, Slot};
use crate::services::store::AppointmentStore;

pub struct ConflictDetectionService {
    store: Arc<dyn AppointmentStore>,
}

impl ConflictDetectionService {
    pub fn new(store: Arc<dyn AppointmentStore>) -> Self {
        Self { store }
    }

    /// True when another appointment already holds the exact slot.
    /// `exclude_appointment_id` lets an update ignore its own record.
    pub async fn has_conflict(
        &self,
        slot: &Slot,
        exclude_appointment_id: Option<Uuid>,
    ) -> Result<bool, AppointmentError> {
        debug!("Checking conflicts for {}", slot);

        let existing = self.store.find_by_slot(slot).await?;
        let has_conflict = match existing {
            Some(appointment) => Some(appointment.id) != exclude_appointment_id,
            None => false,
        };

        if has_conflict {
            warn!("Conflict detected for {}", slot);
        }

        Ok(has_conflict)
    }

    pub async fn ensure_slot_free(
        &self,
        slot: &Slot,
        exclude_appointment_id: Option<Uuid>,
    ) -> Result<(), AppointmentError> {
        if self.has_conflict(slot, exclude_appointment_id).await? {
            return Err(AppointmentError::conflict(slot));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AppointmentStatus, NewAppointment};
    use crate::services::store::InMemoryAppointmentStore;
    use assert_matches::assert_matches;
    use chrono::{TimeZone, Utc};

    #[tokio::test]
    async fn test_exact_timestamp_only() {
        let store = Arc::new(InMemoryAppointmentStore::new());
        let date = Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap();
        let booked = store
            .create(NewAppointment {
                patient_id: "p1".into(),
                doctor_id: "d1".into(),
                appointment_date: date,
                status: AppointmentStatus::Scheduled,
            })
            .await
            .unwrap();

        let checker = ConflictDetectionService::new(store);

        assert!(checker.has_conflict(&Slot::new("d1", date), None).await.unwrap());
        assert!(!checker
            .has_conflict(&Slot::new("d1", date + chrono::Duration::seconds(1)), None)
            .await
            .unwrap());
        assert!(!checker.has_conflict(&Slot::new("d2", date), None).await.unwrap());
        assert!(!checker
            .has_conflict(&Slot::new("d1", date), Some(booked.id))
            .await
            .unwrap());

        assert_matches!(
            checker.ensure_slot_free(&Slot::new("d1", date), None).await,
            Err(AppointmentError::ConflictDetected { .. })
        );
    }
}
