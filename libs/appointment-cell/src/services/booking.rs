// libs/appointment-cell/src/services/booking.rs
use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::{
    Appointment, AppointmentChanges, AppointmentError, CreateAppointmentRequest,
    NewAppointment, Slot, UpdateAppointmentRequest,
};
use crate::services::conflict::ConflictDetectionService;
use crate::services::directory::ClinicDirectory;
use crate::services::store::AppointmentStore;
use crate::services::validation::ExternalValidator;

/// Admission engine: validate participants, check the slot, then persist.
pub struct AppointmentBookingService {
    validator: ExternalValidator,
    conflict_service: ConflictDetectionService,
    store: Arc<dyn AppointmentStore>,
}

impl AppointmentBookingService {
    pub fn new(directory: Arc<dyn ClinicDirectory>, store: Arc<dyn AppointmentStore>) -> Self {
        Self {
            validator: ExternalValidator::new(directory),
            conflict_service: ConflictDetectionService::new(Arc::clone(&store)),
            store,
        }
    }

    pub async fn create_appointment(
        &self,
        request: CreateAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        info!("Booking appointment for patient {} with doctor {} at {}",
              request.patient_id, request.doctor_id, request.appointment_date);

        require_id("patient_id", &request.patient_id)?;
        require_id("doctor_id", &request.doctor_id)?;

        // **Step 1: Validate doctor and patient concurrently**
        self.validator
            .validate_participants(&request.doctor_id, &request.patient_id)
            .await
            .inspect_err(|e| warn!("Booking rejected during validation: {}", e))?;

        // **Step 2: Conflict check on the proposed slot**
        let slot = Slot::new(request.doctor_id.clone(), request.appointment_date);
        self.conflict_service.ensure_slot_free(&slot, None).await?;

        // **Step 3: Persist; the store re-checks the slot atomically**
        let appointment = self.store.create(NewAppointment::from(request)).await?;

        info!("Appointment {} booked successfully with doctor {}",
              appointment.id, appointment.doctor_id);
        Ok(appointment)
    }

    pub async fn list_appointments(&self) -> Result<Vec<Appointment>, AppointmentError> {
        debug!("Listing appointments");
        Ok(self.store.list().await?)
    }

    pub async fn get_appointment(&self, appointment_id: Uuid) -> Result<Appointment, AppointmentError> {
        debug!("Fetching appointment: {}", appointment_id);
        Ok(self.store.get(appointment_id).await?)
    }

    pub async fn update_appointment(
        &self,
        appointment_id: Uuid,
        request: UpdateAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        debug!("Updating appointment: {}", appointment_id);

        let current = self.get_appointment(appointment_id).await?;

        if let Some(patient_id) = &request.patient_id {
            require_id("patient_id", patient_id)?;
            if *patient_id != current.patient_id {
                self.validator.validate_patient(patient_id).await?;
            }
        }

        if request.touches_slot() {
            if let Some(doctor_id) = &request.doctor_id {
                require_id("doctor_id", doctor_id)?;
            }

            let slot = Slot::new(
                request.doctor_id.clone().unwrap_or_else(|| current.doctor_id.clone()),
                request.appointment_date.unwrap_or(current.appointment_date),
            );

            self.validator.validate_doctor(&slot.doctor_id).await?;
            self.conflict_service
                .ensure_slot_free(&slot, Some(appointment_id))
                .await?;
        }

        let updated = self
            .store
            .update(appointment_id, AppointmentChanges::from(request))
            .await?;

        info!("Appointment {} updated successfully", appointment_id);
        Ok(updated)
    }

    pub async fn delete_appointment(&self, appointment_id: Uuid) -> Result<(), AppointmentError> {
        debug!("Deleting appointment: {}", appointment_id);

        let current = self.get_appointment(appointment_id).await?;
        self.store.delete(current.id).await?;

        info!("Appointment {} deleted", appointment_id);
        Ok(())
    }
}

fn require_id(field: &str, value: &str) -> Result<(), AppointmentError> {
    if value.trim().is_empty() {
        return Err(AppointmentError::InvalidInput(format!("{} must not be empty", field)));
    }
    Ok(())
}
