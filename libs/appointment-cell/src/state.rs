use std::sync::Arc;

use tracing::info;

use shared_config::AppConfig;
use shared_database::SupabaseClient;

use crate::models::AppointmentError;
use crate::services::{
    AppointmentBookingService, AppointmentStore, ClinicDirectory, HttpClinicDirectory,
    InMemoryAppointmentStore, SupabaseAppointmentStore, UpcomingAppointmentsService,
};

/// Services shared by every appointment request.
pub struct AppointmentCellState {
    pub booking: AppointmentBookingService,
    pub upcoming: UpcomingAppointmentsService,
}

impl AppointmentCellState {
    pub fn new(
        directory: Arc<dyn ClinicDirectory>,
        store: Arc<dyn AppointmentStore>,
        config: &AppConfig,
    ) -> Self {
        Self {
            booking: AppointmentBookingService::new(Arc::clone(&directory), Arc::clone(&store)),
            upcoming: UpcomingAppointmentsService::new(
                directory,
                store,
                config.enrichment_concurrency(),
            ),
        }
    }

    /// Wires the HTTP directory and picks the store from configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self, AppointmentError> {
        let directory: Arc<dyn ClinicDirectory> = Arc::new(HttpClinicDirectory::new(config)?);

        let store: Arc<dyn AppointmentStore> = if config.is_persistent_storage_configured() {
            info!("Using Supabase appointment store at {}", config.supabase_url);
            let supabase = SupabaseClient::new(config)
                .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;
            Arc::new(SupabaseAppointmentStore::new(Arc::new(supabase)))
        } else {
            info!("Using in-memory appointment store");
            Arc::new(InMemoryAppointmentStore::new())
        };

        Ok(Self::new(directory, store, config))
    }
}
