use std::sync::Arc;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::models::{
    Appointment, AppointmentError, AppointmentResponse, EnrichmentFailure, UpcomingAppointment,
};
use crate::services::directory::ClinicDirectory;
use crate::services::store::AppointmentStore;

/// The calendar day after `reference`'s local date, as
/// `[00:00:00, 23:59:59]` in `reference`'s time zone, converted to UTC.
pub fn next_day_window<Tz: TimeZone>(
    reference: &DateTime<Tz>,
) -> Result<(DateTime<Utc>, DateTime<Utc>), AppointmentError> {
    let tz = reference.timezone();
    let next_day = reference
        .date_naive()
        .succ_opt()
        .ok_or_else(|| AppointmentError::InvalidInput("reference date out of range".to_string()))?;

    let start = next_day
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| AppointmentError::InvalidInput("invalid window start".to_string()))?;
    let end = next_day
        .and_hms_opt(23, 59, 59)
        .ok_or_else(|| AppointmentError::InvalidInput("invalid window end".to_string()))?;

    Ok((to_utc(&tz, start)?, to_utc(&tz, end)?))
}

fn to_utc<Tz: TimeZone>(tz: &Tz, local: NaiveDateTime) -> Result<DateTime<Utc>, AppointmentError> {
    tz.from_local_datetime(&local)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| AppointmentError::InvalidInput(format!("{} does not exist in local time", local)))
}

/// Builds the next-day listing with patient and doctor display fields.
///
/// A lookup failure for one appointment yields an `UpcomingAppointment::Failed`
/// entry for it; the rest of the batch is still returned.
pub struct UpcomingAppointmentsService {
    directory: Arc<dyn ClinicDirectory>,
    store: Arc<dyn AppointmentStore>,
    concurrency: usize,
}

impl UpcomingAppointmentsService {
    pub fn new(
        directory: Arc<dyn ClinicDirectory>,
        store: Arc<dyn AppointmentStore>,
        concurrency: usize,
    ) -> Self {
        Self {
            directory,
            store,
            concurrency: concurrency.max(1),
        }
    }

    pub async fn get_upcoming_appointments<Tz>(
        &self,
        reference: DateTime<Tz>,
    ) -> Result<Vec<UpcomingAppointment>, AppointmentError>
    where
        Tz: TimeZone + Send + Sync,
        Tz::Offset: Send + Sync,
    {
        let (start, end) = next_day_window(&reference)?;
        self.appointments_between(start, end).await
    }

    pub async fn appointments_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<UpcomingAppointment>, AppointmentError> {
        debug!("Fetching appointments between {} and {}", start, end);

        let appointments = self.store.list_in_range(start, end).await?;
        if appointments.is_empty() {
            return Ok(Vec::new());
        }

        let entries: Vec<UpcomingAppointment> = stream::iter(appointments)
            .map(|appointment| self.enrich(appointment))
            .buffered(self.concurrency)
            .collect()
            .await;

        let failed = entries.iter().filter(|e| !e.is_enriched()).count();
        info!("Prepared {} upcoming appointments ({} without details)", entries.len(), failed);

        Ok(entries)
    }

    async fn enrich(&self, appointment: Appointment) -> UpcomingAppointment {
        let lookup = tokio::try_join!(
            async { Ok::<_, AppointmentError>(self.directory.fetch_patient(&appointment.patient_id).await?) },
            async { Ok::<_, AppointmentError>(self.directory.fetch_doctor(&appointment.doctor_id).await?) },
        );

        match lookup {
            Ok((patient, doctor)) => {
                UpcomingAppointment::Enriched(AppointmentResponse::compose(&appointment, &patient, &doctor))
            }
            Err(e) => {
                warn!("Could not enrich appointment {}: {}", appointment.id, e);
                UpcomingAppointment::Failed {
                    appointment_id: appointment.id,
                    appointment_date: appointment.appointment_date,
                    status: appointment.status,
                    error: EnrichmentFailure::from(&e),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn test_window_is_next_local_day() {
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let reference = tz.with_ymd_and_hms(2024, 3, 14, 23, 30, 0).unwrap();

        let (start, end) = next_day_window(&reference).unwrap();

        assert_eq!(start, Utc.with_ymd_and_hms(2024, 3, 14, 22, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2024, 3, 15, 21, 59, 59).unwrap());
    }

    #[test]
    fn test_window_ignores_time_of_day() {
        let early = Utc.with_ymd_and_hms(2024, 12, 31, 0, 0, 1).unwrap();
        let late = Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap();

        let expected = (
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 1, 1, 23, 59, 59).unwrap(),
        );
        assert_eq!(next_day_window(&early).unwrap(), expected);
        assert_eq!(next_day_window(&late).unwrap(), expected);
    }

    #[test]
    fn test_window_uses_reference_local_date() {
        // 2024-03-15T03:00Z is still the 14th in UTC-5.
        let tz = FixedOffset::west_opt(5 * 3600).unwrap();
        let reference = Utc.with_ymd_and_hms(2024, 3, 15, 3, 0, 0).unwrap().with_timezone(&tz);

        let (start, _) = next_day_window(&reference).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 3, 15, 5, 0, 0).unwrap());
    }
}
