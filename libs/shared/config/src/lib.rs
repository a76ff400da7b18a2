use std::env;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub doctor_service_url: String,
    pub patient_service_url: String,
    pub external_request_timeout_secs: u64,
    pub enrichment_concurrency: usize,
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub server_port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            doctor_service_url: "http://doctor-service:3001".to_string(),
            patient_service_url: "http://patient-service:3000".to_string(),
            external_request_timeout_secs: 5,
            enrichment_concurrency: 8,
            supabase_url: String::new(),
            supabase_anon_key: String::new(),
            server_port: 3000,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let config = Self {
            doctor_service_url: env::var("DOCTOR_SERVICE_URL")
                .unwrap_or_else(|_| {
                    warn!("DOCTOR_SERVICE_URL not set, using default");
                    defaults.doctor_service_url.clone()
                }),
            patient_service_url: env::var("PATIENT_SERVICE_URL")
                .unwrap_or_else(|_| {
                    warn!("PATIENT_SERVICE_URL not set, using default");
                    defaults.patient_service_url.clone()
                }),
            external_request_timeout_secs: parse_var(
                "EXTERNAL_REQUEST_TIMEOUT_SECS",
                defaults.external_request_timeout_secs,
            ),
            enrichment_concurrency: parse_var(
                "ENRICHMENT_CONCURRENCY",
                defaults.enrichment_concurrency,
            ),
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, appointments will be kept in memory");
                    String::new()
                }),
            supabase_anon_key: env::var("SUPABASE_ANON_PUBLIC_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_ANON_PUBLIC_KEY not set, using empty value");
                    String::new()
                }),
            server_port: parse_var("SERVER_PORT", defaults.server_port),
        };

        if config.external_request_timeout_secs == 0 {
            warn!("EXTERNAL_REQUEST_TIMEOUT_SECS must be positive, using default");
        }

        config
    }

    pub fn is_persistent_storage_configured(&self) -> bool {
        !self.supabase_url.is_empty() && !self.supabase_anon_key.is_empty()
    }

    /// Upper bound for every call to the doctor and patient services.
    pub fn external_request_timeout(&self) -> Duration {
        let secs = if self.external_request_timeout_secs == 0 {
            Self::default().external_request_timeout_secs
        } else {
            self.external_request_timeout_secs
        };
        Duration::from_secs(secs)
    }

    pub fn enrichment_concurrency(&self) -> usize {
        self.enrichment_concurrency.max(1)
    }
}

fn parse_var<T>(name: &str, default: T) -> T
where
    T: FromStr + Copy + std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{} has invalid value {:?}, using default {}", name, raw, default);
            default
        }),
        Err(_) => {
            warn!("{} not set, using default {}", name, default);
            default
        }
    }
}
