use std::env;

use chrono::FixedOffset;

use crate::errors::AppError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BackendKind {
    /// Hosted backend-as-a-service over PostgREST.
    Postgrest,
    /// Local SQLite file, for development.
    Sqlite,
}

impl BackendKind {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "postgrest" | "baas" => BackendKind::Postgrest,
            _ => BackendKind::Sqlite,
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub backend: BackendKind,
    pub database_url: String,
    pub baas_url: String,
    pub baas_api_key: String,
    /// Offset of the shop's wall clock from UTC; booking dates and times are read in it.
    pub utc_offset_minutes: i32,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            backend: BackendKind::parse(&env::var("BACKEND").unwrap_or_default()),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "barberbook.db".to_string()),
            baas_url: env::var("BAAS_URL").unwrap_or_default(),
            baas_api_key: env::var("BAAS_API_KEY").unwrap_or_default(),
            utc_offset_minutes: env::var("BUSINESS_UTC_OFFSET_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(-180),
        }
    }

    pub fn business_offset(&self) -> Result<FixedOffset, AppError> {
        FixedOffset::east_opt(self.utc_offset_minutes * 60).ok_or_else(|| {
            AppError::Config(format!(
                "BUSINESS_UTC_OFFSET_MINUTES out of range: {}",
                self.utc_offset_minutes
            ))
        })
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.backend == BackendKind::Postgrest
            && (self.baas_url.is_empty() || self.baas_api_key.is_empty())
        {
            return Err(AppError::Config(
                "BAAS_URL and BAAS_API_KEY must be set when BACKEND=postgrest".to_string(),
            ));
        }
        self.business_offset()?;
        Ok(())
    }
}
