// src/config.rs
use std::{env, fmt::Display, path::PathBuf, str::FromStr, time::Duration};

use tracing::{info, warn};

use crate::errors::{SparrowError, SparrowResult};

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api/v2";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub request_timeout: Duration,
    pub trip_poll_interval: Duration,
    pub dispatch_poll_interval: Duration,
    pub driver_trip_poll_interval: Duration,
    pub session_file: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            request_timeout: Duration::from_secs(10),
            trip_poll_interval: Duration::from_secs(5),
            dispatch_poll_interval: Duration::from_secs(5),
            driver_trip_poll_interval: Duration::from_secs(3),
            session_file: PathBuf::from(".sparrow-session.json"),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> SparrowResult<Self> {
        let config = Self {
            api_base_url: try_load::<String>("SPARROW_API_URL", DEFAULT_API_URL)?
                .trim_end_matches('/')
                .to_string(),
            request_timeout: Duration::from_secs(try_load("SPARROW_REQUEST_TIMEOUT_SECS", "10")?),
            trip_poll_interval: Duration::from_secs(try_load("SPARROW_TRIP_POLL_SECS", "5")?),
            dispatch_poll_interval: Duration::from_secs(try_load("SPARROW_DISPATCH_POLL_SECS", "5")?),
            driver_trip_poll_interval: Duration::from_secs(try_load(
                "SPARROW_DRIVER_TRIP_POLL_SECS",
                "3",
            )?),
            session_file: PathBuf::from(try_load::<String>(
                "SPARROW_SESSION_FILE",
                ".sparrow-session.json",
            )?),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn validate(&self) -> SparrowResult<()> {
        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://") {
            return Err(SparrowError::InvalidConfiguration(format!(
                "API URL must be http(s): {}",
                self.api_base_url
            )));
        }
        let periods = [
            ("trip poll interval", self.trip_poll_interval),
            ("dispatch poll interval", self.dispatch_poll_interval),
            ("driver trip poll interval", self.driver_trip_poll_interval),
            ("request timeout", self.request_timeout),
        ];
        for (name, period) in periods {
            if period.is_zero() {
                return Err(SparrowError::InvalidConfiguration(format!("{name} must be non-zero")));
            }
        }
        Ok(())
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn try_load<T: FromStr>(key: &str, default: &str) -> SparrowResult<T>
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
            SparrowError::ConfigurationError(format!("Invalid {key} value: {e}"))
        })
}
