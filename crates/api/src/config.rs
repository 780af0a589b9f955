use std::str::FromStr;
use std::time::Duration;

use augur_pipeline::{LifecycleSettings, PipelineConfig, QueueConfig, ReaperConfig};
use augur_providers::openai::DEFAULT_BASE_URL;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development. Invalid values
/// abort startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `5`).
    pub request_timeout_secs: u64,
    /// How long shutdown waits for each background task (default: `5`).
    pub shutdown_timeout_secs: u64,
    /// Externally reachable base URL, used in coin metadata.
    pub public_url: String,
    pub generation: GenerationConfig,
}

/// Job lifecycle and backend settings.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub job_max_age_secs: u64,
    pub reaper_interval_secs: u64,
    pub job_timeout_secs: u64,
    pub queue_workers: usize,
    pub queue_capacity: usize,
    /// When unset, text and image generation fall back to built-in content.
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub payout_recipient: String,
    pub registry_simulated_latency: bool,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                   |
    /// |-------------------------|---------------------------|
    /// | `HOST`                  | `0.0.0.0`                 |
    /// | `PORT`                  | `3000`                    |
    /// | `CORS_ORIGINS`          | `http://localhost:5173`   |
    /// | `REQUEST_TIMEOUT_SECS`  | `5`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS` | `5`                       |
    /// | `PUBLIC_URL`            | `http://localhost:3000`   |
    ///
    /// See [`GenerationConfig::from_env`] for the rest.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = parse_env("PORT", "3000");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = parse_env("REQUEST_TIMEOUT_SECS", "5");
        let shutdown_timeout_secs: u64 = parse_env("SHUTDOWN_TIMEOUT_SECS", "5");
        let public_url =
            std::env::var("PUBLIC_URL").unwrap_or_else(|_| "http://localhost:3000".into());

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            public_url,
            generation: GenerationConfig::from_env(),
        }
    }

    /// Settings handed to [`augur_pipeline::GenerationService::start`].
    pub fn pipeline_config(&self) -> PipelineConfig {
        let g = &self.generation;
        PipelineConfig {
            lifecycle: LifecycleSettings {
                payout_recipient: g.payout_recipient.clone(),
                public_url: self.public_url.clone(),
            },
            queue: QueueConfig {
                workers: g.queue_workers,
                capacity: g.queue_capacity,
                job_timeout: Duration::from_secs(g.job_timeout_secs),
            },
            reaper: ReaperConfig {
                max_age: Duration::from_secs(g.job_max_age_secs),
                interval: Duration::from_secs(g.reaper_interval_secs),
            },
        }
    }
}

impl GenerationConfig {
    /// | Env Var                      | Default                                      |
    /// |------------------------------|----------------------------------------------|
    /// | `JOB_MAX_AGE_SECS`           | `60`                                         |
    /// | `REAPER_INTERVAL_SECS`       | `30`                                         |
    /// | `JOB_TIMEOUT_SECS`           | `55`                                         |
    /// | `QUEUE_WORKERS`              | `4`                                          |
    /// | `QUEUE_CAPACITY`             | `64`                                         |
    /// | `OPENAI_API_KEY`             | unset                                        |
    /// | `OPENAI_BASE_URL`            | `https://api.openai.com/v1`                  |
    /// | `PAYOUT_RECIPIENT`           | `0x742d35Cc6634C0532925a3b8D926F2E4F4c4e5b0` |
    /// | `REGISTRY_SIMULATED_LATENCY` | `true`                                       |
    pub fn from_env() -> Self {
        let job_max_age_secs: u64 = parse_nonzero_env("JOB_MAX_AGE_SECS", "60");
        let job_timeout_secs: u64 = parse_nonzero_env("JOB_TIMEOUT_SECS", "55");

        if job_timeout_secs >= job_max_age_secs {
            tracing::warn!(
                job_timeout_secs,
                job_max_age_secs,
                "JOB_TIMEOUT_SECS is not below JOB_MAX_AGE_SECS; running jobs may be evicted",
            );
        }

        Self {
            job_max_age_secs,
            reaper_interval_secs: parse_nonzero_env("REAPER_INTERVAL_SECS", "30"),
            job_timeout_secs,
            queue_workers: parse_nonzero_env("QUEUE_WORKERS", "4"),
            queue_capacity: parse_nonzero_env("QUEUE_CAPACITY", "64"),
            openai_api_key: std::env::var("OPENAI_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
            openai_base_url: std::env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.into()),
            payout_recipient: std::env::var("PAYOUT_RECIPIENT")
                .unwrap_or_else(|_| LifecycleSettings::default().payout_recipient),
            registry_simulated_latency: parse_env("REGISTRY_SIMULATED_LATENCY", "true"),
        }
    }
}

/// Read `name`, falling back to `default`, and parse it. Panics on an
/// unparseable value so misconfiguration fails at startup.
fn parse_env<T>(name: &str, default: &str) -> T
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = std::env::var(name).unwrap_or_else(|_| default.into());
    raw.trim()
        .parse()
        .unwrap_or_else(|e| panic!("{name} must be a valid {}: {e}", std::any::type_name::<T>()))
}

/// [`parse_env`] for durations and counts where zero would stall the
/// pipeline. Panics on zero.
fn parse_nonzero_env<T>(name: &str, default: &str) -> T
where
    T: FromStr + Default + PartialEq,
    T::Err: std::fmt::Display,
{
    let value: T = parse_env(name, default);
    if value == T::default() {
        panic!("{name} must be greater than zero");
    }
    value
}
