//! Configuration module
//!
//! This module provides configuration structures for the API and services,
//! including the record store, object storage, upload limits, and checkout settings.

use std::env;
use std::str::FromStr;

use crate::storage_types::StorageBackend;

// Common constants
const SERVER_PORT: u16 = 4000;
const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const MAX_FILE_SIZE_MB: usize = 50;
const MAX_FILES_PER_UPLOAD: usize = 20;
const PAYMENT_SIMULATION_DELAY_MS: u64 = 2000;
const DASHBOARD_RECENT_LIMIT: i64 = 10;

/// Where content and payment records live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordStoreBackend {
    Postgres,
    Memory,
}

impl FromStr for RecordStoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(RecordStoreBackend::Postgres),
            "memory" => Ok(RecordStoreBackend::Memory),
            _ => Err(anyhow::anyhow!("Invalid record store: {}", s)),
        }
    }
}

/// Server-level configuration
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub environment: String,
}

/// Paylink configuration: persistence, storage and monetization settings
#[derive(Clone, Debug)]
pub struct PaylinkConfig {
    pub base: BaseConfig,
    pub record_store: RecordStoreBackend,
    pub database_url: Option<String>,
    pub storage_backend: StorageBackend,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>,
    pub aws_region: Option<String>,
    /// Origin used to build share links (`{public_base_url}/pay/{id}`)
    pub public_base_url: String,
    pub max_file_size_bytes: usize,
    pub max_files_per_upload: usize,
    /// Artificial delay of the simulated payment gateway. 0 = no delay.
    pub payment_simulation_delay_ms: u64,
    pub dashboard_recent_limit: i64,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<PaylinkConfig>);

impl Config {
    fn inner(&self) -> &PaylinkConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_name(&self.inner().base.environment)
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = PaylinkConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.inner().validate()
    }

    pub fn server_port(&self) -> u16 {
        self.inner().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.inner().base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.inner().base.environment
    }

    pub fn db_max_connections(&self) -> u32 {
        self.inner().base.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.inner().base.db_timeout_seconds
    }

    pub fn record_store(&self) -> RecordStoreBackend {
        self.inner().record_store
    }

    pub fn database_url(&self) -> Option<&str> {
        self.inner().database_url.as_deref()
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.inner().storage_backend
    }

    pub fn local_storage_path(&self) -> Option<&str> {
        self.inner().local_storage_path.as_deref()
    }

    pub fn local_storage_base_url(&self) -> Option<&str> {
        self.inner().local_storage_base_url.as_deref()
    }

    pub fn s3_bucket(&self) -> Option<&str> {
        self.inner().s3_bucket.as_deref()
    }

    pub fn s3_region(&self) -> Option<&str> {
        self.inner().s3_region.as_deref()
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.inner().s3_endpoint.as_deref()
    }

    pub fn aws_region(&self) -> Option<&str> {
        self.inner().aws_region.as_deref()
    }

    pub fn public_base_url(&self) -> &str {
        &self.inner().public_base_url
    }

    pub fn max_file_size_bytes(&self) -> usize {
        self.inner().max_file_size_bytes
    }

    pub fn max_files_per_upload(&self) -> usize {
        self.inner().max_files_per_upload
    }

    pub fn payment_simulation_delay_ms(&self) -> u64 {
        self.inner().payment_simulation_delay_ms
    }

    pub fn dashboard_recent_limit(&self) -> i64 {
        self.inner().dashboard_recent_limit
    }
}

fn is_production_name(environment: &str) -> bool {
    let env = environment.to_lowercase();
    env == "production" || env == "prod"
}

impl PaylinkConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        if is_production_name(&environment) && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let base = BaseConfig {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            environment,
        };

        let record_store = match env::var("RECORD_STORE") {
            Ok(value) => value.parse()?,
            Err(_) => RecordStoreBackend::Postgres,
        };

        let storage_backend = match env::var("STORAGE_BACKEND") {
            Ok(value) => value.parse()?,
            Err(_) => StorageBackend::Local,
        };

        let max_file_size_mb = env::var("MAX_FILE_SIZE_MB")
            .unwrap_or_else(|_| MAX_FILE_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_FILE_SIZE_MB);

        let public_base_url = env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("http://localhost:{}", base.server_port));

        Ok(PaylinkConfig {
            base,
            record_store,
            database_url: env::var("DATABASE_URL").ok(),
            storage_backend,
            local_storage_path: env::var("LOCAL_STORAGE_PATH").ok(),
            local_storage_base_url: env::var("LOCAL_STORAGE_BASE_URL").ok(),
            s3_bucket: env::var("S3_BUCKET").ok(),
            s3_region: env::var("S3_REGION").ok(),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            aws_region: env::var("AWS_REGION").ok(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
            max_file_size_bytes: max_file_size_mb * 1024 * 1024,
            max_files_per_upload: env::var("MAX_FILES_PER_UPLOAD")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(MAX_FILES_PER_UPLOAD),
            payment_simulation_delay_ms: env::var("PAYMENT_SIMULATION_DELAY_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(PAYMENT_SIMULATION_DELAY_MS),
            dashboard_recent_limit: env::var("DASHBOARD_RECENT_LIMIT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DASHBOARD_RECENT_LIMIT),
        })
    }

    /// Defaults suitable for tests and local demos: in-memory stores, no payment delay.
    pub fn in_memory(public_base_url: impl Into<String>) -> Self {
        PaylinkConfig {
            base: BaseConfig {
                server_port: SERVER_PORT,
                cors_origins: vec!["*".to_string()],
                db_max_connections: MAX_CONNECTIONS,
                db_timeout_seconds: CONNECTION_TIMEOUT_SECS,
                environment: "test".to_string(),
            },
            record_store: RecordStoreBackend::Memory,
            database_url: None,
            storage_backend: StorageBackend::Memory,
            local_storage_path: None,
            local_storage_base_url: None,
            s3_bucket: None,
            s3_region: None,
            s3_endpoint: None,
            aws_region: None,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
            max_file_size_bytes: MAX_FILE_SIZE_MB * 1024 * 1024,
            max_files_per_upload: MAX_FILES_PER_UPLOAD,
            payment_simulation_delay_ms: 0,
            dashboard_recent_limit: DASHBOARD_RECENT_LIMIT,
        }
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.record_store == RecordStoreBackend::Postgres {
            match self.database_url.as_deref() {
                None => {
                    return Err(anyhow::anyhow!(
                        "DATABASE_URL must be set when RECORD_STORE=postgres"
                    ))
                }
                Some(url)
                    if !url.starts_with("postgresql://") && !url.starts_with("postgres://") =>
                {
                    return Err(anyhow::anyhow!(
                        "DATABASE_URL must be a valid PostgreSQL connection string"
                    ))
                }
                Some(_) => {}
            }
        }

        match self.storage_backend {
            StorageBackend::S3 => {
                if self.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when using S3 storage backend"
                    ));
                }
                if self.s3_region.is_none() && self.aws_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
                if self.local_storage_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_BASE_URL must be set when using local storage backend"
                    ));
                }
            }
            StorageBackend::Memory => {}
        }

        if !self.public_base_url.starts_with("http://") && !self.public_base_url.starts_with("https://")
        {
            return Err(anyhow::anyhow!(
                "PUBLIC_BASE_URL must be an absolute http(s) URL"
            ));
        }

        if self.max_files_per_upload == 0 {
            return Err(anyhow::anyhow!("MAX_FILES_PER_UPLOAD must be at least 1"));
        }

        if self.dashboard_recent_limit <= 0 {
            return Err(anyhow::anyhow!("DASHBOARD_RECENT_LIMIT must be positive"));
        }

        Ok(())
    }
}
