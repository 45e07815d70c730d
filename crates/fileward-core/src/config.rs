//! Configuration module
//!
//! Env-driven configuration for the API process: server, storage backend,
//! ingestion ceilings, and retry tuning. Loaded once at startup;
//! misconfiguration (in particular missing storage credentials) is a fatal
//! startup error, never a per-request error.

use std::env;
use std::fmt;
use std::str::FromStr;

// Ingestion ceilings (see the limiter for how they are enforced)
const MAX_FILE_SIZE_MB: usize = 5;
const MAX_FIELD_SIZE_MB: usize = 10;
const MAX_FIELD_NAME_LENGTH: usize = 100;
const MAX_FIELDS: usize = 100;
const MAX_HEADER_PAIRS: usize = 2000;

// Remote persistence tuning
const UPLOAD_MAX_ATTEMPTS: u32 = 3;
const UPLOAD_ATTEMPT_TIMEOUT_SECS: u64 = 60;

/// Where accepted uploads are persisted. Backend selection is a
/// configuration concern, so the enum lives here; the storage crate
/// re-exports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    S3,
    Local,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "s3" => Ok(StorageBackend::S3),
            "local" => Ok(StorageBackend::Local),
            other => Err(anyhow::anyhow!("Invalid storage backend: {}", other)),
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackend::S3 => f.write_str("s3"),
            StorageBackend::Local => f.write_str("local"),
        }
    }
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    // Storage configuration
    pub storage_backend: Option<StorageBackend>,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO, DigitalOcean Spaces, etc.)
    pub aws_region: Option<String>,
    pub aws_access_key_id: Option<String>,
    pub aws_secret_access_key: Option<String>,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    // Ingestion ceilings
    pub max_file_size_bytes: usize,
    pub max_field_size_bytes: usize,
    pub max_field_name_length: usize,
    pub max_fields: usize,
    pub max_header_pairs: usize,
    // Remote persistence
    pub upload_max_attempts: u32,
    pub upload_attempt_timeout_secs: u64,
    // Number of trusted proxies in front of the server, for client IP extraction
    pub trusted_proxy_count: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let is_production =
            environment.to_lowercase() == "production" || environment.to_lowercase() == "prod";
        if is_production && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let storage_backend = env::var("STORAGE_BACKEND")
            .ok()
            .and_then(|s| s.parse::<StorageBackend>().ok());

        let max_file_size_mb = env::var("MAX_FILE_SIZE_MB")
            .unwrap_or_else(|_| MAX_FILE_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_FILE_SIZE_MB);

        let max_field_size_mb = env::var("MAX_FIELD_SIZE_MB")
            .unwrap_or_else(|_| MAX_FIELD_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_FIELD_SIZE_MB);

        let config = Config {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| "4000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            environment,
            cors_origins,
            storage_backend,
            s3_bucket: env::var("S3_BUCKET").ok(),
            s3_region: env::var("S3_REGION").ok(),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            aws_region: env::var("AWS_REGION").ok(),
            aws_access_key_id: env::var("AWS_ACCESS_KEY_ID").ok(),
            aws_secret_access_key: env::var("AWS_SECRET_ACCESS_KEY").ok(),
            local_storage_path: env::var("LOCAL_STORAGE_PATH").ok(),
            local_storage_base_url: env::var("LOCAL_STORAGE_BASE_URL").ok(),
            max_file_size_bytes: max_file_size_mb * 1024 * 1024,
            max_field_size_bytes: max_field_size_mb * 1024 * 1024,
            max_field_name_length: env::var("MAX_FIELD_NAME_LENGTH")
                .unwrap_or_else(|_| MAX_FIELD_NAME_LENGTH.to_string())
                .parse()
                .unwrap_or(MAX_FIELD_NAME_LENGTH),
            max_fields: env::var("MAX_FIELDS")
                .unwrap_or_else(|_| MAX_FIELDS.to_string())
                .parse()
                .unwrap_or(MAX_FIELDS),
            max_header_pairs: env::var("MAX_HEADER_PAIRS")
                .unwrap_or_else(|_| MAX_HEADER_PAIRS.to_string())
                .parse()
                .unwrap_or(MAX_HEADER_PAIRS),
            upload_max_attempts: env::var("UPLOAD_MAX_ATTEMPTS")
                .unwrap_or_else(|_| UPLOAD_MAX_ATTEMPTS.to_string())
                .parse()
                .unwrap_or(UPLOAD_MAX_ATTEMPTS)
                .max(1),
            upload_attempt_timeout_secs: env::var("UPLOAD_ATTEMPT_TIMEOUT_SECS")
                .unwrap_or_else(|_| UPLOAD_ATTEMPT_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(UPLOAD_ATTEMPT_TIMEOUT_SECS)
                .max(1),
            trusted_proxy_count: env::var("TRUSTED_PROXY_COUNT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(0),
        };

        config.validate()?;
        Ok(config)
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    /// Validate storage backend configuration. Credentials for the remote
    /// store must be present at process start.
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        let backend = self.storage_backend.unwrap_or(StorageBackend::S3);
        match backend {
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
                if self.aws_access_key_id.is_none() || self.aws_secret_access_key.is_none() {
                    return Err(anyhow::anyhow!(
                        "AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY must be set when using S3 storage backend"
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
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local_config() -> Config {
        Config {
            server_port: 4000,
            environment: "test".to_string(),
            cors_origins: vec!["*".to_string()],
            storage_backend: Some(StorageBackend::Local),
            s3_bucket: None,
            s3_region: None,
            s3_endpoint: None,
            aws_region: None,
            aws_access_key_id: None,
            aws_secret_access_key: None,
            local_storage_path: Some("/tmp/fileward".to_string()),
            local_storage_base_url: Some("http://localhost:4000/media".to_string()),
            max_file_size_bytes: 5 * 1024 * 1024,
            max_field_size_bytes: 10 * 1024 * 1024,
            max_field_name_length: 100,
            max_fields: 100,
            max_header_pairs: 2000,
            upload_max_attempts: 3,
            upload_attempt_timeout_secs: 60,
            trusted_proxy_count: 0,
        }
    }

    #[test]
    fn storage_backend_parses_case_insensitively() {
        assert_eq!("S3".parse::<StorageBackend>().unwrap(), StorageBackend::S3);
        assert_eq!(
            "local".parse::<StorageBackend>().unwrap(),
            StorageBackend::Local
        );
        assert!("gcs".parse::<StorageBackend>().is_err());
    }

    #[test]
    fn local_backend_validates_with_path_and_url() {
        assert!(local_config().validate().is_ok());
    }

    #[test]
    fn local_backend_requires_path() {
        let mut config = local_config();
        config.local_storage_path = None;
        assert!(config.validate().is_err());
    }

    #[test]
    fn s3_backend_requires_credentials() {
        let mut config = local_config();
        config.storage_backend = Some(StorageBackend::S3);
        config.s3_bucket = Some("bucket".to_string());
        config.s3_region = Some("us-east-1".to_string());
        assert!(config.validate().is_err());

        config.aws_access_key_id = Some("key".to_string());
        config.aws_secret_access_key = Some("secret".to_string());
        assert!(config.validate().is_ok());
    }
}
