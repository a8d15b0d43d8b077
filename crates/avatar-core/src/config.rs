//! Configuration module
//!
//! All settings come from the environment (optionally through a `.env` file),
//! are parsed and validated once at process start, and are then handed by
//! reference to the constructors that need them.

use std::env;

use crate::storage_types::StorageBackend;

const SERVER_PORT: u16 = 8080;
const MAX_UPLOAD_SIZE_MB: usize = 10;
const REQUEST_TIMEOUT_SECS: u64 = 30;
const HTTP_CONCURRENCY_LIMIT: usize = 10_000;
const LDAP_PORT: u16 = 389;
const LDAPS_PORT: u16 = 636;
const LDAP_TIMEOUT_SECS: u64 = 5;
const BIND_FAILURE_WINDOW_SECS: u64 = 900;
const DEFAULT_CORS_ORIGIN: &str = "https://www.ewnix.net";
const DEFAULT_BUCKET: &str = "ewnix-avatars";
/// Room for the JSON or multipart envelope around the encoded image.
const BODY_ENVELOPE_BYTES: usize = 64 * 1024;

/// Console log output format
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

/// HTTP-facing settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    pub max_upload_size_bytes: usize,
    pub request_timeout_secs: u64,
    pub http_concurrency_limit: usize,
    pub log_format: LogFormat,
}

/// Directory service settings
#[derive(Clone, Debug)]
pub struct DirectoryConfig {
    pub host: String,
    pub port: u16,
    pub base_dn: String,
    pub use_tls: bool,
    pub timeout_secs: u64,
    /// 0 disables the bind-failure throttle.
    pub bind_failure_limit: u32,
    pub bind_failure_window_secs: u64,
}

/// Object store settings
#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub s3_bucket: String,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (Vultr, MinIO, ...)
    pub aws_region: Option<String>,
    pub s3_public_read: bool,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub base: BaseConfig,
    pub directory: DirectoryConfig,
    pub storage: StorageConfig,
}

fn parse_bool(value: Option<String>, default: bool) -> bool {
    value
        .map(|v| v.trim().to_lowercase())
        .and_then(|v| match v.as_str() {
            "true" | "1" | "yes" | "on" => Some(true),
            "false" | "0" | "no" | "off" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Unset or blank falls back to `default`; anything else must parse.
fn parse_number<T: std::str::FromStr>(
    value: Option<String>,
    name: &str,
    default: T,
) -> Result<T, anyhow::Error> {
    match non_empty(value) {
        Some(v) => v
            .parse::<T>()
            .map_err(|_| anyhow::anyhow!("{} must be a valid number, got '{}'", name, v)),
        None => Ok(default),
    }
}

/// Base64 inflates the image by 4/3; `None` when that overflows.
fn request_body_limit(max_upload_size_bytes: usize) -> Option<usize> {
    (max_upload_size_bytes / 3)
        .checked_mul(4)?
        .checked_add(BODY_ENVELOPE_BYTES)
}

impl Config {
    /// Load from the process environment, reading `.env` first when present.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_source(|key| env::var(key).ok())
    }

    /// Load from an arbitrary key lookup. Used by `from_env` and by tests.
    pub fn from_source<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let cors_origins: Vec<String> = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let max_upload_size_mb: usize = parse_number(
            lookup("MAX_UPLOAD_SIZE_MB"),
            "MAX_UPLOAD_SIZE_MB",
            MAX_UPLOAD_SIZE_MB,
        )?;
        let max_upload_size_bytes = max_upload_size_mb
            .checked_mul(1024 * 1024)
            .ok_or_else(|| anyhow::anyhow!("MAX_UPLOAD_SIZE_MB is too large"))?;

        let log_format = match lookup("LOG_FORMAT").map(|s| s.trim().to_lowercase()) {
            Some(ref f) if f == "json" => LogFormat::Json,
            _ => LogFormat::Compact,
        };

        let base = BaseConfig {
            server_port: parse_number(lookup("PORT"), "PORT", SERVER_PORT)?,
            cors_origins,
            environment,
            max_upload_size_bytes,
            request_timeout_secs: parse_number(
                lookup("REQUEST_TIMEOUT_SECS"),
                "REQUEST_TIMEOUT_SECS",
                REQUEST_TIMEOUT_SECS,
            )?,
            http_concurrency_limit: parse_number(
                lookup("HTTP_CONCURRENCY_LIMIT"),
                "HTTP_CONCURRENCY_LIMIT",
                HTTP_CONCURRENCY_LIMIT,
            )?
            .max(1),
            log_format,
        };

        let use_tls = parse_bool(lookup("LDAP_USE_TLS"), false);
        let default_ldap_port = if use_tls { LDAPS_PORT } else { LDAP_PORT };

        let directory = DirectoryConfig {
            host: non_empty(lookup("LDAP_SERVER"))
                .ok_or_else(|| anyhow::anyhow!("LDAP_SERVER must be set"))?,
            port: match non_empty(lookup("LDAP_PORT")) {
                Some(p) => p
                    .parse()
                    .map_err(|_| anyhow::anyhow!("LDAP_PORT must be a valid port number"))?,
                None => default_ldap_port,
            },
            base_dn: non_empty(lookup("LDAP_BASE_USER_DN"))
                .ok_or_else(|| anyhow::anyhow!("LDAP_BASE_USER_DN must be set"))?,
            use_tls,
            timeout_secs: parse_number(
                lookup("LDAP_TIMEOUT_SECS"),
                "LDAP_TIMEOUT_SECS",
                LDAP_TIMEOUT_SECS,
            )?,
            bind_failure_limit: parse_number(
                lookup("BIND_FAILURE_LIMIT"),
                "BIND_FAILURE_LIMIT",
                0,
            )?,
            bind_failure_window_secs: parse_number(
                lookup("BIND_FAILURE_WINDOW_SECS"),
                "BIND_FAILURE_WINDOW_SECS",
                BIND_FAILURE_WINDOW_SECS,
            )?,
        };

        let backend = match non_empty(lookup("STORAGE_BACKEND")) {
            Some(s) => s.parse::<StorageBackend>()?,
            None => StorageBackend::S3,
        };

        let storage = StorageConfig {
            backend,
            s3_bucket: non_empty(lookup("S3_BUCKET")).unwrap_or_else(|| DEFAULT_BUCKET.to_string()),
            s3_region: non_empty(lookup("S3_REGION")),
            s3_endpoint: non_empty(lookup("S3_ENDPOINT")),
            aws_region: non_empty(lookup("AWS_REGION")),
            s3_public_read: parse_bool(lookup("S3_PUBLIC_READ"), false),
            local_storage_path: non_empty(lookup("LOCAL_STORAGE_PATH")),
            local_storage_base_url: non_empty(lookup("LOCAL_STORAGE_BASE_URL")),
        };

        let config = Config {
            base,
            directory,
            storage,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.base.max_upload_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_UPLOAD_SIZE_MB cannot be 0"));
        }

        if request_body_limit(self.base.max_upload_size_bytes).is_none() {
            return Err(anyhow::anyhow!("MAX_UPLOAD_SIZE_MB is too large"));
        }

        if self.base.request_timeout_secs == 0 {
            return Err(anyhow::anyhow!("REQUEST_TIMEOUT_SECS cannot be 0"));
        }

        if self.is_production() && self.base.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        if self.directory.timeout_secs == 0 {
            return Err(anyhow::anyhow!("LDAP_TIMEOUT_SECS cannot be 0"));
        }

        if self.directory.bind_failure_limit > 0 && self.directory.bind_failure_window_secs == 0 {
            return Err(anyhow::anyhow!(
                "BIND_FAILURE_WINDOW_SECS must be positive when BIND_FAILURE_LIMIT is set"
            ));
        }

        match self.storage.backend {
            StorageBackend::S3 => {
                if self.storage.s3_bucket.is_empty() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when using S3 storage backend"
                    ));
                }
                if self.storage.s3_region.is_none() && self.storage.aws_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.storage.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
                if self.storage.local_storage_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_BASE_URL must be set when using local storage backend"
                    ));
                }
            }
            StorageBackend::Memory => {
                if self.is_production() {
                    return Err(anyhow::anyhow!(
                        "memory storage backend is not durable and cannot be used in production"
                    ));
                }
            }
        }

        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.base.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    // Convenience getters for common fields
    pub fn server_port(&self) -> u16 {
        self.base.server_port
    }

    pub fn environment(&self) -> &str {
        &self.base.environment
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.base.cors_origins
    }

    pub fn max_upload_size_bytes(&self) -> usize {
        self.base.max_upload_size_bytes
    }

    /// Request body ceiling: the base64 form of the largest image plus the
    /// JSON/multipart envelope.
    pub fn max_request_body_bytes(&self) -> usize {
        request_body_limit(self.base.max_upload_size_bytes).unwrap_or(usize::MAX)
    }

    pub fn request_timeout_secs(&self) -> u64 {
        self.base.request_timeout_secs
    }

    pub fn http_concurrency_limit(&self) -> usize {
        self.base.http_concurrency_limit
    }

    pub fn log_format(&self) -> LogFormat {
        self.base.log_format
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.storage.backend
    }

    pub fn s3_bucket(&self) -> &str {
        &self.storage.s3_bucket
    }

    /// `S3_REGION`, falling back to `AWS_REGION`.
    pub fn s3_region(&self) -> Option<&str> {
        self.storage
            .s3_region
            .as_deref()
            .or(self.storage.aws_region.as_deref())
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.storage.s3_endpoint.as_deref()
    }

    pub fn s3_public_read(&self) -> bool {
        self.storage.s3_public_read
    }

    pub fn local_storage_path(&self) -> Option<&str> {
        self.storage.local_storage_path.as_deref()
    }

    pub fn local_storage_base_url(&self) -> Option<&str> {
        self.storage.local_storage_base_url.as_deref()
    }

    /// `ldap://host:port` or `ldaps://host:port`.
    pub fn ldap_url(&self) -> String {
        let scheme = if self.directory.use_tls { "ldaps" } else { "ldap" };
        format!(
            "{}://{}:{}",
            scheme, self.directory.host, self.directory.port
        )
    }

    pub fn ldap_base_dn(&self) -> &str {
        &self.directory.base_dn
    }
}
