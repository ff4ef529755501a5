//! Process configuration, loaded once at startup.

use std::{env, fmt, str::FromStr};

pub const DEFAULT_API_URL: &str = "https://api.openweathermap.org/data/2.5/weather";
pub const DEFAULT_CITY: &str = "Tokyo";
pub const DEFAULT_REGION: &str = "ap-northeast-1";
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:8080";
pub const DEFAULT_COLLECT_INTERVAL_SECONDS: u64 = 3600;
pub const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 30;

/// Errors that stop the process before it serves anything
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },

    #[error("storage backend '{0}' is not available in this build")]
    BackendUnavailable(StorageBackend),
}

/// Where records and archives are persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// DynamoDB table + S3 bucket
    Aws,
    /// Process memory; lost on restart
    Memory,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageBackend::Aws => "aws",
            StorageBackend::Memory => "memory",
        }
    }

    /// `aws` when compiled with the `aws` feature, otherwise `memory`.
    pub fn build_default() -> Self {
        if cfg!(feature = "aws") {
            StorageBackend::Aws
        } else {
            StorageBackend::Memory
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageBackend {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "aws" => Ok(StorageBackend::Aws),
            "memory" => Ok(StorageBackend::Memory),
            _ => Err(()),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl FromStr for LogFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" | "text" => Ok(LogFormat::Pretty),
            _ => Err(()),
        }
    }
}

/// Weather provider settings
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherConfig {
    pub api_key: String,
    pub api_url: String,
    pub city_name: String,
    pub timeout_seconds: u64,
}

/// Table and blob store settings
#[derive(Debug, Clone, PartialEq)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub s3_bucket: String,
    pub dynamodb_table: String,
    pub region: String,
    pub endpoint_url: Option<String>,
}

/// Full process configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub weather: WeatherConfig,
    pub storage: StorageConfig,
    pub bind_address: String,
    /// 0 disables the in-process collection schedule
    pub collect_interval_seconds: u64,
    pub require_api_key: bool,
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup; empty values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let required = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let weather = WeatherConfig {
            api_key: required("WEATHER_API_KEY")?,
            api_url: get("WEATHER_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            city_name: get("CITY_NAME").unwrap_or_else(|| DEFAULT_CITY.to_string()),
            timeout_seconds: parse_or(
                "WEATHER_HTTP_TIMEOUT_SECONDS",
                get("WEATHER_HTTP_TIMEOUT_SECONDS"),
                DEFAULT_HTTP_TIMEOUT_SECONDS,
            )?,
        };

        let storage = StorageConfig {
            backend: parse_or(
                "STORAGE_BACKEND",
                get("STORAGE_BACKEND"),
                StorageBackend::build_default(),
            )?,
            s3_bucket: required("S3_BUCKET")?,
            dynamodb_table: required("DYNAMODB_TABLE")?,
            region: get("AWS_REGION").unwrap_or_else(|| DEFAULT_REGION.to_string()),
            endpoint_url: get("AWS_ENDPOINT_URL"),
        };

        Ok(Self {
            weather,
            storage,
            bind_address: get("BIND_ADDRESS").unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string()),
            collect_interval_seconds: parse_or(
                "COLLECT_INTERVAL_SECONDS",
                get("COLLECT_INTERVAL_SECONDS"),
                DEFAULT_COLLECT_INTERVAL_SECONDS,
            )?,
            require_api_key: parse_or("REQUIRE_API_KEY", get("REQUIRE_API_KEY"), true)?,
            log_format: parse_or("LOG_FORMAT", get("LOG_FORMAT"), LogFormat::Json)?,
        })
    }
}

fn parse_or<T: FromStr>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    // Mutex to synchronize tests that modify environment variables
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 3] = [
        ("WEATHER_API_KEY", "key"),
        ("S3_BUCKET", "bucket"),
        ("DYNAMODB_TABLE", "table"),
    ];

    #[test]
    fn defaults_apply_when_only_required_values_are_set() {
        let config = AppConfig::from_lookup(lookup(&REQUIRED)).unwrap();

        assert_eq!(config.weather.api_key, "key");
        assert_eq!(config.weather.api_url, DEFAULT_API_URL);
        assert_eq!(config.weather.city_name, "Tokyo");
        assert_eq!(config.weather.timeout_seconds, 30);
        assert_eq!(config.storage.s3_bucket, "bucket");
        assert_eq!(config.storage.dynamodb_table, "table");
        assert_eq!(config.storage.region, DEFAULT_REGION);
        assert_eq!(config.storage.backend, StorageBackend::build_default());
        assert_eq!(config.storage.endpoint_url, None);
        assert_eq!(config.bind_address, "127.0.0.1:8080");
        assert_eq!(config.collect_interval_seconds, 3600);
        assert!(config.require_api_key);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn each_required_value_is_fatal_when_missing() {
        for missing in ["WEATHER_API_KEY", "S3_BUCKET", "DYNAMODB_TABLE"] {
            let vars: Vec<_> = REQUIRED.iter().copied().filter(|(k, _)| *k != missing).collect();
            let err = AppConfig::from_lookup(lookup(&vars)).unwrap_err();
            assert_eq!(err, ConfigError::Missing(missing));
            assert!(err.to_string().contains(missing));
        }
    }

    #[test]
    fn blank_required_value_counts_as_missing() {
        let mut vars = REQUIRED.to_vec();
        vars[0] = ("WEATHER_API_KEY", "   ");
        let err = AppConfig::from_lookup(lookup(&vars)).unwrap_err();
        assert_eq!(err, ConfigError::Missing("WEATHER_API_KEY"));
    }

    #[test]
    fn overrides_are_parsed() {
        let mut vars = REQUIRED.to_vec();
        vars.extend([
            ("CITY_NAME", "Osaka"),
            ("STORAGE_BACKEND", "MEMORY"),
            ("COLLECT_INTERVAL_SECONDS", "0"),
            ("REQUIRE_API_KEY", "false"),
            ("LOG_FORMAT", "pretty"),
            ("AWS_ENDPOINT_URL", "http://localhost:4566"),
        ]);

        let config = AppConfig::from_lookup(lookup(&vars)).unwrap();
        assert_eq!(config.weather.city_name, "Osaka");
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.collect_interval_seconds, 0);
        assert!(!config.require_api_key);
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(
            config.storage.endpoint_url.as_deref(),
            Some("http://localhost:4566")
        );
    }

    #[test]
    fn unparsable_values_are_rejected() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("COLLECT_INTERVAL_SECONDS", "hourly"));
        let err = AppConfig::from_lookup(lookup(&vars)).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                key: "COLLECT_INTERVAL_SECONDS",
                value: "hourly".to_string()
            }
        );

        let mut vars = REQUIRED.to_vec();
        vars.push(("STORAGE_BACKEND", "postgres"));
        assert!(AppConfig::from_lookup(lookup(&vars)).is_err());
    }

    #[test]
    fn from_env_reads_process_environment() {
        let _lock = ENV_MUTEX.lock().unwrap();

        unsafe {
            env::set_var("WEATHER_API_KEY", "env-key");
            env::set_var("S3_BUCKET", "env-bucket");
            env::set_var("DYNAMODB_TABLE", "env-table");
            env::set_var("CITY_NAME", "Sapporo");
        }

        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.weather.api_key, "env-key");
        assert_eq!(config.weather.city_name, "Sapporo");

        unsafe {
            env::remove_var("WEATHER_API_KEY");
            env::remove_var("S3_BUCKET");
            env::remove_var("DYNAMODB_TABLE");
            env::remove_var("CITY_NAME");
        }
    }
}
