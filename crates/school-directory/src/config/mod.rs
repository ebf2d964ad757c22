use crate::loader::transform::{AddressCleanup, PhoneFormat};
use std::env;
use std::fmt;
use std::path::PathBuf;

/// Distinguishes runtime behavior for different stages of the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub loader: LoaderConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("LOADER_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let input = env::var("LOADER_INPUT")
            .unwrap_or_else(|_| "data/st-elizabeth-schools.csv".to_string());
        let output_root =
            env::var("LOADER_OUTPUT_ROOT").unwrap_or_else(|_| "src/data/schools".to_string());
        let region = env::var("LOADER_REGION").unwrap_or_else(|_| "St. Elizabeth".to_string());

        let raw_format = env::var("LOADER_PHONE_FORMAT").unwrap_or_else(|_| "parish".to_string());
        let phone_format = PhoneFormat::parse(&raw_format)
            .ok_or_else(|| ConfigError::InvalidPhoneFormat(raw_format.clone()))?;

        let area_code = env::var("LOADER_AREA_CODE").unwrap_or_else(|_| "876".to_string());
        if !is_valid_area_code(&area_code) {
            return Err(ConfigError::InvalidAreaCode(area_code));
        }

        let raw_cleanup =
            env::var("LOADER_ADDRESS_CLEANUP").unwrap_or_else(|_| "parish".to_string());
        let address_cleanup = AddressCleanup::parse(&raw_cleanup)
            .ok_or_else(|| ConfigError::InvalidAddressCleanup(raw_cleanup.clone()))?;

        let log_level = env::var("LOADER_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            loader: LoaderConfig {
                input: PathBuf::from(input),
                output_root: PathBuf::from(output_root),
                region,
                phone_format,
                area_code,
                address_cleanup,
            },
            telemetry: TelemetryConfig { log_level },
        })
    }
}

pub fn is_valid_area_code(value: &str) -> bool {
    value.len() == 3 && value.chars().all(|c| c.is_ascii_digit())
}

/// Source, destination, and formatting choices for a load run.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    pub input: PathBuf,
    pub output_root: PathBuf,
    pub region: String,
    pub phone_format: PhoneFormat,
    pub area_code: String,
    pub address_cleanup: AddressCleanup,
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPhoneFormat(String),
    InvalidAreaCode(String),
    InvalidAddressCleanup(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPhoneFormat(value) => write!(
                f,
                "LOADER_PHONE_FORMAT must be 'parish' or 'north-american' (got '{}')",
                value
            ),
            ConfigError::InvalidAreaCode(value) => {
                write!(f, "LOADER_AREA_CODE must be three digits (got '{}')", value)
            }
            ConfigError::InvalidAddressCleanup(value) => write!(
                f,
                "LOADER_ADDRESS_CLEANUP must be 'parish' or 'none' (got '{}')",
                value
            ),
        }
    }
}

impl std::error::Error for ConfigError {}
