use crate::config::TelemetryConfig;
use std::env;
use std::fmt;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
pub enum TelemetryError {
    InvalidFilter { directive: String, source: ParseError },
    AlreadyInstalled(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryError::InvalidFilter { directive, .. } => {
                write!(f, "log filter '{directive}' is not a valid tracing directive")
            }
            TelemetryError::AlreadyInstalled(err) => {
                write!(f, "a global tracing subscriber is already installed: {err}")
            }
        }
    }
}

impl std::error::Error for TelemetryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TelemetryError::InvalidFilter { source, .. } => Some(source),
            TelemetryError::AlreadyInstalled(err) => Some(&**err),
        }
    }
}

/// A non-blank `RUST_LOG` replaces the configured level outright.
fn filter_directive<'a>(config: &'a TelemetryConfig, rust_log: Option<&'a str>) -> &'a str {
    match rust_log.map(str::trim) {
        Some(directive) if !directive.is_empty() => directive,
        _ => config.log_level.trim(),
    }
}

fn build_filter(directive: &str) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(directive).map_err(|source| TelemetryError::InvalidFilter {
        directive: directive.to_string(),
        source,
    })
}

/// Installs the process-wide subscriber. Log lines go to stderr so the run report
/// printed on stdout stays clean.
pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let rust_log = env::var("RUST_LOG").ok();
    let filter = build_filter(filter_directive(config, rust_log.as_deref()))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(false)
        .compact()
        .try_init()
        .map_err(TelemetryError::AlreadyInstalled)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(level: &str) -> TelemetryConfig {
        TelemetryConfig {
            log_level: level.to_string(),
        }
    }

    #[test]
    fn rust_log_takes_precedence_unless_blank() {
        let config = config("info");
        assert_eq!(
            filter_directive(&config, Some("school_directory=debug")),
            "school_directory=debug"
        );
        assert_eq!(filter_directive(&config, Some("   ")), "info");
        assert_eq!(filter_directive(&config, None), "info");
    }

    #[test]
    fn invalid_level_names_the_directive() {
        let error = build_filter("school_directory=loud").expect_err("bad level rejected");
        assert!(matches!(
            &error,
            TelemetryError::InvalidFilter { directive, .. } if directive == "school_directory=loud"
        ));
        assert_eq!(
            error.to_string(),
            "log filter 'school_directory=loud' is not a valid tracing directive"
        );
        assert!(build_filter("warn,school_directory::loader=debug").is_ok());
    }
}
