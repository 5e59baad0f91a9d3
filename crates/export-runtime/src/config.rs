//! # Runtime Configuration
//!
//! Everything is read from the environment. Unset variables take their
//! defaults; set but malformed values are errors rather than silently
//! falling back.
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `EXPORT_DISTRO_PORT` | `48070` | HTTP control surface port |
//! | `EXPORT_DISTRO_REGISTRATIONS` | `registrations.json` | Registration document file |
//! | `EXPORT_DISTRO_SIMULATE_MS` | unset | Emit a synthetic event every N ms (`0` disables) |
//! | `EXPORT_DISTRO_EVENT_BUFFER` | `1024` | Events waiting for the distribution loop |
//! | `EXPORT_DISTRO_INBOX_CAPACITY` | `64` | Per-registration event inbox |
//! | `EXPORT_DISTRO_HTTP_TIMEOUT_MS` | `10000` | REST sender request timeout |
//! | `EXPORT_DISTRO_SHUTDOWN_TIMEOUT_MS` | `5000` | Wait for actors on shutdown |

use std::env;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use export_distro::DistroConfig;
use thiserror::Error;

/// Default distro port, shared with the rest of the export services.
pub const DEFAULT_PORT: u16 = 48070;

/// Configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RuntimeConfigError {
    #[error("Invalid value {value:?} for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Complete runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Port of the HTTP control surface
    pub http_port: u16,
    /// JSON file holding the registration documents
    pub registrations_path: PathBuf,
    /// Interval of the simulated event source, if enabled
    pub simulate_interval: Option<Duration>,
    /// Capacity of the channel feeding the distribution loop
    pub event_buffer: usize,
    /// Distribution engine configuration
    pub distro: DistroConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            http_port: DEFAULT_PORT,
            registrations_path: PathBuf::from("registrations.json"),
            simulate_interval: None,
            event_buffer: 1024,
            distro: DistroConfig::default(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, RuntimeConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, RuntimeConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(port) = parse(&lookup, "EXPORT_DISTRO_PORT")? {
            config.http_port = port;
        }
        if let Some(path) = lookup("EXPORT_DISTRO_REGISTRATIONS") {
            config.registrations_path = PathBuf::from(path);
        }
        if let Some(ms) = parse::<u64, _>(&lookup, "EXPORT_DISTRO_SIMULATE_MS")? {
            config.simulate_interval = (ms > 0).then(|| Duration::from_millis(ms));
        }
        if let Some(buffer) = parse_positive(&lookup, "EXPORT_DISTRO_EVENT_BUFFER")? {
            config.event_buffer = buffer;
        }
        if let Some(capacity) = parse_positive(&lookup, "EXPORT_DISTRO_INBOX_CAPACITY")? {
            config.distro.event_inbox_capacity = capacity;
        }
        if let Some(ms) = parse::<u64, _>(&lookup, "EXPORT_DISTRO_HTTP_TIMEOUT_MS")? {
            config.distro.sender.http_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = parse::<u64, _>(&lookup, "EXPORT_DISTRO_SHUTDOWN_TIMEOUT_MS")? {
            config.distro.shutdown_timeout = Duration::from_millis(ms);
        }

        Ok(config)
    }

    /// Address the HTTP control surface binds to.
    pub fn http_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.http_port))
    }
}

fn parse<T, F>(lookup: &F, var: &'static str) -> Result<Option<T>, RuntimeConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| RuntimeConfigError::Invalid {
                var,
                reason: e.to_string(),
                value,
            }),
    }
}

fn parse_positive<F>(lookup: &F, var: &'static str) -> Result<Option<usize>, RuntimeConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match parse::<usize, _>(lookup, var)? {
        Some(0) => Err(RuntimeConfigError::Invalid {
            var,
            value: "0".to_string(),
            reason: "must be greater than zero".to_string(),
        }),
        other => Ok(other),
    }
}
