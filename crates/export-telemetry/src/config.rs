//! Telemetry configuration from environment variables.

/// Log line encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Plain,
    /// One JSON object per line, for log shippers
    Json,
}

/// Configuration for logging output.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Attached to the startup log line
    pub service_name: String,

    /// `EnvFilter` directive: a bare level or per-target directives
    pub log_level: String,

    pub log_format: LogFormat,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "edge-export-distro".to_string(),
            log_level: "info".to_string(),
            log_format: LogFormat::Plain,
        }
    }
}

impl TelemetryConfig {
    /// Read configuration from the process environment.
    ///
    /// # Environment Variables
    ///
    /// - `EDGE_EXPORT_SERVICE_NAME`: Service name (default: edge-export-distro)
    /// - `EDGE_EXPORT_LOG_LEVEL` or `RUST_LOG`: Filter directive (default: info)
    /// - `EDGE_EXPORT_JSON_LOGS`: `true`/`1` for JSON lines. Unset means JSON
    ///   inside a container (`KUBERNETES_SERVICE_HOST` or `DOCKER_CONTAINER`
    ///   present), plain otherwise.
    pub fn from_env() -> Self {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let in_container =
            lookup("KUBERNETES_SERVICE_HOST").is_some() || lookup("DOCKER_CONTAINER").is_some();

        let json = match lookup("EDGE_EXPORT_JSON_LOGS") {
            Some(value) => matches!(value.to_lowercase().as_str(), "true" | "1"),
            None => in_container,
        };

        Self {
            service_name: lookup("EDGE_EXPORT_SERVICE_NAME").unwrap_or(defaults.service_name),
            log_level: lookup("EDGE_EXPORT_LOG_LEVEL")
                .or_else(|| lookup("RUST_LOG"))
                .unwrap_or(defaults.log_level),
            log_format: if json {
                LogFormat::Json
            } else {
                LogFormat::Plain
            },
        }
    }
}
