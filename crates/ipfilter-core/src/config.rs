//! The endpoint's configuration surface: everything read from the process
//! environment at startup, collected into one typed record.
//!
//! Unlike the policy document (see the `policy` crate), unrecognized
//! environment variables are not an error — the process environment is
//! shared with the OS and other tooling. Only malformed values of
//! variables this crate recognizes are rejected.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// `tracing` log level selector, driven by `NSM_LOG_LEVEL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    /// Verbose diagnostic output.
    Debug,
    /// Default operational level.
    Info,
    /// Warnings only.
    Warn,
    /// Errors only.
    Error,
}

impl Default for LogLevel {
    fn default() -> Self {
        Self::Info
    }
}

impl FromStr for LogLevel {
    type Err = InvalidLogLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(Self::Debug),
            "INFO" => Ok(Self::Info),
            "WARN" | "WARNING" => Ok(Self::Warn),
            "ERROR" => Ok(Self::Error),
            other => Err(InvalidLogLevel(other.to_string())),
        }
    }
}

impl LogLevel {
    /// Render as the `tracing_subscriber::EnvFilter` directive this level maps to.
    #[must_use]
    pub fn as_filter_directive(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// `NSM_LOG_LEVEL` held a value that isn't one of DEBUG/INFO/WARN/ERROR.
#[derive(Debug, thiserror::Error)]
#[error("invalid NSM_LOG_LEVEL value '{0}', expected one of DEBUG, INFO, WARN, ERROR")]
pub struct InvalidLogLevel(String);

/// The endpoint's full environment-driven configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Inline policy document text, highest-priority policy source (`NSM_IP_POLICY`).
    pub ip_policy_inline: Option<String>,
    /// Filesystem path to a policy document (`NSM_IP_POLICY_CONFIG_PATH`).
    pub ip_policy_config_path: Option<String>,
    /// Endpoint identity string used at registry registration (`NSM_NAME`).
    pub name: String,
    /// Control-plane URL this endpoint connects to (`NSM_CONNECT_TO`).
    pub connect_to: Option<String>,
    /// This endpoint's own listen URL (`NSM_LISTEN_ON`).
    pub listen_on: Option<String>,
    /// Process-wide log level (`NSM_LOG_LEVEL`), default INFO.
    pub log_level: LogLevel,
    /// Legacy alternate mode override (`IPFILTER_MODE`).
    pub legacy_mode: Option<String>,
    /// Legacy allow-list source, literal list or file path (`IPFILTER_WHITELIST`).
    pub legacy_whitelist: Option<String>,
    /// Legacy deny-list source, literal list or file path (`IPFILTER_BLACKLIST`).
    pub legacy_blacklist: Option<String>,
}

impl EndpointConfig {
    /// Load configuration from the process environment, applying documented
    /// defaults for anything absent.
    pub fn from_env() -> Result<Self, InvalidLogLevel> {
        Self::from_env_like(&std::env::vars().collect::<std::collections::HashMap<_, _>>())
    }

    /// Load from an explicit map, for tests that must not touch real
    /// process environment variables.
    pub fn from_env_like(
        vars: &std::collections::HashMap<String, String>,
    ) -> Result<Self, InvalidLogLevel> {
        let get = |k: &str| vars.get(k).cloned();
        let log_level = match get("NSM_LOG_LEVEL") {
            Some(v) => v.parse()?,
            None => LogLevel::default(),
        };
        Ok(Self {
            ip_policy_inline: non_empty(get("NSM_IP_POLICY")),
            ip_policy_config_path: non_empty(get("NSM_IP_POLICY_CONFIG_PATH")),
            name: get("NSM_NAME").unwrap_or_else(|| "nse-ipfilter".to_string()),
            connect_to: non_empty(get("NSM_CONNECT_TO")),
            listen_on: non_empty(get("NSM_LISTEN_ON")),
            log_level,
            legacy_mode: non_empty(get("IPFILTER_MODE")),
            legacy_whitelist: non_empty(get("IPFILTER_WHITELIST")),
            legacy_blacklist: non_empty(get("IPFILTER_BLACKLIST")),
        })
    }
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_when_env_is_empty() {
        let cfg = EndpointConfig::from_env_like(&HashMap::new()).unwrap();
        assert_eq!(cfg.log_level, LogLevel::Info);
        assert_eq!(cfg.name, "nse-ipfilter");
        assert!(cfg.ip_policy_inline.is_none());
    }

    #[test]
    fn invalid_log_level_is_rejected() {
        let mut vars = HashMap::new();
        vars.insert("NSM_LOG_LEVEL".to_string(), "VERBOSE".to_string());
        assert!(EndpointConfig::from_env_like(&vars).is_err());
    }

    #[test]
    fn log_level_is_case_insensitive() {
        let mut vars = HashMap::new();
        vars.insert("NSM_LOG_LEVEL".to_string(), "debug".to_string());
        let cfg = EndpointConfig::from_env_like(&vars).unwrap();
        assert_eq!(cfg.log_level, LogLevel::Debug);
    }

    #[test]
    fn blank_values_are_treated_as_absent() {
        let mut vars = HashMap::new();
        vars.insert("NSM_IP_POLICY".to_string(), String::new());
        let cfg = EndpointConfig::from_env_like(&vars).unwrap();
        assert!(cfg.ip_policy_inline.is_none());
    }
}
