//! Process configuration, read once at startup

use crate::llm::{AzureConfig, DEFAULT_API_VERSION, DEFAULT_DEPLOYMENT};
use axum::http::HeaderValue;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:3000";
pub const DEFAULT_SELFIE_DIR: &str = "selfies";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
const DEFAULT_REPLY_DELAY_MS: u64 = 2000;
const DEFAULT_SESSION_TTL_SECS: u64 = 30 * 60;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var}={value:?} is not a valid {expected}")]
    Invalid {
        var: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Timing knobs for the dialogue runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialogueConfig {
    /// Pause before answering the static steps (follow-up and selfie answer)
    pub reply_delay: Duration,
    /// Idle time after which a session is evicted
    pub session_ttl: Duration,
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            reply_delay: Duration::from_millis(DEFAULT_REPLY_DELAY_MS),
            session_ttl: Duration::from_secs(DEFAULT_SESSION_TTL_SECS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub allowed_origin: HeaderValue,
    pub selfie_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub dialogue: DialogueConfig,
    pub azure: AzureConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset and empty values fall back to defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = parse_or(get("MIRROR_PORT"), "MIRROR_PORT", "port", DEFAULT_PORT)?;

        let origin = get("MIRROR_ALLOWED_ORIGIN")
            .unwrap_or_else(|| DEFAULT_ALLOWED_ORIGIN.to_string());
        let allowed_origin =
            HeaderValue::from_str(&origin).map_err(|_| ConfigError::Invalid {
                var: "MIRROR_ALLOWED_ORIGIN",
                value: origin.clone(),
                expected: "origin",
            })?;

        let selfie_dir = PathBuf::from(
            get("MIRROR_SELFIE_DIR").unwrap_or_else(|| DEFAULT_SELFIE_DIR.to_string()),
        );

        let max_upload_bytes = parse_or(
            get("MIRROR_MAX_UPLOAD_BYTES"),
            "MIRROR_MAX_UPLOAD_BYTES",
            "byte count",
            DEFAULT_MAX_UPLOAD_BYTES,
        )?;

        let reply_delay_ms = parse_or(
            get("MIRROR_REPLY_DELAY_MS"),
            "MIRROR_REPLY_DELAY_MS",
            "millisecond count",
            DEFAULT_REPLY_DELAY_MS,
        )?;

        let session_ttl_secs = parse_or(
            get("MIRROR_SESSION_TTL_SECS"),
            "MIRROR_SESSION_TTL_SECS",
            "positive second count",
            DEFAULT_SESSION_TTL_SECS,
        )?;
        if session_ttl_secs == 0 {
            return Err(ConfigError::Invalid {
                var: "MIRROR_SESSION_TTL_SECS",
                value: "0".to_string(),
                expected: "positive second count",
            });
        }

        let azure = AzureConfig {
            endpoint: get("AZURE_OPENAI_ENDPOINT"),
            api_key: get("AZURE_OPENAI_API_KEY"),
            deployment: get("AZURE_OPENAI_DEPLOYMENT")
                .unwrap_or_else(|| DEFAULT_DEPLOYMENT.to_string()),
            api_version: get("AZURE_OPENAI_API_VERSION")
                .or_else(|| get("OPENAI_API_VERSION"))
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
        };

        Ok(Self {
            port,
            allowed_origin,
            selfie_dir,
            max_upload_bytes,
            dialogue: DialogueConfig {
                reply_delay: Duration::from_millis(reply_delay_ms),
                session_ttl: Duration::from_secs(session_ttl_secs),
            },
            azure,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    raw: Option<String>,
    var: &'static str,
    expected: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            var,
            value: value.clone(),
            expected,
        }),
    }
}
