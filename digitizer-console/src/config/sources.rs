use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::loader::ConfigLoadError;

/// Raw configuration as defined in a TOML file.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub server: FileServerConfig,
    #[serde(default)]
    pub channel: FileChannelConfig,
    #[serde(default)]
    pub jobs: FileJobsConfig,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FileServerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FileChannelConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reconnect_floor_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reconnect_ceiling_ms: Option<u64>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FileJobsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

pub const ENV_CONFIG_PATH: &str = "DIGITIZER_CONFIG";
pub const ENV_SERVER_URL: &str = "DIGITIZER_SERVER_URL";
pub const ENV_REQUEST_TIMEOUT: &str = "DIGITIZER_REQUEST_TIMEOUT_SECS";
pub const ENV_RECONNECT_FLOOR: &str = "DIGITIZER_RECONNECT_FLOOR_MS";
pub const ENV_RECONNECT_CEILING: &str = "DIGITIZER_RECONNECT_CEILING_MS";
pub const ENV_PAGE_SIZE: &str = "DIGITIZER_PAGE_SIZE";

/// Values picked up from the process environment.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EnvConfig {
    pub config_path: Option<PathBuf>,
    pub server_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub reconnect_floor_ms: Option<u64>,
    pub reconnect_ceiling_ms: Option<u64>,
    pub page_size: Option<u32>,
}

impl EnvConfig {
    pub fn gather() -> Result<Self, ConfigLoadError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigLoadError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get =
            |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        Ok(Self {
            config_path: get(ENV_CONFIG_PATH).map(PathBuf::from),
            server_url: get(ENV_SERVER_URL),
            request_timeout_secs: parse_var(
                ENV_REQUEST_TIMEOUT,
                get(ENV_REQUEST_TIMEOUT),
            )?,
            reconnect_floor_ms: parse_var(
                ENV_RECONNECT_FLOOR,
                get(ENV_RECONNECT_FLOOR),
            )?,
            reconnect_ceiling_ms: parse_var(
                ENV_RECONNECT_CEILING,
                get(ENV_RECONNECT_CEILING),
            )?,
            page_size: parse_var(ENV_PAGE_SIZE, get(ENV_PAGE_SIZE))?,
        })
    }
}

fn parse_var<T: std::str::FromStr>(
    var: &'static str,
    value: Option<String>,
) -> Result<Option<T>, ConfigLoadError> {
    value
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|_| ConfigLoadError::InvalidEnv { var, value: raw })
        })
        .transpose()
}
