use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

use super::{
    ConsoleConfig,
    sources::{EnvConfig, FileConfig},
};
use crate::infra::api_client::normalize_base_url;

const DEFAULT_CONFIG_LOCATIONS: [&str; 2] =
    ["digitizer.toml", "config/digitizer.toml"];

/// Values given on the command line; they win over every other source.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub server_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub page_size: Option<u32>,
}

#[derive(Debug, Default, Clone)]
pub struct ConfigLoaderOptions {
    pub config_path: Option<PathBuf>,
    pub env_file: Option<PathBuf>,
}

/// Layers configuration: defaults, then TOML file, then environment, then
/// command-line overrides.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: ConfigLoaderOptions,
    env: Option<EnvConfig>,
    overrides: ConfigOverrides,
    search_root: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: ConsoleConfig,
    /// File the configuration was read from, if any.
    pub source: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ConfigLoaderOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.config_path = Some(path.into());
        self
    }

    /// Use these environment values instead of reading the process
    /// environment. No `.env` file is loaded in that case.
    pub fn with_env(mut self, env: EnvConfig) -> Self {
        self.env = Some(env);
        self
    }

    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Directory the default config locations are resolved against.
    pub fn with_search_root<P: Into<PathBuf>>(mut self, root: P) -> Self {
        self.search_root = Some(root.into());
        self
    }

    pub fn load(&self) -> Result<ConfigLoad, ConfigLoadError> {
        let env = match &self.env {
            Some(env) => env.clone(),
            None => {
                self.load_env_file()?;
                EnvConfig::gather()?
            }
        };

        let (file, source) = self.load_file_config(&env)?;
        let config = self.compose(file.unwrap_or_default(), &env)?;

        info!(
            server = %config.server_url,
            source = ?source,
            "configuration loaded"
        );
        Ok(ConfigLoad { config, source })
    }

    fn load_env_file(&self) -> Result<bool, ConfigLoadError> {
        let loaded = match &self.options.env_file {
            Some(path) => dotenvy::from_path(path).map(|_| true),
            None => dotenvy::dotenv().map(|_| true),
        };
        match loaded {
            Ok(loaded) => Ok(loaded),
            Err(dotenvy::Error::Io(_)) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    fn load_file_config(
        &self,
        env: &EnvConfig,
    ) -> Result<(Option<FileConfig>, Option<PathBuf>), ConfigLoadError> {
        let requested = self
            .options
            .config_path
            .clone()
            .or_else(|| env.config_path.clone());

        let path = match requested {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigLoadError::MissingConfig { path });
                }
                path
            }
            None => match self.default_location() {
                Some(path) => path,
                None => {
                    debug!("no configuration file found, using defaults");
                    return Ok((None, None));
                }
            },
        };

        let contents =
            fs::read_to_string(&path).map_err(|err| ConfigLoadError::Io {
                path: path.clone(),
                source: err,
            })?;
        let file: FileConfig =
            toml::from_str(&contents).map_err(|err| ConfigLoadError::Parse {
                path: path.clone(),
                source: err,
            })?;
        Ok((Some(file), Some(path)))
    }

    fn default_location(&self) -> Option<PathBuf> {
        let root = self.search_root.as_deref().unwrap_or(Path::new(""));
        DEFAULT_CONFIG_LOCATIONS
            .iter()
            .map(|candidate| root.join(candidate))
            .find(|candidate| candidate.exists())
    }

    fn compose(
        &self,
        file: FileConfig,
        env: &EnvConfig,
    ) -> Result<ConsoleConfig, ConfigLoadError> {
        let defaults = ConsoleConfig::default();
        let overrides = &self.overrides;

        let raw_url = overrides
            .server_url
            .clone()
            .or_else(|| env.server_url.clone())
            .or(file.server.url)
            .unwrap_or(defaults.server_url);
        let server_url = validate_server_url(&raw_url)?;

        let timeout_secs = overrides
            .request_timeout_secs
            .or(env.request_timeout_secs)
            .or(file.server.request_timeout_secs);
        let request_timeout = match timeout_secs {
            Some(0) => {
                return Err(ConfigLoadError::InvalidValue {
                    field: "request_timeout_secs",
                    reason: "must be greater than zero".into(),
                });
            }
            Some(secs) => Duration::from_secs(secs),
            None => defaults.request_timeout,
        };

        let reconnect_floor = env
            .reconnect_floor_ms
            .or(file.channel.reconnect_floor_ms)
            .map_or(defaults.reconnect_floor, Duration::from_millis);
        let reconnect_ceiling = env
            .reconnect_ceiling_ms
            .or(file.channel.reconnect_ceiling_ms)
            .map_or(defaults.reconnect_ceiling, Duration::from_millis);
        if reconnect_floor.is_zero() {
            return Err(ConfigLoadError::InvalidValue {
                field: "reconnect_floor_ms",
                reason: "must be greater than zero".into(),
            });
        }
        if reconnect_floor > reconnect_ceiling {
            return Err(ConfigLoadError::BackoffInverted {
                floor_ms: reconnect_floor.as_millis() as u64,
                ceiling_ms: reconnect_ceiling.as_millis() as u64,
            });
        }

        let default_page_size = overrides
            .page_size
            .or(env.page_size)
            .or(file.jobs.page_size)
            .unwrap_or(defaults.default_page_size);
        if default_page_size == 0 {
            return Err(ConfigLoadError::InvalidValue {
                field: "page_size",
                reason: "must be greater than zero".into(),
            });
        }

        Ok(ConsoleConfig {
            server_url,
            request_timeout,
            reconnect_floor,
            reconnect_ceiling,
            default_page_size,
        })
    }
}

fn validate_server_url(raw: &str) -> Result<String, ConfigLoadError> {
    let normalized = normalize_base_url(raw);
    let parsed =
        Url::parse(&normalized).map_err(|err| ConfigLoadError::InvalidServerUrl {
            url: raw.to_string(),
            reason: err.to_string(),
        })?;
    if parsed.host_str().is_none() {
        return Err(ConfigLoadError::InvalidServerUrl {
            url: raw.to_string(),
            reason: "missing host".into(),
        });
    }
    Ok(normalized)
}

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("configuration file missing: {path}")]
    MissingConfig { path: PathBuf },
    #[error("failed to read configuration {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid server URL '{url}': {reason}")]
    InvalidServerUrl { url: String, reason: String },
    #[error("environment variable {var} has invalid value '{value}'")]
    InvalidEnv { var: &'static str, value: String },
    #[error("invalid {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
    #[error(
        "reconnect floor ({floor_ms} ms) is above the ceiling ({ceiling_ms} ms)"
    )]
    BackoffInverted { floor_ms: u64, ceiling_ms: u64 },
    #[error(transparent)]
    EnvFile(#[from] dotenvy::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loader() -> ConfigLoader {
        ConfigLoader::new()
            .with_env(EnvConfig::default())
            .with_search_root("/nonexistent-digitizer-root")
    }

    #[test]
    fn defaults_apply_without_any_source() {
        let load = loader().load().expect("defaults");
        assert!(load.source.is_none());
        assert_eq!(load.config, ConsoleConfig::default());
    }

    #[test]
    fn overrides_beat_environment() {
        let env = EnvConfig {
            server_url: Some("http://env-host:8000".into()),
            request_timeout_secs: Some(5),
            ..EnvConfig::default()
        };
        let config = loader()
            .with_env(env)
            .with_overrides(ConfigOverrides {
                server_url: Some("cli-host:9000/".into()),
                ..ConfigOverrides::default()
            })
            .load()
            .expect("load")
            .config;

        assert_eq!(config.server_url, "http://cli-host:9000");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn inverted_backoff_is_rejected() {
        let env = EnvConfig {
            reconnect_floor_ms: Some(5_000),
            reconnect_ceiling_ms: Some(1_000),
            ..EnvConfig::default()
        };
        let err = loader().with_env(env).load().expect_err("inverted");
        assert!(matches!(
            err,
            ConfigLoadError::BackoffInverted {
                floor_ms: 5_000,
                ceiling_ms: 1_000
            }
        ));
    }

    #[test]
    fn bad_urls_are_rejected() {
        let err = loader()
            .with_overrides(ConfigOverrides {
                server_url: Some("http://exa mple.lan".into()),
                ..ConfigOverrides::default()
            })
            .load()
            .expect_err("bad url");
        assert!(matches!(err, ConfigLoadError::InvalidServerUrl { .. }));
    }

    #[test]
    fn env_values_must_parse() {
        let err = EnvConfig::from_lookup(|key| {
            (key == "DIGITIZER_RECONNECT_FLOOR_MS").then(|| "soon".to_string())
        })
        .expect_err("not a number");
        assert!(matches!(
            err,
            ConfigLoadError::InvalidEnv {
                var: "DIGITIZER_RECONNECT_FLOOR_MS",
                ..
            }
        ));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = loader()
            .with_config_path("/nonexistent-digitizer-root/digitizer.toml")
            .load()
            .expect_err("missing");
        assert!(matches!(err, ConfigLoadError::MissingConfig { .. }));
    }
}
