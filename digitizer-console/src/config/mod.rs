//! Console configuration.
//!
//! Sources, lowest precedence first: built-in defaults, a TOML file
//! (`--config`, `DIGITIZER_CONFIG`, `digitizer.toml`,
//! `config/digitizer.toml`), `DIGITIZER_*` environment variables (a `.env`
//! file is honoured), then command-line flags.

pub mod loader;
pub mod sources;

use std::time::Duration;

use digitizer_core::backoff::{
    DEFAULT_RECONNECT_CEILING_MS, DEFAULT_RECONNECT_FLOOR_MS,
};

use crate::channel::{ChannelConfig, ChannelError};
use crate::infra::api_client::DEFAULT_REQUEST_TIMEOUT;

pub use loader::{
    ConfigLoad, ConfigLoadError, ConfigLoader, ConfigLoaderOptions,
    ConfigOverrides,
};
pub use sources::{EnvConfig, FileConfig};

pub const DEFAULT_SERVER_URL: &str = "http://localhost:8000";
pub const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleConfig {
    /// Normalized HTTP base URL of the backend.
    pub server_url: String,
    pub request_timeout: Duration,
    pub reconnect_floor: Duration,
    pub reconnect_ceiling: Duration,
    pub default_page_size: u32,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            reconnect_floor: Duration::from_millis(DEFAULT_RECONNECT_FLOOR_MS),
            reconnect_ceiling: Duration::from_millis(
                DEFAULT_RECONNECT_CEILING_MS,
            ),
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ConsoleConfig {
    pub fn channel_config(&self) -> Result<ChannelConfig, ChannelError> {
        Ok(ChannelConfig::from_base_url(&self.server_url)?
            .with_backoff(self.reconnect_floor, self.reconnect_ceiling))
    }
}
