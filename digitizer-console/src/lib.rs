//! Runtime side of the Digitizer console.
//!
//! - [`infra`]: reqwest client for the REST surface and the [`DigitizerApi`]
//!   trait over it.
//! - [`channel`]: the single reconnecting WebSocket to `/api/ws`.
//! - [`store`]: the shared [`LiveStateStore`] fed by the channel.
//! - [`session`]: scene review for one job.
//! - [`config`]: layered configuration.

pub mod channel;
pub mod config;
pub mod infra;
pub mod session;
pub mod store;

pub use channel::{
    ChannelConfig, ChannelError, ConnectionPhase, ConnectionState,
    EventChannel, EventHandler,
};
pub use config::{ConfigLoader, ConsoleConfig};
pub use infra::{ApiClient, DigitizerApi, RepositoryError, RepositoryResult};
pub use session::{SceneReviewSession, SessionError};
pub use store::{LiveStateStore, SubscriptionId};
