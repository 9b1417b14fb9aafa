//! The push connection to `/api/ws`.

pub mod manager;

pub use manager::{
    ChannelConfig, ChannelError, ConnectionPhase, ConnectionState,
    EventChannel, EventHandler,
};
