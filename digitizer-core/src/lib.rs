//! Core library for the Digitizer console.
//!
//! Everything in this crate is synchronous and side-effect free: decoding of
//! push-channel frames, the live state reducer, the reconnect backoff policy,
//! and the scene interval editor. The async runtime pieces (HTTP client,
//! WebSocket channel, stores) live in `digitizer-console`.

pub mod api;
pub mod backoff;
pub mod events;
pub mod live_state;
pub mod scenes;

pub use backoff::ReconnectBackoff;
pub use events::codec::{FrameDecodeError, decode_frame};
pub use live_state::{
    AnalysisProgress, CaptureProgress, LiveState, RipProgress, SplitProgress,
    reduce,
};
pub use scenes::editor::{BoundaryPolicy, SceneEditError, SceneEditor};
