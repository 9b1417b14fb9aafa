//! Push channel frame decoding.

pub mod codec;

pub use codec::{FrameDecodeError, decode_frame};
