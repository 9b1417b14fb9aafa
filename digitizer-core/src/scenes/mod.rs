//! Scene list editing and layout.
//!
//! A job's scenes partition `[0, duration]` into contiguous, ordered,
//! non-overlapping intervals. [`editor::SceneEditor`] proposes new lists that
//! keep that shape; the server's answer is always adopted as-is.

pub mod editor;
pub mod timeline;

pub use editor::{
    BoundaryPolicy, PartitionViolation, SceneEditError, SceneEditor,
    reindex, to_boundaries, validate_partition,
};
pub use timeline::{TimelineSegment, layout, scene_at};
