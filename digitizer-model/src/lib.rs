//! Core data model definitions shared across Digitizer crates.
#![allow(missing_docs)]

pub mod capture;
pub mod drive;
pub mod error;
pub mod events;
pub mod job;
pub mod scene;
pub mod settings;
pub mod units;

pub use capture::{CaptureStarted, CaptureStatus, CaptureStatusResponse};
pub use drive::{DriveState, DriveStatus};
pub use error::{ModelError, Result as ModelResult};
pub use events::{DigitizerEvent, EventKind};
pub use job::{
    AnalysisStatus, AnalyzeAccepted, Deleted, DiscInfo, Job, JobId, JobQuery,
    JobStatus, SourceType, SplitAccepted,
};
pub use scene::{Scene, SceneBoundary};
pub use settings::{Settings, SettingsUpdate};
pub use units::{ByteSize, Timecode};
