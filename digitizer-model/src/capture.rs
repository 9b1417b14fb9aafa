use crate::job::{JobId, JobStatus, SourceType};

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureStatus {
    #[default]
    Idle,
    Recording,
}

impl fmt::Display for CaptureStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureStatus::Idle => f.write_str("idle"),
            CaptureStatus::Recording => f.write_str("recording"),
        }
    }
}

/// Response body of `GET /api/capture/status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureStatusResponse {
    pub status: CaptureStatus,
    #[serde(default)]
    pub job_id: Option<JobId>,
    #[serde(default)]
    pub elapsed: Option<f64>,
    #[serde(default)]
    pub file_size: Option<u64>,
}

/// Response body of `POST /api/capture/start`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureStarted {
    pub job_id: JobId,
    #[serde(default = "recording_status")]
    pub status: JobStatus,
    #[serde(default = "vhs_source")]
    pub source_type: SourceType,
}

fn recording_status() -> JobStatus {
    JobStatus::Ripping
}

fn vhs_source() -> SourceType {
    SourceType::Vhs
}
