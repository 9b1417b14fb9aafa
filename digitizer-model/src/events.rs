use crate::{
    capture::CaptureStatus,
    drive::DriveStatus,
    job::{Job, JobId},
};

use std::fmt;

/// The push channel's event vocabulary, as named on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    DriveStatus,
    CaptureStatus,
    JobProgress,
    JobComplete,
    JobFailed,
    AnalysisProgress,
    AnalysisComplete,
    AnalysisFailed,
    SplitProgress,
    SplitComplete,
    SplitFailed,
}

impl EventKind {
    pub const ALL: [EventKind; 11] = [
        EventKind::DriveStatus,
        EventKind::CaptureStatus,
        EventKind::JobProgress,
        EventKind::JobComplete,
        EventKind::JobFailed,
        EventKind::AnalysisProgress,
        EventKind::AnalysisComplete,
        EventKind::AnalysisFailed,
        EventKind::SplitProgress,
        EventKind::SplitComplete,
        EventKind::SplitFailed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::DriveStatus => "drive_status",
            EventKind::CaptureStatus => "capture_status",
            EventKind::JobProgress => "job_progress",
            EventKind::JobComplete => "job_complete",
            EventKind::JobFailed => "job_failed",
            EventKind::AnalysisProgress => "analysis_progress",
            EventKind::AnalysisComplete => "analysis_complete",
            EventKind::AnalysisFailed => "analysis_failed",
            EventKind::SplitProgress => "split_progress",
            EventKind::SplitComplete => "split_complete",
            EventKind::SplitFailed => "split_failed",
        }
    }

    pub fn from_wire(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded push-channel event.
///
/// `job_progress` frames are split into [`DigitizerEvent::RipProgress`] and
/// [`DigitizerEvent::CaptureProgress`] when decoded; nothing downstream of the
/// decoder ever sees the shared wire name.
#[derive(Debug, Clone, PartialEq)]
pub enum DigitizerEvent {
    DriveStatus {
        status: DriveStatus,
    },
    CaptureStatus {
        status: CaptureStatus,
    },
    RipProgress {
        job_id: JobId,
        progress: u8,
    },
    CaptureProgress {
        job_id: JobId,
        elapsed: f64,
        file_size: u64,
    },
    JobComplete {
        job: Box<Job>,
    },
    JobFailed {
        job: Box<Job>,
    },
    AnalysisProgress {
        job_id: JobId,
        progress: u8,
    },
    AnalysisComplete {
        job_id: Option<JobId>,
    },
    AnalysisFailed {
        job_id: Option<JobId>,
        error: Option<String>,
    },
    SplitProgress {
        job_id: JobId,
        progress: u8,
        current_scene: u32,
    },
    SplitComplete {
        job_id: Option<JobId>,
    },
    SplitFailed {
        job_id: Option<JobId>,
        error: Option<String>,
    },
    /// A well-formed frame whose type this client does not know.
    Unknown {
        event: String,
    },
}

impl DigitizerEvent {
    /// Wire kind this event was decoded from; `None` for unknown frames.
    pub fn kind(&self) -> Option<EventKind> {
        let kind = match self {
            DigitizerEvent::DriveStatus { .. } => EventKind::DriveStatus,
            DigitizerEvent::CaptureStatus { .. } => EventKind::CaptureStatus,
            DigitizerEvent::RipProgress { .. }
            | DigitizerEvent::CaptureProgress { .. } => EventKind::JobProgress,
            DigitizerEvent::JobComplete { .. } => EventKind::JobComplete,
            DigitizerEvent::JobFailed { .. } => EventKind::JobFailed,
            DigitizerEvent::AnalysisProgress { .. } => {
                EventKind::AnalysisProgress
            }
            DigitizerEvent::AnalysisComplete { .. } => {
                EventKind::AnalysisComplete
            }
            DigitizerEvent::AnalysisFailed { .. } => EventKind::AnalysisFailed,
            DigitizerEvent::SplitProgress { .. } => EventKind::SplitProgress,
            DigitizerEvent::SplitComplete { .. } => EventKind::SplitComplete,
            DigitizerEvent::SplitFailed { .. } => EventKind::SplitFailed,
            DigitizerEvent::Unknown { .. } => return None,
        };
        Some(kind)
    }
}
