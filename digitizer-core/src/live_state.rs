//! The console's live view of the backend and its reducer.
//!
//! `LiveState` only tracks progress pointers (which job is ripping, which
//! capture is recording, which analysis or split is running). Entity lists
//! are never held here; consumers re-fetch them when a terminal event lands.

use digitizer_model::{CaptureStatus, DigitizerEvent, DriveStatus, Job, JobId};

/// Disc currently being ripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RipProgress {
    /// Job doing the rip.
    pub job_id: JobId,
    /// Percent complete, 0 to 100.
    pub progress: u8,
}

/// Tape currently being recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureProgress {
    /// Job the capture writes into.
    pub job_id: JobId,
    /// Seconds recorded so far.
    pub elapsed: f64,
    /// Bytes written so far.
    pub file_size: u64,
}

/// Scene detection running on a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisProgress {
    /// Job being analyzed.
    pub job_id: JobId,
    /// Percent complete, 0 to 100.
    pub progress: u8,
}

/// Per-scene file writing running on a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitProgress {
    /// Job being split.
    pub job_id: JobId,
    /// Percent complete, 0 to 100.
    pub progress: u8,
    /// 1-based index of the scene currently being written.
    pub current_scene: u32,
}

/// Snapshot of everything the push channel has told us.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LiveState {
    /// Last reported optical drive state.
    pub drive_status: DriveStatus,
    /// Rip in progress, cleared when the job completes or fails.
    pub active_job: Option<RipProgress>,
    /// Last reported capture device state.
    pub capture_status: CaptureStatus,
    /// Recording in progress, cleared when capture goes idle.
    pub capture: Option<CaptureProgress>,
    /// Most recent job that finished successfully.
    pub last_completed: Option<Job>,
    /// Most recent job that failed.
    pub last_failed: Option<Job>,
    /// Analysis in progress. Only one job is tracked at a time.
    pub analysis: Option<AnalysisProgress>,
    /// Split in progress. Only one job is tracked at a time.
    pub split: Option<SplitProgress>,
    /// Mirrors whether the push channel is currently open.
    pub connected: bool,
}

impl LiveState {
    /// Analysis progress, if it concerns `job_id`.
    pub fn analysis_for(&self, job_id: &JobId) -> Option<&AnalysisProgress> {
        self.analysis.as_ref().filter(|a| &a.job_id == job_id)
    }

    /// Split progress, if it concerns `job_id`.
    pub fn split_for(&self, job_id: &JobId) -> Option<&SplitProgress> {
        self.split.as_ref().filter(|s| &s.job_id == job_id)
    }

    /// Whether the capture device reports an active recording.
    pub fn is_recording(&self) -> bool {
        self.capture_status == CaptureStatus::Recording
    }

    /// Copy of `self` with the connection flag replaced.
    pub fn with_connected(mut self, connected: bool) -> Self {
        self.connected = connected;
        self
    }
}

/// Fold one event into `state`, returning the next snapshot.
pub fn reduce(state: &LiveState, event: &DigitizerEvent) -> LiveState {
    let mut next = state.clone();
    match event {
        DigitizerEvent::DriveStatus { status } => {
            next.drive_status = *status;
        }
        DigitizerEvent::CaptureStatus { status } => {
            next.capture_status = *status;
            if *status == CaptureStatus::Idle {
                next.capture = None;
            }
        }
        DigitizerEvent::RipProgress { job_id, progress } => {
            next.active_job = Some(RipProgress {
                job_id: job_id.clone(),
                progress: *progress,
            });
        }
        DigitizerEvent::CaptureProgress {
            job_id,
            elapsed,
            file_size,
        } => {
            next.capture = Some(CaptureProgress {
                job_id: job_id.clone(),
                elapsed: *elapsed,
                file_size: *file_size,
            });
        }
        DigitizerEvent::JobComplete { job } => {
            next.active_job = None;
            next.last_completed = Some(job.as_ref().clone());
        }
        DigitizerEvent::JobFailed { job } => {
            next.active_job = None;
            next.last_failed = Some(job.as_ref().clone());
        }
        DigitizerEvent::AnalysisProgress { job_id, progress } => {
            next.analysis = Some(AnalysisProgress {
                job_id: job_id.clone(),
                progress: *progress,
            });
        }
        DigitizerEvent::AnalysisComplete { .. }
        | DigitizerEvent::AnalysisFailed { .. } => {
            next.analysis = None;
        }
        DigitizerEvent::SplitProgress {
            job_id,
            progress,
            current_scene,
        } => {
            next.split = Some(SplitProgress {
                job_id: job_id.clone(),
                progress: *progress,
                current_scene: *current_scene,
            });
        }
        DigitizerEvent::SplitComplete { .. }
        | DigitizerEvent::SplitFailed { .. } => {
            next.split = None;
        }
        DigitizerEvent::Unknown { .. } => {}
    }
    next
}
