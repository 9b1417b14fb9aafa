//! `{event, data}` frame decoding.

use digitizer_model::{
    CaptureStatus, DigitizerEvent, DriveStatus, EventKind, Job, JobId,
};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Why a frame could not be turned into a [`DigitizerEvent`].
///
/// None of these are fatal to the channel; the frame is dropped.
#[derive(Debug, thiserror::Error)]
pub enum FrameDecodeError {
    /// Blank or whitespace-only text.
    #[error("empty frame")]
    Empty,

    /// Not JSON, or JSON without an `event` name.
    #[error("frame is not an {{event, data}} envelope: {0}")]
    Malformed(#[source] serde_json::Error),

    /// Known event whose `data` does not match its schema.
    #[error("invalid {event} payload: {source}")]
    Payload {
        /// Event named by the envelope.
        event: EventKind,
        /// Underlying deserialization failure.
        #[source]
        source: serde_json::Error,
    },

    /// Known event whose `data` lacks a required key.
    #[error("{event} payload is missing '{field}'")]
    MissingField {
        /// Event named by the envelope.
        event: EventKind,
        /// Wire name of the missing key.
        field: &'static str,
    },
}

#[derive(Debug, Deserialize)]
struct Envelope {
    event: String,
    #[serde(default)]
    data: Value,
}

#[derive(Debug, Deserialize)]
struct StatusPayload<T> {
    status: T,
}

#[derive(Debug, Deserialize)]
struct ProgressPayload {
    job_id: JobId,
    progress: f64,
}

#[derive(Debug, Deserialize)]
struct RipProgressPayload {
    job_id: JobId,
    #[serde(default)]
    progress: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct CaptureProgressPayload {
    job_id: JobId,
    #[serde(default)]
    elapsed: Option<f64>,
    #[serde(default)]
    file_size: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct SplitProgressPayload {
    job_id: JobId,
    progress: f64,
    #[serde(default)]
    current_scene: u32,
}

#[derive(Debug, Default, Deserialize)]
struct OutcomePayload {
    #[serde(default)]
    job_id: Option<JobId>,
    #[serde(default)]
    error: Option<String>,
}

/// Decode one text frame of the push channel.
///
/// Unknown event names decode to [`DigitizerEvent::Unknown`] so the caller
/// can ignore them; only structurally broken frames are errors.
pub fn decode_frame(text: &str) -> Result<DigitizerEvent, FrameDecodeError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(FrameDecodeError::Empty);
    }

    let envelope: Envelope =
        serde_json::from_str(trimmed).map_err(FrameDecodeError::Malformed)?;

    let Some(kind) = EventKind::from_wire(&envelope.event) else {
        return Ok(DigitizerEvent::Unknown {
            event: envelope.event,
        });
    };

    decode_payload(kind, envelope.data)
}

fn decode_payload(
    kind: EventKind,
    data: Value,
) -> Result<DigitizerEvent, FrameDecodeError> {
    let event = match kind {
        EventKind::DriveStatus => {
            let payload: StatusPayload<DriveStatus> = parse(kind, data)?;
            DigitizerEvent::DriveStatus {
                status: payload.status,
            }
        }
        EventKind::CaptureStatus => {
            let payload: StatusPayload<CaptureStatus> = parse(kind, data)?;
            DigitizerEvent::CaptureStatus {
                status: payload.status,
            }
        }
        EventKind::JobProgress => decode_job_progress(data)?,
        EventKind::JobComplete => DigitizerEvent::JobComplete {
            job: Box::new(parse::<Job>(kind, data)?),
        },
        EventKind::JobFailed => DigitizerEvent::JobFailed {
            job: Box::new(parse::<Job>(kind, data)?),
        },
        EventKind::AnalysisProgress => {
            let payload: ProgressPayload = parse(kind, data)?;
            DigitizerEvent::AnalysisProgress {
                job_id: payload.job_id,
                progress: clamp_percent(payload.progress),
            }
        }
        EventKind::AnalysisComplete => {
            let payload = parse_outcome(kind, data)?;
            DigitizerEvent::AnalysisComplete {
                job_id: payload.job_id,
            }
        }
        EventKind::AnalysisFailed => {
            let payload = parse_outcome(kind, data)?;
            DigitizerEvent::AnalysisFailed {
                job_id: payload.job_id,
                error: payload.error,
            }
        }
        EventKind::SplitProgress => {
            let payload: SplitProgressPayload = parse(kind, data)?;
            DigitizerEvent::SplitProgress {
                job_id: payload.job_id,
                progress: clamp_percent(payload.progress),
                current_scene: payload.current_scene,
            }
        }
        EventKind::SplitComplete => {
            let payload = parse_outcome(kind, data)?;
            DigitizerEvent::SplitComplete {
                job_id: payload.job_id,
            }
        }
        EventKind::SplitFailed => {
            let payload = parse_outcome(kind, data)?;
            DigitizerEvent::SplitFailed {
                job_id: payload.job_id,
                error: payload.error,
            }
        }
    };
    Ok(event)
}

/// `job_progress` carries two unrelated updates; the presence of an
/// `elapsed` key marks a capture update, anything else is rip progress.
fn decode_job_progress(data: Value) -> Result<DigitizerEvent, FrameDecodeError> {
    let kind = EventKind::JobProgress;
    let is_capture = data
        .as_object()
        .is_some_and(|fields| fields.contains_key("elapsed"));

    if is_capture {
        let payload: CaptureProgressPayload = parse(kind, data)?;
        return Ok(DigitizerEvent::CaptureProgress {
            job_id: payload.job_id,
            elapsed: payload.elapsed.filter(|e| e.is_finite()).unwrap_or(0.0),
            file_size: payload
                .file_size
                .filter(|size| size.is_finite() && *size > 0.0)
                .map(|size| size as u64)
                .unwrap_or(0),
        });
    }

    let payload: RipProgressPayload = parse(kind, data)?;
    let progress = payload.progress.ok_or(FrameDecodeError::MissingField {
        event: kind,
        field: "progress",
    })?;
    Ok(DigitizerEvent::RipProgress {
        job_id: payload.job_id,
        progress: clamp_percent(progress),
    })
}

fn parse<T: DeserializeOwned>(
    event: EventKind,
    data: Value,
) -> Result<T, FrameDecodeError> {
    serde_json::from_value(data)
        .map_err(|source| FrameDecodeError::Payload { event, source })
}

/// Completion frames may arrive with no payload at all.
fn parse_outcome(
    event: EventKind,
    data: Value,
) -> Result<OutcomePayload, FrameDecodeError> {
    if data.is_null() {
        return Ok(OutcomePayload::default());
    }
    parse(event, data)
}

fn clamp_percent(value: f64) -> u8 {
    if !value.is_finite() {
        return 0;
    }
    value.round().clamp(0.0, 100.0) as u8
}
