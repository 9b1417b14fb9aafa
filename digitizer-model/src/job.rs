use crate::error::{ModelError, Result};

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque server-assigned job identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for JobId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    #[default]
    Dvd,
    Vhs,
}

impl SourceType {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceType::Dvd => "dvd",
            SourceType::Vhs => "vhs",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SourceType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dvd" => Ok(SourceType::Dvd),
            "vhs" => Ok(SourceType::Vhs),
            other => Err(ModelError::InvalidJob(format!(
                "unknown source type '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    #[default]
    Detected,
    Ripping,
    Complete,
    Failed,
}

impl JobStatus {
    /// Whether the job has reached a state the backend will not leave on its own.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Complete | JobStatus::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            JobStatus::Detected => "detected",
            JobStatus::Ripping => "ripping",
            JobStatus::Complete => "complete",
            JobStatus::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Post-processing state of a completed capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    Analyzing,
    Analyzed,
    Splitting,
    SplitComplete,
}

impl fmt::Display for AnalysisStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AnalysisStatus::Analyzing => "analyzing",
            AnalysisStatus::Analyzed => "analyzed",
            AnalysisStatus::Splitting => "splitting",
            AnalysisStatus::SplitComplete => "split_complete",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiscInfo {
    #[serde(default)]
    pub title_count: u32,
    #[serde(default = "default_main_title")]
    pub main_title: u32,
    /// Total length of the source in seconds.
    #[serde(default)]
    pub duration: f64,
}

fn default_main_title() -> u32 {
    1
}

impl Default for DiscInfo {
    fn default() -> Self {
        Self {
            title_count: 0,
            main_title: default_main_title(),
            duration: 0.0,
        }
    }
}

/// One rip or capture attempt as reported by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    #[serde(default)]
    pub source_type: SourceType,
    #[serde(default)]
    pub disc_info: DiscInfo,
    #[serde(default)]
    pub status: JobStatus,
    /// 0–100, only meaningful while ripping.
    #[serde(default)]
    pub progress: u8,
    #[serde(default)]
    pub output_path: Option<String>,
    #[serde(default)]
    pub file_size: Option<u64>,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub completed_at: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_status: Option<AnalysisStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scene_count: Option<u32>,
}

impl Job {
    /// Duration of the captured source in seconds.
    pub fn duration(&self) -> f64 {
        self.disc_info.duration
    }

    pub fn is_vhs(&self) -> bool {
        self.source_type == SourceType::Vhs
    }

    /// Scene analysis is only offered for finished tape captures.
    pub fn can_analyze(&self) -> bool {
        self.is_vhs() && self.status == JobStatus::Complete
    }

    pub fn started_at_utc(&self) -> Option<Result<DateTime<Utc>>> {
        self.started_at.as_deref().map(parse_backend_timestamp)
    }

    pub fn completed_at_utc(&self) -> Option<Result<DateTime<Utc>>> {
        self.completed_at.as_deref().map(parse_backend_timestamp)
    }

    /// Check the cross-field invariants the backend is expected to uphold.
    pub fn validate(&self) -> Result<()> {
        if self.progress > 100 {
            return Err(ModelError::InvalidJob(format!(
                "job {} progress {} exceeds 100",
                self.id, self.progress
            )));
        }
        if self.error.is_some() && self.status != JobStatus::Failed {
            return Err(ModelError::InvalidJob(format!(
                "job {} carries an error but is {}",
                self.id, self.status
            )));
        }
        if let Some(analysis) = self.analysis_status
            && !self.can_analyze()
        {
            return Err(ModelError::InvalidJob(format!(
                "job {} is {} {} but reports analysis status {}",
                self.id, self.source_type, self.status, analysis
            )));
        }
        Ok(())
    }
}

/// Parse the timestamp formats the backend emits: RFC 3339 from the job
/// manager and the bare `YYYY-MM-DD HH:MM:SS` SQLite default.
pub fn parse_backend_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    let trimmed = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(naive.and_utc());
        }
    }
    Err(ModelError::InvalidTimestamp(raw.to_string()))
}

/// Paging and filtering for the job listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobQuery {
    pub limit: u32,
    pub offset: u32,
    pub source_type: Option<SourceType>,
}

impl Default for JobQuery {
    fn default() -> Self {
        Self {
            limit: 10,
            offset: 0,
            source_type: None,
        }
    }
}

impl JobQuery {
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_source(mut self, source_type: SourceType) -> Self {
        self.source_type = Some(source_type);
        self
    }

    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("limit", self.limit.to_string()),
            ("offset", self.offset.to_string()),
        ];
        if let Some(source) = self.source_type {
            pairs.push(("source_type", source.as_str().to_string()));
        }
        pairs
    }
}

/// Acknowledgement for `POST /api/jobs/{id}/analyze`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzeAccepted {
    pub status: String,
    pub job_id: JobId,
}

/// Acknowledgement for `POST /api/jobs/{id}/split`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitAccepted {
    pub status: String,
    pub job_id: JobId,
    #[serde(default)]
    pub scene_count: u32,
}

/// Acknowledgement for `DELETE /api/jobs/{id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deleted {
    pub deleted: bool,
}
