use crate::job::JobId;

use serde::{Deserialize, Serialize};

/// One contiguous interval of a capture, in seconds.
///
/// `duration` is derived from the bounds and is kept in sync by every
/// constructor and mutator here; the server recomputes it on write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// Absent for scenes created locally that the server has not persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub job_id: JobId,
    pub scene_index: u32,
    pub start_time: f64,
    pub end_time: f64,
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub thumbnail_path: Option<String>,
    #[serde(default)]
    pub split_path: Option<String>,
}

impl Scene {
    pub fn new(
        job_id: JobId,
        scene_index: u32,
        start_time: f64,
        end_time: f64,
    ) -> Self {
        Self {
            id: None,
            job_id,
            scene_index,
            start_time,
            end_time,
            duration: end_time - start_time,
            thumbnail_path: None,
            split_path: None,
        }
    }

    /// Assign a server id, mostly useful for fixtures.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn set_bounds(&mut self, start_time: f64, end_time: f64) {
        self.start_time = start_time;
        self.end_time = end_time;
        self.recompute_duration();
    }

    pub fn recompute_duration(&mut self) {
        self.duration = self.end_time - self.start_time;
    }

    /// True when `t` lies inside the open interval `(start_time, end_time)`.
    pub fn strictly_contains(&self, t: f64) -> bool {
        self.start_time < t && t < self.end_time
    }

    /// File name of the thumbnail as served under `/api/thumbs/{job}/`.
    pub fn thumbnail_filename(&self) -> Option<&str> {
        self.thumbnail_path
            .as_deref()
            .and_then(|path| path.rsplit('/').next())
            .filter(|name| !name.is_empty())
    }

    pub fn is_split(&self) -> bool {
        self.split_path.is_some()
    }

    pub fn boundary(&self) -> SceneBoundary {
        SceneBoundary {
            scene_index: self.scene_index,
            start_time: self.start_time,
            end_time: self.end_time,
        }
    }
}

/// Row of the whole-list replace payload for `PUT /api/jobs/{id}/scenes`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SceneBoundary {
    pub scene_index: u32,
    pub start_time: f64,
    pub end_time: f64,
}
