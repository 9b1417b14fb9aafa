//! Editing session for one job's scene list.
//!
//! Every mutation is proposed locally by the [`SceneEditor`], sent as a
//! whole-list replace, and the server's answer replaces the working list.
//! A rejected write discards the candidate and reloads from the server.

use digitizer_core::scenes::{to_boundaries, validate_partition};
use digitizer_core::{
    BoundaryPolicy, LiveState, SceneEditError, SceneEditor, SplitProgress,
};
use digitizer_model::{AnalysisStatus, Job, JobId, Scene};
use tracing::{debug, info, warn};

use crate::infra::{DigitizerApi, RepositoryError};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Edit(#[from] SceneEditError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

pub type SessionResult<T> = Result<T, SessionError>;

/// Operator-visible flags for long-running work on the job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReviewFlags {
    pub analyzing: bool,
    pub splitting: bool,
    pub split_done: bool,
}

#[derive(Debug)]
pub struct SceneReviewSession<A> {
    api: A,
    editor: SceneEditor,
    job_id: JobId,
    job: Option<Job>,
    scenes: Vec<Scene>,
    flags: ReviewFlags,
    // Set once progress for this job has been observed, so a refresh is
    // only triggered by progress actually clearing.
    analysis_seen: bool,
    split_seen: bool,
}

impl<A: DigitizerApi> SceneReviewSession<A> {
    pub fn new(api: A, job_id: JobId) -> Self {
        Self::with_policy(api, job_id, BoundaryPolicy::default())
    }

    pub fn with_policy(api: A, job_id: JobId, policy: BoundaryPolicy) -> Self {
        Self {
            api,
            editor: SceneEditor::new(policy),
            job_id,
            job: None,
            scenes: Vec::new(),
            flags: ReviewFlags::default(),
            analysis_seen: false,
            split_seen: false,
        }
    }

    pub fn job_id(&self) -> &JobId {
        &self.job_id
    }

    pub fn job(&self) -> Option<&Job> {
        self.job.as_ref()
    }

    pub fn scenes(&self) -> &[Scene] {
        &self.scenes
    }

    pub fn flags(&self) -> ReviewFlags {
        self.flags
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Seconds covered by the job, 0 until loaded.
    pub fn total_duration(&self) -> f64 {
        self.job.as_ref().map_or(0.0, Job::duration)
    }

    /// Fetch the job and its scenes together and adopt both.
    pub async fn load(&mut self) -> SessionResult<()> {
        let (job, scenes) = tokio::try_join!(
            self.api.get_job(&self.job_id),
            self.api.get_scenes(&self.job_id),
        )?;

        // Work the server already reports as running counts as seen, so an
        // idle live state afterwards means it has finished.
        match job.analysis_status {
            Some(AnalysisStatus::Analyzing) => {
                self.flags.analyzing = true;
                self.analysis_seen = true;
            }
            Some(AnalysisStatus::Splitting) => {
                self.flags.splitting = true;
                self.split_seen = true;
            }
            Some(AnalysisStatus::SplitComplete) => self.flags.split_done = true,
            Some(AnalysisStatus::Analyzed) | None => {}
        }

        if let Err(err) = job.validate() {
            debug!(job = %self.job_id, error = %err, "inconsistent job record");
        }
        debug!(job = %self.job_id, scenes = scenes.len(), "loaded scene list");
        self.job = Some(job);
        self.adopt(scenes);
        Ok(())
    }

    pub async fn delete_scene(&mut self, index: usize) -> SessionResult<&[Scene]> {
        let candidate = self.editor.delete(&self.scenes, index)?;
        self.submit(candidate).await
    }

    pub async fn add_cut(&mut self, t: f64) -> SessionResult<&[Scene]> {
        let candidate = self.editor.add_cut(&self.scenes, t)?;
        self.submit(candidate).await
    }

    pub async fn adjust_scene(
        &mut self,
        index: usize,
        start_time: f64,
        end_time: f64,
    ) -> SessionResult<&[Scene]> {
        let candidate = self.editor.adjust_boundary(
            &self.scenes,
            index,
            start_time,
            end_time,
        )?;
        self.submit(candidate).await
    }

    /// Ask the backend to re-run scene detection.
    pub async fn reanalyze(&mut self) -> SessionResult<()> {
        self.flags.analyzing = true;
        self.flags.split_done = false;
        self.analysis_seen = false;
        match self.api.analyze_scenes(&self.job_id).await {
            Ok(ack) => {
                info!(job = %ack.job_id, status = %ack.status, "analysis requested");
                Ok(())
            }
            Err(err) => {
                self.flags.analyzing = false;
                Err(err.into())
            }
        }
    }

    /// Ask the backend to write one file per scene.
    pub async fn split(&mut self) -> SessionResult<()> {
        self.flags.splitting = true;
        self.flags.split_done = false;
        self.split_seen = false;
        match self.api.split_scenes(&self.job_id).await {
            Ok(ack) => {
                info!(
                    job = %ack.job_id,
                    scenes = ack.scene_count,
                    "split requested"
                );
                Ok(())
            }
            Err(err) => {
                self.flags.splitting = false;
                Err(err.into())
            }
        }
    }

    /// Fold a live snapshot into the flags. Returns true when analysis or
    /// split work on this job has finished and the session should reload.
    pub fn observe(&mut self, live: &LiveState) -> bool {
        if live.analysis_for(&self.job_id).is_some() {
            self.analysis_seen = true;
        }
        if live.split_for(&self.job_id).is_some() {
            self.split_seen = true;
        }

        let mut refresh = false;
        if self.flags.analyzing && self.analysis_seen && live.analysis.is_none()
        {
            self.flags.analyzing = false;
            self.analysis_seen = false;
            refresh = true;
        }
        if self.flags.splitting && self.split_seen && live.split.is_none() {
            self.flags.splitting = false;
            self.flags.split_done = true;
            self.split_seen = false;
            refresh = true;
        }
        refresh
    }

    /// [`observe`](Self::observe) and reload when it asks for it.
    pub async fn sync(&mut self, live: &LiveState) -> SessionResult<bool> {
        if !self.observe(live) {
            return Ok(false);
        }
        self.load().await?;
        Ok(true)
    }

    pub fn analysis_progress(&self, live: &LiveState) -> Option<u8> {
        live.analysis_for(&self.job_id).map(|a| a.progress)
    }

    pub fn split_progress<'a>(
        &self,
        live: &'a LiveState,
    ) -> Option<&'a SplitProgress> {
        live.split_for(&self.job_id)
    }

    pub fn thumbnail_url(&self, scene: &Scene) -> Option<String> {
        scene
            .thumbnail_filename()
            .map(|name| self.api.thumbnail_url(&self.job_id, name))
    }

    async fn submit(&mut self, candidate: Vec<Scene>) -> SessionResult<&[Scene]> {
        let rows = to_boundaries(&candidate);
        match self.api.replace_scenes(&self.job_id, &rows).await {
            Ok(canonical) => {
                self.adopt(canonical);
                Ok(&self.scenes)
            }
            Err(err) => {
                warn!(
                    job = %self.job_id,
                    error = %err,
                    "scene update rejected, reloading"
                );
                if let Err(reload) = self.load().await {
                    warn!(
                        job = %self.job_id,
                        error = %reload,
                        "reload after rejected update failed"
                    );
                }
                Err(err.into())
            }
        }
    }

    fn adopt(&mut self, scenes: Vec<Scene>) {
        let total = self.total_duration();
        if total > 0.0
            && let Err(violation) = validate_partition(&scenes, total)
        {
            debug!(
                job = %self.job_id,
                %violation,
                "server scene list is not a clean partition"
            );
        }
        self.scenes = scenes;
    }
}
