//! Backend operations behind a trait so sessions can be driven by a mock.

use std::fmt::Debug;

use async_trait::async_trait;
use digitizer_core::api::routes::{api, utils};
use digitizer_model::{
    AnalyzeAccepted, CaptureStarted, CaptureStatusResponse, Deleted,
    DriveState, Job, JobId, JobQuery, Scene, SceneBoundary, Settings,
    SettingsUpdate, SplitAccepted,
};

use crate::infra::api_client::ApiClient;
use crate::infra::error::RepositoryResult;

/// Request/response façade over the digitizer REST surface.
///
/// Triggers (analyze, split, capture) only acknowledge; their completion
/// arrives over the event channel.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DigitizerApi: Send + Sync + Debug {
    async fn list_jobs(&self, query: JobQuery) -> RepositoryResult<Vec<Job>>;

    async fn get_job(&self, id: &JobId) -> RepositoryResult<Job>;

    async fn delete_job(&self, id: &JobId) -> RepositoryResult<Deleted>;

    async fn get_settings(&self) -> RepositoryResult<Settings>;

    /// Only the fields present in `update` are changed server side.
    async fn update_settings(
        &self,
        update: &SettingsUpdate,
    ) -> RepositoryResult<Settings>;

    async fn get_drive(&self) -> RepositoryResult<DriveState>;

    async fn get_capture_status(&self) -> RepositoryResult<CaptureStatusResponse>;

    async fn start_capture(&self) -> RepositoryResult<CaptureStarted>;

    /// Returns the finished capture job.
    async fn stop_capture(&self) -> RepositoryResult<Job>;

    async fn analyze_scenes(&self, id: &JobId) -> RepositoryResult<AnalyzeAccepted>;

    async fn get_scenes(&self, id: &JobId) -> RepositoryResult<Vec<Scene>>;

    /// Whole-list replace. The returned list is canonical.
    async fn replace_scenes(
        &self,
        id: &JobId,
        scenes: &[SceneBoundary],
    ) -> RepositoryResult<Vec<Scene>>;

    async fn split_scenes(&self, id: &JobId) -> RepositoryResult<SplitAccepted>;

    fn thumbnail_url(&self, job_id: &JobId, filename: &str) -> String;

    async fn fetch_thumbnail(
        &self,
        job_id: &JobId,
        filename: &str,
    ) -> RepositoryResult<Vec<u8>>;
}

fn job_route(route: &str, id: &JobId) -> String {
    utils::replace_param(route, "{id}", id.as_str())
}

fn thumb_route(job_id: &JobId, filename: &str) -> String {
    utils::replace_params(
        api::thumbs::ITEM,
        &[("{job_id}", job_id.as_str()), ("{filename}", filename)],
    )
}

#[async_trait]
impl DigitizerApi for ApiClient {
    async fn list_jobs(&self, query: JobQuery) -> RepositoryResult<Vec<Job>> {
        self.get(api::jobs::COLLECTION, &query.query_pairs()).await
    }

    async fn get_job(&self, id: &JobId) -> RepositoryResult<Job> {
        self.get(&job_route(api::jobs::ITEM, id), &[]).await
    }

    async fn delete_job(&self, id: &JobId) -> RepositoryResult<Deleted> {
        self.delete(&job_route(api::jobs::ITEM, id)).await
    }

    async fn get_settings(&self) -> RepositoryResult<Settings> {
        self.get(api::SETTINGS, &[]).await
    }

    async fn update_settings(
        &self,
        update: &SettingsUpdate,
    ) -> RepositoryResult<Settings> {
        self.put(api::SETTINGS, update).await
    }

    async fn get_drive(&self) -> RepositoryResult<DriveState> {
        self.get(api::DRIVE, &[]).await
    }

    async fn get_capture_status(&self) -> RepositoryResult<CaptureStatusResponse> {
        self.get(api::capture::STATUS, &[]).await
    }

    async fn start_capture(&self) -> RepositoryResult<CaptureStarted> {
        self.post(api::capture::START).await
    }

    async fn stop_capture(&self) -> RepositoryResult<Job> {
        self.post(api::capture::STOP).await
    }

    async fn analyze_scenes(&self, id: &JobId) -> RepositoryResult<AnalyzeAccepted> {
        self.post(&job_route(api::jobs::ANALYZE, id)).await
    }

    async fn get_scenes(&self, id: &JobId) -> RepositoryResult<Vec<Scene>> {
        self.get(&job_route(api::jobs::SCENES, id), &[]).await
    }

    async fn replace_scenes(
        &self,
        id: &JobId,
        scenes: &[SceneBoundary],
    ) -> RepositoryResult<Vec<Scene>> {
        self.put(&job_route(api::jobs::SCENES, id), scenes).await
    }

    async fn split_scenes(&self, id: &JobId) -> RepositoryResult<SplitAccepted> {
        self.post(&job_route(api::jobs::SPLIT, id)).await
    }

    fn thumbnail_url(&self, job_id: &JobId, filename: &str) -> String {
        self.build_url(thumb_route(job_id, filename))
    }

    async fn fetch_thumbnail(
        &self,
        job_id: &JobId,
        filename: &str,
    ) -> RepositoryResult<Vec<u8>> {
        self.get_bytes(&thumb_route(job_id, filename)).await
    }
}
