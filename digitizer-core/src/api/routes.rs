//! Backend route templates.

macro_rules! api_path {
    ($path:literal) => {
        concat!("/api", $path)
    };
}

/// Route definitions of the digitizer backend.
pub mod api {
    /// Optical drive state.
    pub const DRIVE: &str = api_path!("/drive");
    /// Read or update backend settings.
    pub const SETTINGS: &str = api_path!("/settings");
    /// Push channel endpoint (WebSocket upgrade).
    pub const EVENTS: &str = api_path!("/ws");

    /// Rip and capture jobs.
    pub mod jobs {
        /// Paged listing.
        pub const COLLECTION: &str = api_path!("/jobs");
        /// One job; `GET` and `DELETE`.
        pub const ITEM: &str = api_path!("/jobs/{id}");
        /// Start scene detection.
        pub const ANALYZE: &str = api_path!("/jobs/{id}/analyze");
        /// Scene list; `GET` and whole-list `PUT`.
        pub const SCENES: &str = api_path!("/jobs/{id}/scenes");
        /// Write one file per scene.
        pub const SPLIT: &str = api_path!("/jobs/{id}/split");
    }

    /// Tape capture control.
    pub mod capture {
        /// Current capture state.
        pub const STATUS: &str = api_path!("/capture/status");
        /// Begin recording into a new job.
        pub const START: &str = api_path!("/capture/start");
        /// Stop recording.
        pub const STOP: &str = api_path!("/capture/stop");
    }

    /// Scene thumbnails.
    pub mod thumbs {
        /// One thumbnail image.
        pub const ITEM: &str = api_path!("/thumbs/{job_id}/{filename}");
    }
}

/// Helper utilities for working with route templates
pub mod utils {
    /// Replace a single path parameter (e.g. `"{id}"`) with the provided value.
    pub fn replace_param(
        route: &str,
        param: &str,
        value: impl AsRef<str>,
    ) -> String {
        route.replace(param, value.as_ref())
    }

    /// Replace multiple path parameters in order.
    pub fn replace_params(
        route: &str,
        params: &[(impl AsRef<str>, impl AsRef<str>)],
    ) -> String {
        let mut path = route.to_string();
        for (param, value) in params {
            path = path.replace(param.as_ref(), value.as_ref());
        }
        path
    }

    /// Derive the push channel URL from the HTTP base URL
    /// (`http` → `ws`, `https` → `wss`).
    pub fn events_url(base_url: &str) -> String {
        let base = base_url.trim_end_matches('/');
        let ws_base = if let Some(rest) = base.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = base.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            format!("ws://{base}")
        };
        format!("{ws_base}{}", super::api::EVENTS)
    }
}

#[cfg(test)]
mod tests {
    use super::{api, utils};

    #[test]
    fn job_routes_substitute_id() {
        assert_eq!(
            utils::replace_param(api::jobs::SCENES, "{id}", "abc"),
            "/api/jobs/abc/scenes"
        );
        assert_eq!(
            utils::replace_params(
                api::thumbs::ITEM,
                &[("{job_id}", "abc"), ("{filename}", "scene_001.jpg")]
            ),
            "/api/thumbs/abc/scene_001.jpg"
        );
    }

    #[test]
    fn events_url_swaps_scheme() {
        assert_eq!(
            utils::events_url("http://localhost:8000/"),
            "ws://localhost:8000/api/ws"
        );
        assert_eq!(
            utils::events_url("https://digitizer.lan"),
            "wss://digitizer.lan/api/ws"
        );
    }
}
