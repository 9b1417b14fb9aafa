pub mod scene_review;

pub use scene_review::{
    ReviewFlags, SceneReviewSession, SessionError, SessionResult,
};
