//! HTTP plumbing: the reqwest client, its error type and the service trait
//! built on top of it.

pub mod api_client;
pub mod error;
pub mod services;

pub use api_client::ApiClient;
pub use error::{RepositoryError, RepositoryResult};
pub use services::api::DigitizerApi;
