use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, info, warn};

use crate::infra::error::{RepositoryError, RepositoryResult};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Thin JSON client for the digitizer backend.
///
/// Each call is a single attempt; there is no retry layer here.
#[derive(Clone)]
pub struct ApiClient {
    pub(crate) client: Client,
    base_url: String,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Accept `host:port` as well as full URLs and drop trailing slashes so
/// joined paths never carry `//`.
pub(crate) fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    let with_scheme =
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            trimmed.to_string()
        } else {
            format!("http://{trimmed}")
        };
    if with_scheme != raw {
        debug!(from = raw, to = %with_scheme, "normalized base URL");
    }
    with_scheme
}

impl ApiClient {
    pub fn new(base_url: impl AsRef<str>) -> Self {
        Self::with_timeout(base_url, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl AsRef<str>, timeout: Duration) -> Self {
        let base_url = normalize_base_url(base_url.as_ref());
        // The builder only fails when the TLS backend cannot initialise; the
        // default client is still usable for plain HTTP backends.
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|err| {
                warn!(error = %err, "falling back to default HTTP client");
                Client::new()
            });

        info!(%base_url, ?timeout, "creating API client");
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_url(&self, path: impl AsRef<str>) -> String {
        let path = path.as_ref();
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Send `request` and decode a JSON body, mapping non-2xx answers to
    /// [`RepositoryError::Status`].
    async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> RepositoryResult<T> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = RepositoryError::from_status(status, &body);
            warn!(status = status.as_u16(), body = %body, "request rejected");
            return Err(err);
        }
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> RepositoryResult<T> {
        let url = self.build_url(path);
        debug!(%url, "GET");
        self.execute(self.client.get(&url).query(query)).await
    }

    pub async fn get_bytes(&self, path: &str) -> RepositoryResult<Vec<u8>> {
        let url = self.build_url(path);
        debug!(%url, "GET (bytes)");
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RepositoryError::from_status(status, &body));
        }
        Ok(response.bytes().await?.to_vec())
    }

    pub async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> RepositoryResult<T> {
        let url = self.build_url(path);
        debug!(%url, "POST");
        self.execute(self.client.post(&url)).await
    }

    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> RepositoryResult<T> {
        let url = self.build_url(path);
        debug!(%url, "PUT");
        self.execute(self.client.put(&url).json(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> RepositoryResult<T> {
        let url = self.build_url(path);
        debug!(%url, "DELETE");
        self.execute(self.client.delete(&url)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gains_scheme_and_loses_slash() {
        assert_eq!(normalize_base_url("localhost:8000/"), "http://localhost:8000");
        assert_eq!(
            normalize_base_url(" https://digitizer.lan "),
            "https://digitizer.lan"
        );
    }

    #[test]
    fn build_url_joins_paths() {
        let client = ApiClient::new("http://127.0.0.1:8000/");
        assert_eq!(
            client.build_url("/api/jobs"),
            "http://127.0.0.1:8000/api/jobs"
        );
        assert_eq!(
            client.build_url("http://elsewhere/x"),
            "http://elsewhere/x"
        );
    }
}
