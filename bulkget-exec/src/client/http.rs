use std::time::Duration;

use async_trait::async_trait;
use bulkget_core::{ClientError, Document, KeyValueClient};
use url::Url;

/// Reads documents from a REST endpoint: `GET {base_url}/{key}`.
///
/// A 200 response carries the JSON document and an optional `ETag` revision;
/// 404 means the key does not exist.
pub struct HttpClient {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpClient {
    pub fn new(base_url: Url) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("bulkget-exec/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ClientError::Other(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: with_trailing_slash(base_url),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// URL of the document for `key`. Keys `.` and `..` are rejected since URL
    /// resolution would turn them into the collection or its parent.
    pub fn document_url(&self, key: &str) -> Result<Url, ClientError> {
        if key == "." || key == ".." {
            return Err(ClientError::Other(format!(
                "key {key:?} cannot be addressed as a URL path segment"
            )));
        }
        self.base_url
            .join(&urlencoding::encode(key))
            .map_err(|e| ClientError::Other(format!("invalid document url for {key}: {e}")))
    }
}

#[async_trait]
impl KeyValueClient for HttpClient {
    async fn get(&self, key: &str, timeout: Duration) -> Result<Document, ClientError> {
        let url = self.document_url(key)?;
        let resp = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .timeout(timeout)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound);
        }
        if status.is_server_error() {
            return Err(ClientError::Connection(format!("server returned {status}")));
        }
        if !status.is_success() {
            return Err(ClientError::Other(format!("unexpected status {status}")));
        }

        let revision = resp
            .headers()
            .get(reqwest::header::ETAG)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.trim_start_matches("W/").trim_matches('"').to_string());
        let value: serde_json::Value = resp.json().await.map_err(map_reqwest_error)?;

        Ok(Document { value, revision })
    }
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn map_reqwest_error(e: reqwest::Error) -> ClientError {
    if e.is_timeout() {
        return ClientError::Timeout;
    }
    if e.is_connect() || e.is_request() {
        return ClientError::Connection(e.to_string());
    }
    ClientError::Other(e.to_string())
}
