//! Main ZeroGallery client and the request path every operation goes through.

use crate::error::{GalleryError, Result};
use crate::types::GalleryConfig;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Header carrying the access token on every request.
pub const ACCESS_TOKEN_HEADER: &str = "X-Access-Token";

/// Client for a ZeroGallery server.
///
/// Cloning is cheap: clones share the HTTP transport and the access token, so
/// a token change made through one clone applies to all of them.
///
/// # Example
///
/// ```ignore
/// use zero_gallery_client::{GalleryClient, GalleryConfig};
///
/// let client = GalleryClient::new(GalleryConfig::with_token(
///     "http://localhost:5000",
///     "secret",
/// ))?;
///
/// println!("API version {}", client.get_version().await?);
/// for album in client.get_albums().await? {
///     println!("{} ({})", album.name, album.id);
/// }
/// ```
#[derive(Clone)]
pub struct GalleryClient {
    http: Client,
    base_url: Arc<str>,
    access_token: Arc<RwLock<Option<String>>>,
}

impl GalleryClient {
    /// Create a new client with the given configuration.
    pub fn new(config: GalleryConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("ZeroGalleryClient/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Self::with_http_client(config, http)
    }

    /// Create a client on top of an existing transport.
    ///
    /// `config.timeout` is ignored; the transport's own settings apply.
    pub fn with_http_client(config: GalleryConfig, http: Client) -> Result<Self> {
        let base_url = normalize_url(&config.base_url)?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            access_token: Arc::new(RwLock::new(non_empty(config.access_token))),
        })
    }

    /// Service root without trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Current access token.
    pub async fn access_token(&self) -> Option<String> {
        self.access_token.read().await.clone()
    }

    /// Replace the access token for subsequent requests.
    ///
    /// Requests already sent keep the token they were built with.
    pub async fn set_access_token(&self, token: Option<String>) {
        *self.access_token.write().await = non_empty(token);
    }

    /// Get the server's API version string.
    pub async fn get_version(&self) -> Result<String> {
        let endpoint = "api/version";
        let response = self.execute(self.request(Method::GET, endpoint).await, endpoint).await?;

        Ok(response.text().await?)
    }

    pub(crate) fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint)
    }

    /// Start a request to `endpoint` with the access token attached.
    pub(crate) async fn request(&self, method: Method, endpoint: &str) -> RequestBuilder {
        let url = self.url(endpoint);
        debug!(method = %method, url = %url, "Building request");

        let builder = self.http.request(method, url);
        match self.access_token.read().await.as_deref() {
            Some(token) => builder.header(ACCESS_TOKEN_HEADER, token),
            None => builder,
        }
    }

    /// Dispatch without looking at the status.
    pub(crate) async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        Ok(builder.send().await?)
    }

    /// Dispatch and map error statuses onto [`GalleryError`].
    pub(crate) async fn execute(
        &self,
        builder: RequestBuilder,
        endpoint: &str,
    ) -> Result<Response> {
        let response = self.send(builder).await?;
        check_status(response, endpoint).await
    }

    /// Dispatch and decode a JSON body.
    pub(crate) async fn execute_json<T>(&self, builder: RequestBuilder, endpoint: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let response = self.execute(builder, endpoint).await?;
        decode_json(response, endpoint).await
    }
}

impl std::fmt::Debug for GalleryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GalleryClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

/// Map 401, 404 and other error statuses; pass everything below 400 through.
pub(crate) async fn check_status(response: Response, endpoint: &str) -> Result<Response> {
    let status = response.status();

    if status == StatusCode::UNAUTHORIZED {
        warn!(endpoint = %endpoint, "Request rejected: unauthorized");
        return Err(GalleryError::Unauthorized);
    }

    if status == StatusCode::NOT_FOUND {
        return Err(GalleryError::NotFound {
            endpoint: endpoint.to_string(),
        });
    }

    if status.is_client_error() || status.is_server_error() {
        let body = response.text().await.unwrap_or_default();
        warn!(endpoint = %endpoint, status = %status, body = %body, "API error");
        return Err(GalleryError::Api {
            status: status.as_u16(),
            body,
        });
    }

    Ok(response)
}

pub(crate) async fn decode_json<T>(response: Response, endpoint: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|e| {
        GalleryError::Parse(format!("Failed to parse {} response: {}", endpoint, e))
    })
}

fn normalize_url(url: &str) -> Result<String> {
    if url.is_empty() {
        return Err(GalleryError::InvalidUrl("URL cannot be empty".into()));
    }

    let url = url.trim_end_matches('/');
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(GalleryError::InvalidUrl(
            "URL must start with http:// or https://".into(),
        ));
    }

    Ok(url.to_string())
}

fn non_empty(token: Option<String>) -> Option<String> {
    token.filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_validation() {
        // Valid URLs
        assert!(GalleryClient::new(GalleryConfig::new("https://example.com")).is_ok());
        assert!(GalleryClient::new(GalleryConfig::new("http://localhost:5000")).is_ok());

        // Invalid URLs
        assert!(GalleryClient::new(GalleryConfig::new("")).is_err());
        assert!(GalleryClient::new(GalleryConfig::new("not-a-url")).is_err());
        assert!(GalleryClient::new(GalleryConfig::new("ftp://example.com")).is_err());
    }

    #[test]
    fn test_url_normalization() {
        let client =
            GalleryClient::new(GalleryConfig::new("https://example.com//")).expect("valid url");

        assert_eq!(client.base_url(), "https://example.com");
        assert_eq!(client.url("api/albums"), "https://example.com/api/albums");
    }

    #[tokio::test]
    async fn test_empty_token_means_no_token() {
        let client =
            GalleryClient::new(GalleryConfig::with_token("http://localhost:5000", "")).unwrap();
        assert!(client.access_token().await.is_none());

        client.set_access_token(Some("abc".into())).await;
        assert_eq!(client.access_token().await.as_deref(), Some("abc"));

        client.set_access_token(Some(String::new())).await;
        assert!(client.access_token().await.is_none());
    }

    #[tokio::test]
    async fn test_clones_share_token() {
        let client = GalleryClient::new(GalleryConfig::new("http://localhost:5000")).unwrap();
        let clone = client.clone();

        clone.set_access_token(Some("shared".into())).await;
        assert_eq!(client.access_token().await.as_deref(), Some("shared"));
    }
}
