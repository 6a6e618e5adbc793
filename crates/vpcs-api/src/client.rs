// VPCS API HTTP client
//
// Wraps `reqwest::Client` with server-relative URL construction and
// error-envelope handling. The endpoint methods live in vms.rs as
// inherent impls to keep this module focused on transport mechanics.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::ServerErrorBody;
use crate::transport::TransportConfig;

/// Raw HTTP client for the simulation server's VPCS endpoints.
///
/// Non-2xx responses carry a `{ "message": …, "status": … }` body which
/// is parsed into [`Error::Server`] before the caller sees it. A body
/// that fails to parse falls back to the raw text so nothing is lost.
pub struct VpcsClient {
    http: reqwest::Client,
    base_url: Url,
    server_id: String,
}

impl VpcsClient {
    /// Create a new client from a [`TransportConfig`].
    ///
    /// `base_url` is the server root, e.g. `http://127.0.0.1:8000`.
    /// `server_id` identifies this server inside saved topologies.
    pub fn new(
        base_url: Url,
        server_id: impl Into<String>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url,
            server_id: server_id.into(),
        })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url, server_id: impl Into<String>) -> Self {
        Self {
            http,
            base_url,
            server_id: server_id.into(),
        }
    }

    /// The server identifier recorded in topology files.
    pub fn server_id(&self) -> &str {
        &self.server_id
    }

    /// The server base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build a full URL for an API path, e.g. `vpcs/vms/{id}/start`.
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        self.base_url.join(path).map_err(Error::InvalidUrl)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and decode the response.
    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);
        let resp = self.http.get(url).send().await.map_err(Error::Transport)?;
        self.parse_response(resp).await
    }

    /// Send a POST request with a JSON body and decode the response.
    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &impl Serialize,
    ) -> Result<T, Error> {
        debug!("POST {}", url);
        let resp = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(Error::Transport)?;
        self.parse_response(resp).await
    }

    /// Send a POST request with no body and decode the response.
    pub(crate) async fn post_empty<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("POST {}", url);
        let resp = self.http.post(url).send().await.map_err(Error::Transport)?;
        self.parse_response(resp).await
    }

    /// Send a PUT request with a JSON body and decode the response.
    pub(crate) async fn put<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &impl Serialize,
    ) -> Result<T, Error> {
        debug!("PUT {}", url);
        let resp = self
            .http
            .put(url)
            .json(body)
            .send()
            .await
            .map_err(Error::Transport)?;
        self.parse_response(resp).await
    }

    /// Send a DELETE request and decode the response.
    pub(crate) async fn delete<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("DELETE {}", url);
        let resp = self
            .http
            .delete(url)
            .send()
            .await
            .map_err(Error::Transport)?;
        self.parse_response(resp).await
    }

    /// Decode a response body, turning non-2xx statuses into
    /// [`Error::Server`].
    async fn parse_response<T: DeserializeOwned>(&self, resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();
        let body = resp.text().await.map_err(Error::Transport)?;

        if !status.is_success() {
            let (message, code) = match serde_json::from_str::<ServerErrorBody>(&body) {
                Ok(envelope) => (envelope.message, envelope.status),
                Err(_) if !body.is_empty() => (body, None),
                Err(_) => (status.to_string(), None),
            };
            return Err(Error::Server {
                message,
                status: code.unwrap_or(status.as_u16()),
            });
        }

        // 204-style empty bodies decode as JSON null.
        let text = if body.is_empty() { "null" } else { &body };
        serde_json::from_str(text).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body,
        })
    }
}
