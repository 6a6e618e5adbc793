// ── Runtime connection configuration ──
//
// These types describe *how* to reach a simulation server and *which*
// project the devices belong to. The GUI constructs a `ServerConfig`
// and hands it in — core never reads config files.

use std::time::Duration;

use url::Url;
use uuid::Uuid;

use vpcs_api::{TransportConfig, VpcsClient};

use crate::error::CoreError;

/// The project a device belongs to. Every create request is scoped to
/// a project so the server can group VM working directories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Project {
    pub id: Uuid,
}

impl Project {
    pub fn new() -> Self {
        Self { id: Uuid::new_v4() }
    }

    pub fn with_id(id: Uuid) -> Self {
        Self { id }
    }
}

impl Default for Project {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration for connecting to a single simulation server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server URL (e.g., `http://127.0.0.1:8000`).
    pub url: Url,
    /// Identifier recorded for this server in saved topologies.
    pub server_id: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl ServerConfig {
    pub fn new(url: Url, server_id: impl Into<String>) -> Self {
        Self {
            url,
            server_id: server_id.into(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Build a [`VpcsClient`] for this server.
    pub fn client(&self) -> Result<VpcsClient, CoreError> {
        let transport = TransportConfig {
            timeout: self.timeout,
            ..TransportConfig::default()
        };
        VpcsClient::new(self.url.clone(), self.server_id.clone(), &transport)
            .map_err(CoreError::from)
    }
}
