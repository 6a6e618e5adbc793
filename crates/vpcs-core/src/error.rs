// ── Core error types ──
//
// User-facing errors from vpcs-core. Consumers never see raw HTTP
// status codes or JSON parse failures directly; the
// `From<vpcs_api::Error>` impl translates transport-layer errors into
// domain-appropriate variants. Device operations report most failures
// through the event channel instead (see `event::NodeEvent`), so this
// type covers the fallible setup and persistence surfaces.

use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach the simulation server at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    // ── Server errors ────────────────────────────────────────────────
    #[error("Server error: {message}")]
    Server {
        message: String,
        /// HTTP status code, when the server produced one.
        status: Option<u16>,
    },

    // ── Filesystem errors ────────────────────────────────────────────
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Persistence errors ───────────────────────────────────────────
    #[error("Invalid topology record: {0}")]
    InvalidRecord(String),

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<vpcs_api::Error> for CoreError {
    fn from(err: vpcs_api::Error) -> Self {
        match err {
            vpcs_api::Error::Server { message, status } => CoreError::Server {
                message,
                status: Some(status),
            },
            vpcs_api::Error::Transport(ref e) if e.is_connect() || e.is_timeout() => {
                CoreError::ConnectionFailed {
                    url: e
                        .url()
                        .map(|u| u.to_string())
                        .unwrap_or_else(|| "<unknown>".into()),
                    reason: e.to_string(),
                }
            }
            vpcs_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            other => CoreError::Server {
                message: other.message(),
                status: other.status(),
            },
        }
    }
}
