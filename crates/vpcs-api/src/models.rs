// Wire models for the VPCS endpoints.
//
// VM settings are deliberately kept as a dynamic JSON map: the server is
// authoritative for the key set and fills in defaults the client never
// enumerates. Typed structs exist only where the shape is fixed.

use serde::{Deserialize, Serialize};

/// A VM settings/parameters payload.
///
/// Used both for requests (create/update bodies) and responses (the
/// server echoes the full authoritative settings map back).
pub type VmParams = serde_json::Map<String, serde_json::Value>;

/// Error body returned by the server on non-2xx responses.
#[derive(Debug, Deserialize)]
pub(crate) struct ServerErrorBody {
    pub message: String,
    #[serde(default)]
    pub status: Option<u16>,
}

/// Response to a UDP port allocation request.
#[derive(Debug, Clone, Deserialize)]
pub struct UdpPortAllocation {
    pub udp_port: u16,
}

/// A network I/O attachment descriptor.
///
/// Connects a virtual port to an underlying packet transport. The
/// server dispatches on the `type` tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Nio {
    /// UDP tunnel: local port plus the remote endpoint.
    #[serde(rename = "nio_udp")]
    Udp {
        lport: u16,
        rhost: String,
        rport: u16,
    },
    /// Host TAP interface.
    #[serde(rename = "nio_tap")]
    Tap { tap_device: String },
}

impl std::fmt::Display for Nio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Udp { lport, rhost, rport } => {
                write!(f, "NIO_UDP: {lport} -> {rhost}:{rport}")
            }
            Self::Tap { tap_device } => write!(f, "NIO_TAP: {tap_device}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nio_udp_serializes_with_type_tag() {
        let nio = Nio::Udp {
            lport: 10000,
            rhost: "127.0.0.1".into(),
            rport: 10001,
        };
        let value = serde_json::to_value(&nio).expect("serializable");
        assert_eq!(value["type"], "nio_udp");
        assert_eq!(value["lport"], 10000);
        assert_eq!(value["rhost"], "127.0.0.1");
        assert_eq!(value["rport"], 10001);
    }

    #[test]
    fn nio_tap_round_trips() {
        let json = r#"{"type":"nio_tap","tap_device":"tap0"}"#;
        let nio: Nio = serde_json::from_str(json).expect("deserializable");
        assert_eq!(
            nio,
            Nio::Tap {
                tap_device: "tap0".into()
            }
        );
    }
}
