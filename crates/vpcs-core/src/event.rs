// ── Node event channel ──
//
// Devices publish state changes through a typed broadcast channel.
// The GUI and the topology/link manager each hold a receiver; a send
// with no subscribers is not an error.

use tokio::sync::broadcast;
use uuid::Uuid;

use crate::topology::NodeId;

const EVENT_CHANNEL_SIZE: usize = 256;

/// Everything a device announces to its observers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeEvent {
    /// The device finished its create round-trip and is initialized.
    Created { node_id: NodeId },
    /// Local settings were reconciled against a server response.
    Updated { node_id: NodeId },
    /// The device was removed (locally, whatever the server said).
    Deleted { node_id: NodeId },
    Started { node_id: NodeId },
    Stopped { node_id: NodeId },
    /// Emitted before deletion so connected links can tear down first.
    LinksDetaching { node_id: NodeId },
    NioAttached { node_id: NodeId, port_id: Uuid },
    /// A NIO attach failed server-side; the caller should roll back
    /// any partial wiring.
    NioAttachCancelled { node_id: NodeId },
    /// A UDP endpoint was allocated for the given port; consumed by
    /// the data-plane wiring component.
    UdpPortAllocated {
        node_id: NodeId,
        port_id: Uuid,
        udp_port: u16,
    },
    /// Local precondition failure (name unavailable, file missing, …).
    Error { node_id: NodeId, message: String },
    /// The server rejected a request.
    ServerError {
        node_id: NodeId,
        status: Option<u16>,
        message: String,
    },
    Warning { node_id: NodeId, message: String },
}

/// Cloneable handle to the node event channel.
#[derive(Debug, Clone)]
pub struct NodeEvents {
    tx: broadcast::Sender<NodeEvent>,
}

impl NodeEvents {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CHANNEL_SIZE);
        Self { tx }
    }

    /// Subscribe to the event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<NodeEvent> {
        self.tx.subscribe()
    }

    /// Publish an event. Dropped silently when nobody is listening.
    pub fn emit(&self, event: NodeEvent) {
        let _ = self.tx.send(event);
    }
}

impl Default for NodeEvents {
    fn default() -> Self {
        Self::new()
    }
}
