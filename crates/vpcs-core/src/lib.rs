// vpcs-core: device proxy layer between vpcs-api and consumers (GUI/topology).

pub mod config;
pub mod device;
pub mod error;
pub mod event;
pub mod persist;
pub mod port;
pub mod settings;
pub mod topology;
pub mod util;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{Project, ServerConfig};
pub use device::{NodeContext, NodeStatus, VpcsDevice};
pub use error::CoreError;
pub use event::{NodeEvent, NodeEvents};
pub use persist::NodeRecord;
pub use port::{Port, PortRecord, PortStatus};
pub use topology::{NameAllocator, NodeId, NodeRegistry};
