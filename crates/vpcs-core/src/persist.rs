// ── Topology persistence ──
//
// The serializable shape of a device inside a saved topology file.
// `dump()` produces one of these; `load()` consumes one. The `vpcs_id`
// alias accepts topologies written before the field was renamed.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use vpcs_api::VmParams;

use crate::error::CoreError;
use crate::port::PortRecord;
use crate::topology::NodeId;

/// Persisted shape of a VPCS device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Local topology object id.
    pub id: NodeId,
    /// Server-assigned VM id, when the device had one.
    #[serde(default, alias = "vpcs_id")]
    pub vm_id: Option<String>,
    /// Type tag so loaders can dispatch on node kind.
    #[serde(rename = "type")]
    pub node_type: String,
    /// Free-text description shown in the GUI.
    pub description: String,
    /// Settings that differ from the defaults snapshot.
    pub properties: VmParams,
    /// Which server hosts the VM.
    pub server_id: String,
    /// Port identities, matched back by port number on load.
    #[serde(default)]
    pub ports: Vec<PortRecord>,
}

impl NodeRecord {
    /// Decode a record from a topology-file JSON value.
    pub fn from_value(value: Value) -> Result<Self, CoreError> {
        serde_json::from_value(value).map_err(|e| CoreError::InvalidRecord(e.to_string()))
    }

    /// Encode this record as a topology-file JSON value.
    pub fn to_value(&self) -> Result<Value, CoreError> {
        serde_json::to_value(self).map_err(|e| CoreError::InvalidRecord(e.to_string()))
    }
}
