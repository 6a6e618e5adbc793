// ── Device ports ──
//
// A VPCS device carries exactly one Ethernet port, number 0. The port
// mirrors the device's run state and remembers the NIO attached to it
// so the GUI can describe the wiring.

use serde::{Deserialize, Serialize};
use strum::Display;
use uuid::Uuid;

use vpcs_api::Nio;

/// Run state of a port, mirroring its device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
#[strum(serialize_all = "lowercase")]
pub enum PortStatus {
    #[default]
    Stopped,
    Started,
}

/// A single network port on a device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Port {
    id: Uuid,
    name: String,
    short_name: String,
    port_number: u32,
    status: PortStatus,
    nio: Option<Nio>,
}

impl Port {
    /// Create an Ethernet port, e.g. number 0 -> "Ethernet0" / "e0".
    pub fn ethernet(port_number: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: format!("Ethernet{port_number}"),
            short_name: format!("e{port_number}"),
            port_number,
            status: PortStatus::Stopped,
            nio: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn short_name(&self) -> &str {
        &self.short_name
    }

    pub fn port_number(&self) -> u32 {
        self.port_number
    }

    pub fn status(&self) -> PortStatus {
        self.status
    }

    /// A port is free until a NIO is attached to it.
    pub fn is_free(&self) -> bool {
        self.nio.is_none()
    }

    pub fn nio(&self) -> Option<&Nio> {
        self.nio.as_ref()
    }

    /// Human-readable description of the attachment, if any.
    pub fn description(&self) -> Option<String> {
        self.nio.as_ref().map(|nio| format!("connected via {nio}"))
    }

    pub(crate) fn set_status(&mut self, status: PortStatus) {
        self.status = status;
    }

    pub(crate) fn attach_nio(&mut self, nio: Nio) {
        self.nio = Some(nio);
    }

    pub(crate) fn detach_nio(&mut self) {
        self.nio = None;
    }

    // Identity is rewritten when a saved topology is reloaded.
    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub(crate) fn set_id(&mut self, id: Uuid) {
        self.id = id;
    }

    /// Serializable record for topology files.
    pub fn dump(&self) -> PortRecord {
        PortRecord {
            id: self.id,
            name: self.name.clone(),
            port_number: self.port_number,
        }
    }
}

/// Persisted shape of a port inside a topology file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortRecord {
    pub id: Uuid,
    pub name: String,
    pub port_number: u32,
}
