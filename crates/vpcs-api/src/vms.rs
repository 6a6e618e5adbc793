// VPCS VM endpoints
//
// Lifecycle (create/update/delete/start/stop/reload), state reads,
// UDP endpoint allocation, and per-port NIO attachment.

use tracing::debug;

use crate::client::VpcsClient;
use crate::error::Error;
use crate::models::{Nio, UdpPortAllocation, VmParams};

impl VpcsClient {
    /// Create a VPCS VM.
    ///
    /// `POST /vpcs/vms` — the body carries the requested settings; the
    /// response echoes the authoritative settings map including the
    /// assigned `vm_id` and server-filled defaults.
    pub async fn create_vm(&self, params: &VmParams) -> Result<VmParams, Error> {
        let url = self.api_url("vpcs/vms")?;
        self.post(url, params).await
    }

    /// Fetch the full state of a VM.
    ///
    /// `GET /vpcs/vms/{vm_id}`
    pub async fn get_vm(&self, vm_id: &str) -> Result<VmParams, Error> {
        let url = self.api_url(&format!("vpcs/vms/{vm_id}"))?;
        self.get(url).await
    }

    /// Update VM settings.
    ///
    /// `PUT /vpcs/vms/{vm_id}` — send only the changed keys; the
    /// response carries the keys the server actually applied.
    pub async fn update_vm(&self, vm_id: &str, params: &VmParams) -> Result<VmParams, Error> {
        let url = self.api_url(&format!("vpcs/vms/{vm_id}"))?;
        self.put(url, params).await
    }

    /// Delete a VM.
    ///
    /// `DELETE /vpcs/vms/{vm_id}`
    pub async fn delete_vm(&self, vm_id: &str) -> Result<(), Error> {
        let url = self.api_url(&format!("vpcs/vms/{vm_id}"))?;
        self.delete(url).await
    }

    /// Start a VM process.
    ///
    /// `POST /vpcs/vms/{vm_id}/start`
    pub async fn start_vm(&self, vm_id: &str) -> Result<(), Error> {
        let url = self.api_url(&format!("vpcs/vms/{vm_id}/start"))?;
        debug!(vm_id, "starting VM");
        self.post_empty(url).await
    }

    /// Stop a VM process.
    ///
    /// `POST /vpcs/vms/{vm_id}/stop`
    pub async fn stop_vm(&self, vm_id: &str) -> Result<(), Error> {
        let url = self.api_url(&format!("vpcs/vms/{vm_id}/stop"))?;
        debug!(vm_id, "stopping VM");
        self.post_empty(url).await
    }

    /// Reload a VM process (stop + start on the server side).
    ///
    /// `POST /vpcs/vms/{vm_id}/reload`
    pub async fn reload_vm(&self, vm_id: &str) -> Result<(), Error> {
        let url = self.api_url(&format!("vpcs/vms/{vm_id}/reload"))?;
        debug!(vm_id, "reloading VM");
        self.post_empty(url).await
    }

    /// Allocate a UDP port on the server for data-plane wiring.
    ///
    /// `POST /ports/udp`
    pub async fn allocate_udp_port(&self) -> Result<UdpPortAllocation, Error> {
        let url = self.api_url("ports/udp")?;
        self.post_empty(url).await
    }

    /// Attach a NIO to a VM port.
    ///
    /// `POST /vpcs/vms/{vm_id}/ports/{port_number}/nio`
    pub async fn create_nio(
        &self,
        vm_id: &str,
        port_number: u32,
        nio: &Nio,
    ) -> Result<Nio, Error> {
        let url = self.api_url(&format!("vpcs/vms/{vm_id}/ports/{port_number}/nio"))?;
        debug!(vm_id, port_number, %nio, "attaching NIO");
        self.post(url, nio).await
    }

    /// Detach the NIO from a VM port.
    ///
    /// `DELETE /vpcs/vms/{vm_id}/ports/{port_number}/nio`
    pub async fn delete_nio(&self, vm_id: &str, port_number: u32) -> Result<(), Error> {
        let url = self.api_url(&format!("vpcs/vms/{vm_id}/ports/{port_number}/nio"))?;
        debug!(vm_id, port_number, "detaching NIO");
        self.delete(url).await
    }
}