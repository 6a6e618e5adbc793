// ── VPCS device proxy ──
//
// Mirrors one simulated PC on the server: local settings, lifecycle
// state, and the single Ethernet port. Every remote interaction is an
// async request whose response is reconciled into local state before
// any event for that operation is published. Failures are reported
// through the event channel, not return values — the GUI treats the
// device as fire-and-observe.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use strum::Display;
use tracing::{debug, error, info};
use uuid::Uuid;

use vpcs_api::{Nio, VmParams, VpcsClient};

use crate::config::Project;
use crate::error::CoreError;
use crate::event::{NodeEvent, NodeEvents};
use crate::persist::NodeRecord;
use crate::port::{Port, PortStatus};
use crate::settings::{
    self, SETTING_CONSOLE, SETTING_NAME, SETTING_SCRIPT_FILE, SETTING_STARTUP_SCRIPT,
};
use crate::topology::{NameAllocator, NodeId, NodeRegistry};
use crate::util::normalize_filename;

/// Lifecycle state of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
#[strum(serialize_all = "lowercase")]
pub enum NodeStatus {
    #[default]
    Stopped,
    Started,
}

/// Shared collaborators every device is constructed with.
#[derive(Clone)]
pub struct NodeContext {
    pub client: Arc<VpcsClient>,
    pub allocator: Arc<NameAllocator>,
    pub registry: Arc<NodeRegistry>,
    pub events: NodeEvents,
    pub project: Project,
}

/// Proxy for one VPCS device on the simulation server.
pub struct VpcsDevice {
    id: NodeId,
    vm_id: Option<String>,
    settings: VmParams,
    defaults: VmParams,
    status: NodeStatus,
    ports: Vec<Port>,
    initialized: bool,
    loading: bool,
    pending_record: Option<NodeRecord>,
    ctx: NodeContext,
}

impl VpcsDevice {
    /// Create a new, un-initialized device.
    ///
    /// The device does not exist on the server until [`setup`](Self::setup)
    /// completes its create round-trip.
    pub fn new(ctx: NodeContext) -> Self {
        let id = ctx.registry.allocate_id();
        info!(%id, "VPCS device is being created");

        let settings = settings::default_settings();

        // VPCS devices have only one Ethernet port
        let port = Port::ethernet(0);
        debug!(port = port.name(), "port has been added");

        Self {
            id,
            vm_id: None,
            defaults: settings.clone(),
            settings,
            status: NodeStatus::Stopped,
            ports: vec![port],
            initialized: false,
            loading: false,
            pending_record: None,
            ctx,
        }
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The server-assigned VM id, once the create round-trip succeeded.
    pub fn vm_id(&self) -> Option<&str> {
        self.vm_id.as_deref()
    }

    pub fn name(&self) -> &str {
        self.settings
            .get(SETTING_NAME)
            .and_then(Value::as_str)
            .unwrap_or("")
    }

    /// The console TCP port, once assigned by the server.
    pub fn console(&self) -> Option<u64> {
        self.settings.get(SETTING_CONSOLE).and_then(Value::as_u64)
    }

    pub fn settings(&self) -> &VmParams {
        &self.settings
    }

    pub fn ports(&self) -> &[Port] {
        &self.ports
    }

    pub fn status(&self) -> NodeStatus {
        self.status
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Set up this device on the server.
    ///
    /// Allocates a name when none is given, folds a `script_file` path
    /// in `extra_settings` into `startup_script`, then issues the
    /// create request and reconciles the authoritative response.
    pub async fn setup(
        &mut self,
        name: Option<&str>,
        vm_id: Option<String>,
        mut extra_settings: VmParams,
    ) {
        // let's pick a unique name if none has been chosen
        let name = match name {
            Some(chosen) => {
                if !self.ctx.allocator.reserve(chosen) {
                    debug!(name = chosen, "name was already reserved");
                }
                chosen.to_owned()
            }
            None => match self.ctx.allocator.allocate_name("PC") {
                Some(allocated) => allocated,
                None => {
                    self.emit_error("could not allocate a name for this VPCS device");
                    return;
                }
            },
        };

        // A script file path is folded into the startup script; a read
        // failure loses the script but not the whole setup.
        if let Some(value) = extra_settings.remove(SETTING_SCRIPT_FILE) {
            if let Some(path) = value.as_str().filter(|p| !p.is_empty()) {
                match read_script(Path::new(path)) {
                    Ok(content) => {
                        extra_settings.insert(SETTING_STARTUP_SCRIPT.into(), content.into());
                    }
                    Err(e) => error!(path, error = %e, "could not load the script file"),
                }
            }
        }

        // An existing VM is authoritative for its own startup script.
        if vm_id.is_some() {
            extra_settings.remove(SETTING_STARTUP_SCRIPT);
        }

        let mut params = VmParams::new();
        params.insert(SETTING_NAME.into(), name.clone().into());
        params.insert("project_id".into(), self.ctx.project.id.to_string().into());
        if let Some(ref id) = vm_id {
            params.insert("vm_id".into(), id.clone().into());
        }
        params.append(&mut extra_settings);

        match self.ctx.client.create_vm(&params).await {
            Err(e) => {
                error!(name = %name, error = %e, "error while setting up the device");
                self.emit_server_error(&e);
            }
            Ok(result) => {
                if let Some(id) = result.get("vm_id").and_then(Value::as_str) {
                    self.vm_id = Some(id.to_owned());
                }
                // fold in the defaults the server decided on
                settings::reconcile(&mut self.settings, &result);

                if self.loading {
                    self.emit(NodeEvent::Updated { node_id: self.id });
                } else {
                    self.initialized = true;
                    info!(name = self.name(), "VPCS device has been created");
                    self.emit(NodeEvent::Created { node_id: self.id });
                    self.ctx.registry.add_node(self.id);
                }
            }
        }
    }

    /// Delete this device.
    ///
    /// Links are told to detach first; the remote delete is best-effort
    /// and local cleanup always completes, so the GUI never keeps an
    /// orphaned node around.
    pub async fn delete(&mut self) {
        debug!(name = self.name(), "VPCS device is being deleted");
        self.emit(NodeEvent::LinksDetaching { node_id: self.id });

        if let Some(vm_id) = self.vm_id.clone() {
            if let Err(e) = self.ctx.client.delete_vm(&vm_id).await {
                error!(name = self.name(), error = %e, "error while deleting the device");
                self.emit_server_error(&e);
            }
        }

        info!(name = self.name(), "VPCS device has been deleted");
        self.emit(NodeEvent::Deleted { node_id: self.id });
        self.ctx.registry.remove_node(self.id);
        self.ctx.allocator.release(self.name());
    }

    /// Update device settings.
    ///
    /// Only the keys that are recognized and actually changed are sent;
    /// the server's response is reconciled back, renaming the allocated
    /// name when it changed.
    pub async fn update(&mut self, new_settings: VmParams) {
        if let Some(new_name) = new_settings.get(SETTING_NAME).and_then(Value::as_str) {
            if new_name != self.name() && self.ctx.allocator.has_allocated_name(new_name) {
                self.emit_error(format!(
                    "Name \"{new_name}\" is already used by another node"
                ));
                return;
            }
        }

        let Some(vm_id) = self.vm_id.clone() else {
            debug!(name = self.name(), "device has no VM on the server, skipping update");
            return;
        };

        let changes = settings::diff(&self.settings, &new_settings);
        debug!(name = self.name(), changes = ?changes, "updating settings");

        match self.ctx.client.update_vm(&vm_id, &changes).await {
            Err(e) => {
                error!(name = self.name(), error = %e, "error while updating the device");
                self.emit_server_error(&e);
            }
            Ok(result) => {
                let old_name = self.name().to_owned();
                let changed = settings::reconcile(&mut self.settings, &result);

                if changed.iter().any(|key| key == SETTING_NAME) {
                    let new_name = self.name().to_owned();
                    self.ctx.allocator.update_allocated_name(&old_name, &new_name);
                }

                if !changed.is_empty() || self.loading {
                    info!(name = self.name(), "VPCS device has been updated");
                    self.emit(NodeEvent::Updated { node_id: self.id });
                }
            }
        }
    }

    /// Start the VM. No-op when already started.
    pub async fn start(&mut self) {
        if self.status == NodeStatus::Started {
            debug!(name = self.name(), "device is already running");
            return;
        }
        let Some(vm_id) = self.vm_id.clone() else {
            debug!(name = self.name(), "device has no VM on the server, cannot start");
            return;
        };

        debug!(name = self.name(), "device is starting");
        match self.ctx.client.start_vm(&vm_id).await {
            Err(e) => {
                error!(name = self.name(), error = %e, "error while starting the device");
                self.emit_server_error(&e);
            }
            Ok(()) => {
                info!(name = self.name(), "device has started");
                self.set_status(NodeStatus::Started, PortStatus::Started);
                self.emit(NodeEvent::Started { node_id: self.id });
            }
        }
    }

    /// Stop the VM. No-op when already stopped.
    pub async fn stop(&mut self) {
        if self.status == NodeStatus::Stopped {
            debug!(name = self.name(), "device is already stopped");
            return;
        }
        let Some(vm_id) = self.vm_id.clone() else {
            debug!(name = self.name(), "device has no VM on the server, cannot stop");
            return;
        };

        debug!(name = self.name(), "device is stopping");
        match self.ctx.client.stop_vm(&vm_id).await {
            Err(e) => {
                error!(name = self.name(), error = %e, "error while stopping the device");
                self.emit_server_error(&e);
            }
            Ok(()) => {
                info!(name = self.name(), "device has stopped");
                self.set_status(NodeStatus::Stopped, PortStatus::Stopped);
                self.emit(NodeEvent::Stopped { node_id: self.id });
            }
        }
    }

    /// Reload the VM.
    ///
    /// The outcome is only logged: the remote device re-establishes its
    /// own running state, so no local state changes and no event fires.
    pub async fn reload(&mut self) {
        let Some(vm_id) = self.vm_id.clone() else {
            debug!(name = self.name(), "device has no VM on the server, cannot reload");
            return;
        };

        debug!(name = self.name(), "device is being reloaded");
        match self.ctx.client.reload_vm(&vm_id).await {
            Err(e) => error!(name = self.name(), error = %e, "error while reloading the device"),
            Ok(()) => info!(name = self.name(), "device has reloaded"),
        }
    }

    // ── Data-plane wiring ────────────────────────────────────────────

    /// Ask the server for a UDP endpoint for the given port.
    ///
    /// Success is announced as [`NodeEvent::UdpPortAllocated`] for the
    /// data-plane wiring component to consume.
    pub async fn allocate_udp_port(&mut self, port_id: Uuid) {
        debug!(name = self.name(), "requesting a UDP port allocation");
        match self.ctx.client.allocate_udp_port().await {
            Err(e) => {
                error!(name = self.name(), error = %e, "error while allocating a UDP port");
                self.emit_server_error(&e);
            }
            Ok(allocation) => {
                debug!(
                    name = self.name(),
                    udp_port = allocation.udp_port,
                    "UDP port allocated"
                );
                self.emit(NodeEvent::UdpPortAllocated {
                    node_id: self.id,
                    port_id,
                    udp_port: allocation.udp_port,
                });
            }
        }
    }

    /// Attach a NIO to the device's single port.
    ///
    /// On failure both a server error and a cancel event fire so the
    /// caller can roll back partial wiring.
    pub async fn add_nio(&mut self, port_id: Uuid, nio: Nio) {
        let Some(vm_id) = self.vm_id.clone() else {
            debug!(name = self.name(), "device has no VM on the server, cannot attach a NIO");
            return;
        };

        debug!(name = self.name(), %nio, "adding a NIO");
        match self.ctx.client.create_nio(&vm_id, 0, &nio).await {
            Err(e) => {
                error!(name = self.name(), error = %e, "error while adding a NIO");
                self.emit_server_error(&e);
                self.emit(NodeEvent::NioAttachCancelled { node_id: self.id });
            }
            Ok(attached) => {
                if let Some(port) = self.ports.iter_mut().find(|p| p.id() == port_id) {
                    port.attach_nio(attached);
                }
                self.emit(NodeEvent::NioAttached {
                    node_id: self.id,
                    port_id,
                });
            }
        }
    }

    /// Detach the NIO from the device's single port.
    pub async fn delete_nio(&mut self) {
        let Some(vm_id) = self.vm_id.clone() else {
            debug!(name = self.name(), "device has no VM on the server, cannot detach a NIO");
            return;
        };

        debug!(name = self.name(), "deleting a NIO");
        match self.ctx.client.delete_nio(&vm_id, 0).await {
            Err(e) => {
                error!(name = self.name(), error = %e, "error while deleting a NIO");
                self.emit_server_error(&e);
            }
            Ok(()) => {
                debug!(name = self.name(), "NIO deleted");
                for port in &mut self.ports {
                    port.detach_nio();
                }
            }
        }
    }

    // ── Config import/export ─────────────────────────────────────────

    /// Export the startup script to an explicit path.
    pub async fn export_config(&mut self, path: &Path) {
        let Some(vm_id) = self.vm_id.clone() else {
            debug!(name = self.name(), "device has no VM on the server, cannot export");
            return;
        };

        match self.ctx.client.get_vm(&vm_id).await {
            Err(e) => {
                error!(name = self.name(), error = %e, "error while exporting the config");
                self.emit_server_error(&e);
            }
            Ok(state) => {
                if let Some(script) = state.get(SETTING_STARTUP_SCRIPT).and_then(Value::as_str) {
                    info!(name = self.name(), path = %path.display(), "saving the script file");
                    if let Err(e) = write_script(path, script) {
                        self.emit_error(format!("could not export the script file: {e}"));
                    }
                }
            }
        }
    }

    /// Export the startup script to `{dir}/{name}_startup.vpc`.
    pub async fn export_config_to_directory(&mut self, dir: &Path) {
        let path = self.script_path_in(dir);
        self.export_config(&path).await;
    }

    /// Import a startup script from an explicit path and push it to the
    /// server via [`update`](Self::update).
    pub async fn import_config(&mut self, path: &Path) {
        let content = match read_script(path) {
            Ok(content) => content,
            Err(e) => {
                self.emit_error(format!("could not read the script file: {e}"));
                return;
            }
        };

        let mut new_settings = VmParams::new();
        new_settings.insert(SETTING_STARTUP_SCRIPT.into(), content.into());
        self.update(new_settings).await;
    }

    /// Import a startup script from `{dir}/{name}_startup.vpc`.
    ///
    /// A missing file is a warning, not an error — the device keeps its
    /// current script and no update is issued.
    pub async fn import_config_from_directory(&mut self, dir: &Path) {
        let file_name = format!("{}_startup.vpc", normalize_filename(self.name()));
        let path = dir.join(&file_name);
        if !path.is_file() {
            self.emit(NodeEvent::Warning {
                node_id: self.id,
                message: format!(
                    "no script file could be found, expected file name: {file_name}"
                ),
            });
            return;
        }
        self.import_config(&path).await;
    }

    // ── Topology persistence ─────────────────────────────────────────

    /// Serializable representation for topology files. Only settings
    /// differing from the defaults snapshot are persisted.
    pub fn dump(&self) -> NodeRecord {
        let mut properties = VmParams::new();
        for (key, value) in &self.settings {
            if let Some(default) = self.defaults.get(key) {
                if default != value {
                    properties.insert(key.clone(), value.clone());
                }
            }
        }

        NodeRecord {
            id: self.id,
            vm_id: self.vm_id.clone(),
            node_type: "VpcsDevice".into(),
            description: "VPCS device".into(),
            properties,
            server_id: self.ctx.client.server_id().to_owned(),
            ports: self.ports.iter().map(Port::dump).collect(),
        }
    }

    /// Restore this device from a topology record.
    ///
    /// Phase one runs `setup` with the saved settings (emitting
    /// `Updated` once reconciled); phase two — only reached when the
    /// create round-trip succeeded — matches port identities against
    /// the saved port list, marks the device initialized, and announces
    /// creation. Port identity is only meaningful once the local port
    /// set exists, hence the two steps.
    pub async fn load(&mut self, record: NodeRecord) {
        let vm_id = record.vm_id.clone();
        let mut saved_settings = record.properties.clone();
        let name = saved_settings
            .remove(SETTING_NAME)
            .and_then(|v| v.as_str().map(str::to_owned));

        info!(name = ?name, "VPCS device is loading");
        self.loading = true;
        self.pending_record = Some(record);

        self.setup(name.as_deref(), vm_id, saved_settings).await;

        if self.vm_id.is_some() {
            self.update_port_settings();
        } else {
            // setup failed; stay un-initialized
            self.pending_record = None;
            self.loading = false;
        }
    }

    /// Phase two of a load: give the just-created ports their saved
    /// names and ids, then announce the device.
    fn update_port_settings(&mut self) {
        if let Some(record) = self.pending_record.take() {
            for saved in &record.ports {
                for port in &mut self.ports {
                    if saved.port_number == port.port_number() {
                        port.set_name(saved.name.clone());
                        port.set_id(saved.id);
                    }
                }
            }
        }

        self.initialized = true;
        info!(name = self.name(), "VPCS device has been loaded");
        self.emit(NodeEvent::Created { node_id: self.id });
        self.ctx.registry.add_node(self.id);
        self.loading = false;
    }

    // ── Info ─────────────────────────────────────────────────────────

    /// Human-readable summary for the GUI.
    pub fn info(&self) -> String {
        let console = self
            .console()
            .map_or_else(|| "none".to_owned(), |p| p.to_string());
        let vm_id = self.vm_id().unwrap_or("none");

        let mut out = format!(
            "Device {name} is {state}\n  Local node ID is {id}\n  Server's VPCS device ID is {vm_id}\n  console is on port {console}\n",
            name = self.name(),
            state = self.status,
            id = self.id,
        );

        for port in &self.ports {
            match port.description() {
                Some(description) => {
                    out.push_str(&format!("     {} {description}\n", port.name()));
                }
                None => out.push_str(&format!("     {} is empty\n", port.name())),
            }
        }

        out
    }

    // ── Helpers ──────────────────────────────────────────────────────

    fn script_path_in(&self, dir: &Path) -> PathBuf {
        dir.join(format!("{}_startup.vpc", normalize_filename(self.name())))
    }

    fn set_status(&mut self, status: NodeStatus, port_status: PortStatus) {
        self.status = status;
        for port in &mut self.ports {
            port.set_status(port_status);
        }
    }

    fn emit(&self, event: NodeEvent) {
        self.ctx.events.emit(event);
    }

    fn emit_error(&self, message: impl Into<String>) {
        let message = message.into();
        error!(name = self.name(), %message);
        self.emit(NodeEvent::Error {
            node_id: self.id,
            message,
        });
    }

    fn emit_server_error(&self, err: &vpcs_api::Error) {
        self.emit(NodeEvent::ServerError {
            node_id: self.id,
            status: err.status(),
            message: err.message(),
        });
    }
}

// ── Script file I/O ──────────────────────────────────────────────────

fn read_script(path: &Path) -> Result<String, CoreError> {
    std::fs::read_to_string(path).map_err(|e| CoreError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

fn write_script(path: &Path, content: &str) -> Result<(), CoreError> {
    std::fs::write(path, content).map_err(|e| CoreError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}
