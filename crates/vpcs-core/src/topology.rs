// ── Topology collaborators ──
//
// The name allocator hands out unique display names ("PC1", "PC2", …)
// and tracks renames; the node registry is the owning collection a
// device registers with once initialized. Both are shared between the
// GUI and every device via `Arc`, with interior mutability.

use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Local topology object identifier, distinct from the server's VM id.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

// Names beyond this index are never probed; allocation fails instead.
const MAX_NAME_INDEX: u32 = 10_000;

/// Allocates and tracks device display names.
#[derive(Debug, Default)]
pub struct NameAllocator {
    names: Mutex<HashSet<String>>,
}

impl NameAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the lowest-numbered free name for `prefix`, e.g. "PC1".
    ///
    /// Returns `None` when no name can be allocated.
    pub fn allocate_name(&self, prefix: &str) -> Option<String> {
        let mut names = self.names.lock().ok()?;
        for index in 1..=MAX_NAME_INDEX {
            let candidate = format!("{prefix}{index}");
            if !names.contains(&candidate) {
                names.insert(candidate.clone());
                return Some(candidate);
            }
        }
        None
    }

    /// Reserve a pre-chosen name (load path, explicit user choice).
    ///
    /// Returns `false` when the name was already taken.
    pub fn reserve(&self, name: &str) -> bool {
        match self.names.lock() {
            Ok(mut names) => names.insert(name.to_owned()),
            Err(_) => false,
        }
    }

    /// Whether `name` is currently allocated to some device.
    pub fn has_allocated_name(&self, name: &str) -> bool {
        self.names
            .lock()
            .map(|names| names.contains(name))
            .unwrap_or(false)
    }

    /// Rename: release `old` and reserve `new`.
    pub fn update_allocated_name(&self, old: &str, new: &str) {
        if let Ok(mut names) = self.names.lock() {
            names.remove(old);
            names.insert(new.to_owned());
            debug!(old, new, "allocated name updated");
        }
    }

    /// Release a name (device deleted).
    pub fn release(&self, name: &str) {
        if let Ok(mut names) = self.names.lock() {
            names.remove(name);
        }
    }
}

/// The owning collection of initialized nodes.
///
/// Devices register here once their create round-trip succeeds and
/// deregister on deletion; the GUI uses it to enumerate live nodes.
#[derive(Debug, Default)]
pub struct NodeRegistry {
    next_id: AtomicU64,
    nodes: Mutex<HashSet<NodeId>>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out the next local node id.
    pub fn allocate_id(&self) -> NodeId {
        NodeId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1)
    }

    pub fn add_node(&self, id: NodeId) {
        if let Ok(mut nodes) = self.nodes.lock() {
            nodes.insert(id);
            debug!(%id, "node registered");
        }
    }

    pub fn remove_node(&self, id: NodeId) {
        if let Ok(mut nodes) = self.nodes.lock() {
            nodes.remove(&id);
            debug!(%id, "node deregistered");
        }
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes
            .lock()
            .map(|nodes| nodes.contains(&id))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.nodes.lock().map(|nodes| nodes.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocates_lowest_free_index() {
        let allocator = NameAllocator::new();
        assert_eq!(allocator.allocate_name("PC").as_deref(), Some("PC1"));
        assert_eq!(allocator.allocate_name("PC").as_deref(), Some("PC2"));
        allocator.release("PC1");
        assert_eq!(allocator.allocate_name("PC").as_deref(), Some("PC1"));
    }

    #[test]
    fn reserve_rejects_taken_names() {
        let allocator = NameAllocator::new();
        assert!(allocator.reserve("R1"));
        assert!(!allocator.reserve("R1"));
        assert!(allocator.has_allocated_name("R1"));
    }

    #[test]
    fn rename_moves_the_reservation() {
        let allocator = NameAllocator::new();
        allocator.reserve("PC1");
        allocator.update_allocated_name("PC1", "edge-1");
        assert!(!allocator.has_allocated_name("PC1"));
        assert!(allocator.has_allocated_name("edge-1"));
    }

    #[test]
    fn registry_ids_are_unique_and_membership_tracks() {
        let registry = NodeRegistry::new();
        let a = registry.allocate_id();
        let b = registry.allocate_id();
        assert_ne!(a, b);

        registry.add_node(a);
        assert!(registry.contains(a));
        assert_eq!(registry.len(), 1);

        registry.remove_node(a);
        assert!(!registry.contains(a));
        assert!(registry.is_empty());
    }
}
