// ── Device settings ──
//
// Settings are a dynamic JSON map mirrored from the server. The key
// set is fixed at construction (the defaults snapshot); reconciliation
// only ever touches keys already present, so server responses can
// carry extra fields without polluting local state.

use serde_json::Value;
use tracing::info;

use vpcs_api::VmParams;

pub const SETTING_NAME: &str = "name";
pub const SETTING_SCRIPT_FILE: &str = "script_file";
pub const SETTING_STARTUP_SCRIPT: &str = "startup_script";
pub const SETTING_CONSOLE: &str = "console";

/// The settings every VPCS device starts with. Also the defaults
/// snapshot used to decide which properties get persisted.
pub fn default_settings() -> VmParams {
    let mut settings = VmParams::new();
    settings.insert(SETTING_NAME.into(), Value::String(String::new()));
    settings.insert(SETTING_SCRIPT_FILE.into(), Value::String(String::new()));
    settings.insert(SETTING_STARTUP_SCRIPT.into(), Value::Null);
    settings.insert(SETTING_CONSOLE.into(), Value::Null);
    settings
}

/// Compute the changes to send to the server: keys that are both
/// recognized (present in `current`) and different from the current
/// value. Everything else is dropped silently.
pub fn diff(current: &VmParams, incoming: &VmParams) -> VmParams {
    let mut changes = VmParams::new();
    for (key, value) in incoming {
        if let Some(existing) = current.get(key) {
            if existing != value {
                changes.insert(key.clone(), value.clone());
            }
        }
    }
    changes
}

/// Fold a server response back into local settings.
///
/// Only keys already present locally are updated; each change is
/// logged. Returns the keys that changed.
pub fn reconcile(settings: &mut VmParams, response: &VmParams) -> Vec<String> {
    let mut changed = Vec::new();
    for (key, value) in response {
        let Some(current) = settings.get(key) else {
            continue;
        };
        if current != value {
            info!(key, old = %current, new = %value, "updating setting");
            settings.insert(key.clone(), value.clone());
            changed.push(key.clone());
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn map(value: serde_json::Value) -> VmParams {
        match value {
            Value::Object(map) => map,
            other => panic!("expected JSON object, got {other}"),
        }
    }

    #[test]
    fn diff_keeps_only_recognized_changed_keys() {
        let current = default_settings();
        let incoming = map(json!({
            "name": "PC1",
            "console": 5001,
            "bogus": true,
        }));

        let changes = diff(&current, &incoming);
        assert_eq!(changes.len(), 2);
        assert_eq!(changes["name"], "PC1");
        assert_eq!(changes["console"], 5001);
        assert!(!changes.contains_key("bogus"));
    }

    #[test]
    fn diff_skips_unchanged_values() {
        let mut current = default_settings();
        current.insert("name".into(), "PC1".into());

        let incoming = map(json!({ "name": "PC1" }));
        assert!(diff(&current, &incoming).is_empty());
    }

    #[test]
    fn reconcile_never_introduces_new_keys() {
        let mut settings = default_settings();
        let response = map(json!({
            "vm_id": "abc",
            "name": "PC1",
            "console": 5001,
        }));

        let mut changed = reconcile(&mut settings, &response);
        changed.sort();
        assert_eq!(changed, vec!["console".to_owned(), "name".to_owned()]);
        assert!(!settings.contains_key("vm_id"));
        assert_eq!(settings["name"], "PC1");
        assert_eq!(settings["console"], 5001);
    }

    #[test]
    fn reconcile_reports_nothing_when_in_sync() {
        let mut settings = default_settings();
        settings.insert("name".into(), "PC1".into());

        let response = map(json!({ "name": "PC1" }));
        assert!(reconcile(&mut settings, &response).is_empty());
    }
}
