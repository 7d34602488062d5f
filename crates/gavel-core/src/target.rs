//! The object interface actions execute against.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A domain object actions can be committed against.
///
/// Implementors expose identity for the audit trail, a serialized
/// snapshot, and a drain-style change probe. `diff` hands back everything
/// recorded since the previous call and resets, so the engine can
/// attribute each delta to exactly one commit.
pub trait Target {
    /// Stable type tag, e.g. "article".
    fn kind(&self) -> &str;

    /// Identity of this instance within its kind.
    fn id(&self) -> String;

    /// Serialized current state.
    fn snapshot(&self) -> Value;

    /// Drain the fields changed since the previous call.
    fn diff(&mut self) -> FieldChanges;
}

/// Reference to a target instance, recorded on logs.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetRef {
    pub kind: String,
    pub id: String,
}

impl TargetRef {
    pub fn of(target: &impl Target) -> Self {
        Self {
            kind: target.kind().to_string(),
            id: target.id(),
        }
    }
}

impl std::fmt::Display for TargetRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// Old and new value of a single changed field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    pub old: Value,
    pub new: Value,
}

/// Changed fields drained from a target, keyed by field name.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldChanges(pub BTreeMap<String, FieldChange>);

impl FieldChanges {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, old: Value, new: Value) {
        self.0.insert(field.into(), FieldChange { old, new });
    }

    pub fn get(&self, field: &str) -> Option<&FieldChange> {
        self.0.get(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldChange)> {
        self.0.iter()
    }

    /// The old-value half as a JSON object.
    pub fn old_values(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|(field, change)| (field.clone(), change.old.clone()))
                .collect(),
        )
    }

    /// The new-value half as a JSON object.
    pub fn new_values(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|(field, change)| (field.clone(), change.new.clone()))
                .collect(),
        )
    }
}

/// Accumulates field changes for [`Target::diff`] implementations.
///
/// Repeated writes to the same field keep the first old value and the last
/// new value. A field written back to its original value drops out, and a
/// write that changes nothing is ignored.
#[derive(Clone, Debug, Default)]
pub struct ChangeTracker {
    changes: BTreeMap<String, FieldChange>,
}

impl ChangeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a field transition.
    pub fn record(&mut self, field: impl Into<String>, old: Value, new: Value) {
        match self.changes.entry(field.into()) {
            Entry::Occupied(mut entry) => {
                if entry.get().old == new {
                    entry.remove();
                } else {
                    entry.get_mut().new = new;
                }
            }
            Entry::Vacant(entry) => {
                if old != new {
                    entry.insert(FieldChange { old, new });
                }
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Hand over everything recorded so far and reset.
    pub fn drain(&mut self) -> FieldChanges {
        FieldChanges(std::mem::take(&mut self.changes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Widget {
        name: String,
    }

    impl Target for Widget {
        fn kind(&self) -> &str {
            "widget"
        }

        fn id(&self) -> String {
            "7".to_string()
        }

        fn snapshot(&self) -> Value {
            json!({ "name": self.name })
        }

        fn diff(&mut self) -> FieldChanges {
            FieldChanges::new()
        }
    }

    #[test]
    fn test_target_ref_of() {
        let widget = Widget {
            name: "gear".to_string(),
        };
        let target_ref = TargetRef::of(&widget);
        assert_eq!(target_ref.kind, "widget");
        assert_eq!(target_ref.id, "7");
    }

    #[test]
    fn test_target_ref_display() {
        let target_ref = TargetRef {
            kind: "article".to_string(),
            id: "42".to_string(),
        };
        assert_eq!(target_ref.to_string(), "article:42");
    }

    #[test]
    fn test_target_ref_serialization_round_trip() {
        let target_ref = TargetRef {
            kind: "order".to_string(),
            id: "o-9".to_string(),
        };
        let json = serde_json::to_string(&target_ref).unwrap();
        let rt: TargetRef = serde_json::from_str(&json).unwrap();
        assert_eq!(target_ref, rt);
    }

    // =========================================================================
    // FieldChanges tests
    // =========================================================================

    #[test]
    fn test_field_changes_halves() {
        let mut changes = FieldChanges::new();
        changes.insert("state", json!("draft"), json!("published"));
        changes.insert("title", json!("a"), json!("b"));

        assert_eq!(
            changes.old_values(),
            json!({ "state": "draft", "title": "a" })
        );
        assert_eq!(
            changes.new_values(),
            json!({ "state": "published", "title": "b" })
        );
    }

    #[test]
    fn test_field_changes_empty_halves() {
        let changes = FieldChanges::new();
        assert!(changes.is_empty());
        assert_eq!(changes.old_values(), json!({}));
        assert_eq!(changes.new_values(), json!({}));
    }

    #[test]
    fn test_field_changes_get_and_len() {
        let mut changes = FieldChanges::new();
        changes.insert("n", json!(1), json!(2));
        assert_eq!(changes.len(), 1);
        let change = changes.get("n").unwrap();
        assert_eq!(change.old, json!(1));
        assert_eq!(change.new, json!(2));
        assert!(changes.get("missing").is_none());
    }

    #[test]
    fn test_field_changes_serialization_round_trip() {
        let mut changes = FieldChanges::new();
        changes.insert("state", json!("draft"), json!("published"));
        let json = serde_json::to_string(&changes).unwrap();
        let rt: FieldChanges = serde_json::from_str(&json).unwrap();
        assert_eq!(changes, rt);
    }

    // =========================================================================
    // ChangeTracker tests
    // =========================================================================

    #[test]
    fn test_tracker_records_change() {
        let mut tracker = ChangeTracker::new();
        tracker.record("state", json!("draft"), json!("published"));
        let changes = tracker.drain();
        assert_eq!(changes.get("state").unwrap().old, json!("draft"));
        assert_eq!(changes.get("state").unwrap().new, json!("published"));
    }

    #[test]
    fn test_tracker_ignores_no_op_write() {
        let mut tracker = ChangeTracker::new();
        tracker.record("state", json!("draft"), json!("draft"));
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_tracker_keeps_first_old_last_new() {
        let mut tracker = ChangeTracker::new();
        tracker.record("n", json!(1), json!(2));
        tracker.record("n", json!(2), json!(3));
        let changes = tracker.drain();
        let change = changes.get("n").unwrap();
        assert_eq!(change.old, json!(1));
        assert_eq!(change.new, json!(3));
    }

    #[test]
    fn test_tracker_drops_reverted_field() {
        let mut tracker = ChangeTracker::new();
        tracker.record("n", json!(1), json!(2));
        tracker.record("n", json!(2), json!(1));
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_tracker_drain_resets() {
        let mut tracker = ChangeTracker::new();
        tracker.record("a", json!(1), json!(2));
        let first = tracker.drain();
        assert_eq!(first.len(), 1);

        let second = tracker.drain();
        assert!(second.is_empty());
    }

    #[test]
    fn test_tracker_multiple_fields() {
        let mut tracker = ChangeTracker::new();
        tracker.record("a", json!(1), json!(2));
        tracker.record("b", json!("x"), json!("y"));
        let changes = tracker.drain();
        assert_eq!(changes.len(), 2);
    }
}
