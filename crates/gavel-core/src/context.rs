//! Execution context for action commits.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::ActorId;

/// Ambient state for a single action invocation.
///
/// Carries the acting principal, a free-form data payload for the action
/// body, and any extra fields host collaborators merge in (locale, request
/// id, and so on). The engine reads `actor` and `data`; extra fields pass
/// through to the log untouched.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Context {
    /// The acting principal. Required for commit.
    pub actor: Option<ActorId>,
    /// Caller-supplied payload for the action body.
    #[serde(default)]
    pub data: Value,
    /// Host-defined extension fields.
    #[serde(default)]
    pub extra: BTreeMap<String, Value>,
}

impl Context {
    /// Empty context with no actor. Commit refuses it.
    pub fn new() -> Self {
        Self::default()
    }

    /// Context acting as the given principal.
    pub fn for_actor(actor: impl Into<ActorId>) -> Self {
        Self {
            actor: Some(actor.into()),
            ..Self::default()
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Serialized form recorded on action logs.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_has_no_actor() {
        let ctx = Context::new();
        assert!(ctx.actor.is_none());
        assert_eq!(ctx.data, Value::Null);
        assert!(ctx.extra.is_empty());
    }

    #[test]
    fn test_for_actor() {
        let ctx = Context::for_actor("alice");
        assert_eq!(ctx.actor, Some(ActorId::new("alice")));
    }

    #[test]
    fn test_with_data() {
        let ctx = Context::for_actor("alice").with_data(json!({"reason": "spam"}));
        assert_eq!(ctx.data["reason"], "spam");
    }

    #[test]
    fn test_with_field() {
        let ctx = Context::new()
            .with_field("locale", json!("en"))
            .with_field("request_id", json!("r-1"));
        assert_eq!(ctx.extra.get("locale"), Some(&json!("en")));
        assert_eq!(ctx.extra.get("request_id"), Some(&json!("r-1")));
    }

    #[test]
    fn test_with_field_overwrites() {
        let ctx = Context::new()
            .with_field("locale", json!("en"))
            .with_field("locale", json!("de"));
        assert_eq!(ctx.extra.get("locale"), Some(&json!("de")));
        assert_eq!(ctx.extra.len(), 1);
    }

    #[test]
    fn test_to_value_includes_actor_and_data() {
        let ctx = Context::for_actor("bob").with_data(json!({"n": 3}));
        let value = ctx.to_value();
        assert_eq!(value["actor"], "bob");
        assert_eq!(value["data"]["n"], 3);
    }

    #[test]
    fn test_serialization_round_trip() {
        let ctx = Context::for_actor("carol")
            .with_data(json!([1, 2, 3]))
            .with_field("locale", json!("fr"));
        let json = serde_json::to_string(&ctx).unwrap();
        let rt: Context = serde_json::from_str(&json).unwrap();
        assert_eq!(rt.actor, Some(ActorId::new("carol")));
        assert_eq!(rt.data, json!([1, 2, 3]));
        assert_eq!(rt.extra.get("locale"), Some(&json!("fr")));
    }

    #[test]
    fn test_deserialize_missing_fields_default() {
        let ctx: Context = serde_json::from_str("{}").unwrap();
        assert!(ctx.actor.is_none());
        assert_eq!(ctx.data, Value::Null);
        assert!(ctx.extra.is_empty());
    }
}
