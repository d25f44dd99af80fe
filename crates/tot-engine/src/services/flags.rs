//! Persistent flag storage behind a trait.
//!
//! The engine records tiny facts ("tutorial seen") and the host decides
//! where they live: LocalStorage, a settings file, or nowhere. Values are
//! loose JSON so hosts with existing preference blobs can pass them
//! through untouched.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Host-provided key/value storage for persistent flags.
pub trait FlagStore {
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&mut self, key: &str, value: Value);
    fn remove(&mut self, key: &str);
}

/// Interpret a stored flag value as a boolean.
/// Malformed values count as unset (and are logged), never as errors.
pub fn is_truthy(key: &str, value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|v| v != 0.0).unwrap_or(false),
        other => {
            log::warn!("flag '{}' has malformed value {:?}, treating as unset", key, other);
            false
        }
    }
}

/// In-memory flag store: the default when the host provides none, and the
/// workhorse for tests. Serializable so a host can snapshot it to JSON
/// and restore it next launch.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct MemoryFlags {
    map: HashMap<String, Value>,
}

impl MemoryFlags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize to a JSON string for host-side persistence.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Restore from a JSON string. A corrupt blob yields an empty store.
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str(json) {
            Ok(flags) => flags,
            Err(err) => {
                log::warn!("failed to parse flag snapshot: {}", err);
                Self::default()
            }
        }
    }
}

impl FlagStore for MemoryFlags {
    fn get(&self, key: &str) -> Option<Value> {
        self.map.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) {
        self.map.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.map.remove(key);
    }
}
