//! # Memory
//!
//! Timestamped key-value store used by agents for their own state and by
//! orchestrators for state shared across agents.

pub mod keys;

pub use keys::MemoryKeys;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use crate::error::MemoryError;

#[derive(Debug)]
struct MemoryState {
    data: HashMap<String, Value>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl MemoryState {
    fn empty() -> Self {
        let now = Utc::now();
        Self {
            data: HashMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    // updated_at never precedes created_at, even if the wall clock steps back.
    fn touch(&mut self) {
        self.updated_at = Utc::now().max(self.created_at);
    }
}

/// Timestamped key-value store.
///
/// `Memory` is a handle: cloning it yields another handle onto the same
/// underlying store, which is how an orchestrator shares one memory with
/// its agents. All operations take `&self` and synchronise internally, so
/// concurrent writers from parallel runs are last-writer-wins per key.
///
/// # Example
///
/// ```rust
/// use troupe_core::Memory;
/// use serde_json::json;
///
/// let memory = Memory::new();
/// memory.store("session", json!("abc123"));
///
/// assert_eq!(memory.retrieve("session", json!(null)), json!("abc123"));
/// assert_eq!(memory.retrieve("missing", json!(0)), json!(0));
/// ```
#[derive(Debug, Clone)]
pub struct Memory {
    id: String,
    state: Arc<RwLock<MemoryState>>,
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl Memory {
    /// Create an empty memory with a fresh identifier.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            state: Arc::new(RwLock::new(MemoryState::empty())),
        }
    }

    /// Unique identifier assigned at creation.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Insert or overwrite `key`. Always succeeds and refreshes `updated_at`.
    pub fn store(&self, key: impl Into<String>, value: impl Into<Value>) {
        let mut state = self.write();
        state.data.insert(key.into(), value.into());
        state.touch();
    }

    /// Stored value for `key`, or `default` when absent.
    pub fn retrieve(&self, key: &str, default: impl Into<Value>) -> Value {
        self.get(key).unwrap_or_else(|| default.into())
    }

    /// Stored value for `key`, if any.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.read().data.get(key).cloned()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.read().data.contains_key(key)
    }

    /// Remove every entry. Refreshes `updated_at`.
    pub fn clear(&self) {
        let mut state = self.write();
        state.data.clear();
        state.touch();
    }

    pub fn len(&self) -> usize {
        self.read().data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().data.is_empty()
    }

    /// Stored keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.read().data.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Copy of the current mapping.
    pub fn data(&self) -> HashMap<String, Value> {
        self.read().data.clone()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.read().created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.read().updated_at
    }

    /// Whether two handles point at the same underlying store.
    pub fn shares_store_with(&self, other: &Memory) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }

    /// Plain structural form suitable for persistence or transport.
    pub fn to_representation(&self) -> MemorySnapshot {
        let state = self.read();
        MemorySnapshot {
            id: Some(self.id.clone()),
            data: state.data.clone(),
            created_at: Some(state.created_at),
            updated_at: Some(state.updated_at),
        }
    }

    /// Rebuild a memory from its structural form.
    ///
    /// A missing identifier is replaced by a fresh one and missing
    /// timestamps default to now. The result never shares its store with
    /// the memory the snapshot was taken from.
    pub fn from_representation(snapshot: MemorySnapshot) -> Self {
        let now = Utc::now();
        let created_at = snapshot.created_at.unwrap_or(now);
        let updated_at = snapshot.updated_at.unwrap_or(now).max(created_at);

        Self {
            id: snapshot.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            state: Arc::new(RwLock::new(MemoryState {
                data: snapshot.data,
                created_at,
                updated_at,
            })),
        }
    }

    /// Serialize the snapshot as JSON.
    pub fn to_json(&self) -> Result<String, MemoryError> {
        serde_json::to_string(&self.to_representation()).map_err(MemoryError::Serialize)
    }

    /// Parse a JSON snapshot produced by [`Memory::to_json`] or by hand.
    pub fn from_json(input: &str) -> Result<Self, MemoryError> {
        let snapshot: MemorySnapshot =
            serde_json::from_str(input).map_err(MemoryError::Deserialize)?;
        Ok(Self::from_representation(snapshot))
    }

    fn read(&self) -> RwLockReadGuard<'_, MemoryState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, MemoryState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Structural form of a [`Memory`]. Timestamps serialize as RFC 3339.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MemorySnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub data: HashMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<HashMap<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<HashMap<String, Value>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn store_overwrites_and_refreshes_timestamp() {
        let memory = Memory::new();
        let before = memory.updated_at();

        memory.store("k", json!(1));
        memory.store("k", json!(2));

        assert_eq!(memory.get("k"), Some(json!(2)));
        assert_eq!(memory.len(), 1);
        assert!(memory.updated_at() >= before);
        assert!(memory.updated_at() >= memory.created_at());
    }

    #[test]
    fn retrieve_falls_back_to_default() {
        let memory = Memory::new();
        assert_eq!(memory.retrieve("absent", "fallback"), json!("fallback"));
        assert_eq!(memory.retrieve("absent", Value::Null), Value::Null);
    }

    #[test]
    fn clear_empties_mapping() {
        let memory = Memory::new();
        memory.store("a", json!("x"));
        memory.store("b", json!("y"));

        memory.clear();

        assert!(memory.is_empty());
        assert!(memory.updated_at() >= memory.created_at());
    }

    #[test]
    fn clones_share_the_store() {
        let memory = Memory::new();
        let handle = memory.clone();

        handle.store("shared", json!(true));

        assert_eq!(memory.get("shared"), Some(json!(true)));
        assert!(memory.shares_store_with(&handle));
        assert_eq!(memory.id(), handle.id());
        assert!(!memory.shares_store_with(&Memory::new()));
    }

    #[test]
    fn keys_are_sorted() {
        let memory = Memory::new();
        memory.store("b", json!(2));
        memory.store("a", json!(1));
        assert_eq!(memory.keys(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn representation_uses_rfc3339_timestamps() {
        let memory = Memory::new();
        memory.store("k", json!({"nested": [1, 2, 3]}));

        let value = serde_json::to_value(memory.to_representation()).unwrap();

        assert_eq!(value["id"], json!(memory.id()));
        assert_eq!(value["data"]["k"]["nested"], json!([1, 2, 3]));
        let created = value["created_at"].as_str().unwrap();
        assert!(DateTime::parse_from_rfc3339(created).is_ok());
    }

    #[test]
    fn from_json_generates_missing_id_and_data() {
        let memory = Memory::from_json("{}").unwrap();
        assert!(!memory.id().is_empty());
        assert!(memory.is_empty());

        let memory = Memory::from_json(r#"{"data": null}"#).unwrap();
        assert!(memory.is_empty());
    }

    #[test]
    fn from_representation_keeps_timestamps_ordered() {
        let created = Utc::now();
        let snapshot = MemorySnapshot {
            id: Some("m-1".to_string()),
            data: HashMap::new(),
            created_at: Some(created),
            updated_at: Some(created - chrono::Duration::seconds(30)),
        };

        let memory = Memory::from_representation(snapshot);

        assert_eq!(memory.id(), "m-1");
        assert_eq!(memory.created_at(), created);
        assert!(memory.updated_at() >= memory.created_at());
    }

    #[test]
    fn from_json_rejects_malformed_input() {
        let err = Memory::from_json("not json").unwrap_err();
        assert!(matches!(err, MemoryError::Deserialize(_)));
    }

    #[test]
    fn restored_memory_is_detached() {
        let memory = Memory::new();
        memory.store("k", json!("v"));

        let restored = Memory::from_json(&memory.to_json().unwrap()).unwrap();
        restored.store("k", json!("changed"));

        assert_eq!(memory.get("k"), Some(json!("v")));
        assert!(!memory.shares_store_with(&restored));
    }

    fn value_strategy() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::from),
            any::<i64>().prop_map(Value::from),
            "[a-zA-Z0-9 _-]{0,32}".prop_map(Value::from),
        ]
    }

    proptest! {
        #[test]
        fn prop_json_round_trip_preserves_id_and_data(
            entries in prop::collection::hash_map("[a-z_]{1,16}", value_strategy(), 0..16)
        ) {
            let memory = Memory::new();
            for (key, value) in &entries {
                memory.store(key.clone(), value.clone());
            }

            let restored = Memory::from_json(&memory.to_json().unwrap()).unwrap();

            prop_assert_eq!(restored.id(), memory.id());
            prop_assert_eq!(restored.data(), entries);
        }
    }
}
