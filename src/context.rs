//! The variables a template is rendered with.
//!
//! A [`Context`] keeps its answers in declaration order. Templates see every
//! key at the top level and, in addition, the whole mapping under each of the
//! alias namespaces (`pytemplator.x`, `cookiecutter.x`). The aliases are views
//! over the same backing map, never copies, so they cannot drift apart.

use indexmap::IndexMap;
use log::warn;
use minijinja::value::{Enumerator, Object, ObjectRepr, Value};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::constants::{CONTEXT_ALIASES, COPY_WITHOUT_RENDER_KEY};

/// Ordered mapping from variable names to answers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Context {
    values: IndexMap<String, serde_json::Value>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a context from an ordered mapping, dropping any alias key.
    pub fn from_map(map: IndexMap<String, serde_json::Value>) -> Self {
        let mut context = Self::new();
        for (key, value) in map {
            context.insert(key, value);
        }
        context
    }

    /// Sets `key`, keeping its original position if it already exists.
    ///
    /// Alias namespaces are reserved and cannot be overwritten.
    pub fn insert<K: Into<String>>(&mut self, key: K, value: serde_json::Value) {
        let key = key.into();
        if CONTEXT_ALIASES.contains(&key.as_str()) {
            warn!("Ignoring context key '{key}': it is reserved for the context itself.");
            return;
        }
        self.values.insert(key, value);
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.values.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The answers without the alias namespaces.
    pub fn as_map(&self) -> &IndexMap<String, serde_json::Value> {
        &self.values
    }

    /// Glob patterns of files whose content must not be rendered.
    pub fn copy_without_render(&self) -> Vec<String> {
        match self.values.get(COPY_WITHOUT_RENDER_KEY) {
            Some(serde_json::Value::Array(patterns)) => {
                patterns.iter().filter_map(|p| p.as_str().map(str::to_string)).collect()
            }
            Some(serde_json::Value::String(pattern)) => vec![pattern.clone()],
            _ => Vec::new(),
        }
    }

    /// The value handed to the template engine: base keys plus alias views.
    pub fn to_value(&self) -> Value {
        let values = self
            .values
            .iter()
            .map(|(key, value)| (key.clone(), Value::from_serialize(value)))
            .collect();
        Value::from_object(ContextView { values: Arc::new(values) })
    }
}

/// Engine-side view of a [`Context`].
#[derive(Debug, Clone)]
struct ContextView {
    values: Arc<IndexMap<String, Value>>,
}

impl Object for ContextView {
    fn repr(self: &Arc<Self>) -> ObjectRepr {
        ObjectRepr::Map
    }

    fn get_value(self: &Arc<Self>, key: &Value) -> Option<Value> {
        let key = key.as_str()?;
        if CONTEXT_ALIASES.contains(&key) {
            return Some(Value::from_object(ContextView { values: Arc::clone(&self.values) }));
        }
        self.values.get(key).cloned()
    }

    // Aliases are reachable by name but not enumerated, so serializing the
    // view (e.g. `tojson`) terminates.
    fn enumerate(self: &Arc<Self>) -> Enumerator {
        Enumerator::Values(self.values.keys().map(|key| Value::from(key.as_str())).collect())
    }
}
