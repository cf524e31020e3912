//! Render context: the variable bindings for one template evaluation.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

/// Reserved variable name under which the rendered record is exposed.
pub const RECORD_KEY: &str = "record";

/// Named variables handed to the template engine. Built once per render,
/// then read-only. Names are not validated against the reserved key;
/// last write wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderContext {
    vars: BTreeMap<String, Value>,
}

impl RenderContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// A context seeded with `record` under [`RECORD_KEY`].
    pub fn for_record(record: Value) -> Self {
        let mut ctx = Self::new();
        ctx.insert_value(RECORD_KEY, record);
        ctx
    }

    /// Insert a serializable value. Values that cannot serialize to JSON
    /// are stored as `null`.
    pub fn insert(&mut self, name: impl Into<String>, value: &impl Serialize) {
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        self.insert_value(name, value);
    }

    pub fn insert_value(&mut self, name: impl Into<String>, value: Value) {
        self.vars.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    pub fn vars(&self) -> &BTreeMap<String, Value> {
        &self.vars
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}
