use std::collections::BTreeMap;

use anyhow::anyhow;
use serde::Deserialize;
use serde_yaml::Value;

use crate::error::{HandlerError, HandlerResult};

/// Static per-route configuration handed to the handler factory.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct RouteConfig(BTreeMap<String, Value>);

impl RouteConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(Value::as_u64)
    }

    /// A string option the handler cannot work without.
    pub fn require_str(&self, key: &str) -> HandlerResult<&str> {
        self.get_str(key)
            .ok_or_else(|| HandlerError::Other(anyhow!("route option `{key}` is required")))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
