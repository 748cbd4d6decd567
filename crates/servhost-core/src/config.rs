// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Read-only configuration lookup.
//!
//! The host only carries a [`ConfigurationProvider`]; where the values come
//! from is up to the process. [`StaticProvider`] serves a fixed JSON tree and
//! is enough for tests and simple assemblies.

use crate::error::{HostError, HostResult};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt::Debug;

/// A read-only source of configuration values.
///
/// Keys are dotted paths into a tree (`"service.name"`). The empty key
/// addresses the root.
pub trait ConfigurationProvider: Send + Sync + Debug {
    /// A short name identifying the provider, used in diagnostics.
    fn name(&self) -> &str;

    /// Looks up `key`. Absent keys return a value without content rather
    /// than an error.
    fn get(&self, key: &str) -> ConfigValue;
}

/// The result of a configuration lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigValue {
    key: String,
    value: Option<Value>,
}

impl ConfigValue {
    /// Creates a value for `key`, `None` meaning the key was not found.
    pub fn new(key: impl Into<String>, value: Option<Value>) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }

    /// The key this value was looked up with.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns `true` if the key was present and not `null`.
    pub fn has_value(&self) -> bool {
        matches!(self.value, Some(ref v) if !v.is_null())
    }

    /// Returns the raw JSON value.
    pub fn raw(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Returns the value as a string slice if it is a string.
    pub fn as_str(&self) -> Option<&str> {
        self.value.as_ref().and_then(Value::as_str)
    }

    /// Returns the value as a bool if it is a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        self.value.as_ref().and_then(Value::as_bool)
    }

    /// Returns the value as an `i64` if it is an integer.
    pub fn as_i64(&self) -> Option<i64> {
        self.value.as_ref().and_then(Value::as_i64)
    }

    /// Returns the value as an `f64` if it is a number.
    pub fn as_f64(&self) -> Option<f64> {
        self.value.as_ref().and_then(Value::as_f64)
    }

    /// Returns the value as a list of strings if it is an array of strings.
    pub fn as_string_list(&self) -> Option<Vec<String>> {
        self.value
            .as_ref()?
            .as_array()?
            .iter()
            .map(|v| v.as_str().map(str::to_owned))
            .collect()
    }

    /// Deserializes the value into `T`.
    ///
    /// Fails with [`HostError::MissingConfigValue`] if the key is absent and
    /// [`HostError::InvalidConfigValue`] if the shape does not match.
    pub fn populate<T: DeserializeOwned>(&self) -> HostResult<T> {
        let value = match self.value {
            Some(ref v) if !v.is_null() => v.clone(),
            _ => {
                return Err(HostError::MissingConfigValue {
                    key: self.key.clone(),
                })
            }
        };
        serde_json::from_value(value).map_err(|source| HostError::InvalidConfigValue {
            key: self.key.clone(),
            source,
        })
    }
}

/// A provider serving a fixed JSON tree.
#[derive(Debug, Clone)]
pub struct StaticProvider {
    root: Value,
}

impl StaticProvider {
    /// Creates a provider over `root`.
    pub fn new(root: Value) -> Self {
        Self { root }
    }

    fn lookup(&self, key: &str) -> Option<&Value> {
        if key.is_empty() {
            return Some(&self.root);
        }
        key.split('.').try_fold(&self.root, |node, segment| match node {
            Value::Object(map) => map.get(segment),
            Value::Array(list) => segment.parse::<usize>().ok().and_then(|i| list.get(i)),
            _ => None,
        })
    }
}

impl ConfigurationProvider for StaticProvider {
    fn name(&self) -> &str {
        "static"
    }

    fn get(&self, key: &str) -> ConfigValue {
        ConfigValue::new(key, self.lookup(key).cloned())
    }
}
