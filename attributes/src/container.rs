//! The attribute container.
//!
//! Reads are dotted-path aware, writes are not: `get`/`has` walk nested maps
//! and sequences segment by segment, while `set`, `push`, `contains_key` and
//! `unset` only ever touch the top-level mapping.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{AttributesError, Result};
use crate::key::{Key, canonical_integer, child};

/// A mutable, dotted-path addressable record over a JSON-shaped mapping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attributes {
    attributes: Map<String, Value>,
    #[serde(skip)]
    required_keys: Vec<String>,
}

impl Attributes {
    /// Wrap `initial` without any required keys.
    pub fn new(initial: Map<String, Value>) -> Result<Self> {
        Self::with_required_keys(initial, Vec::<String>::new())
    }

    /// Wrap `initial` and validate that every key in `required_keys` resolves.
    pub fn with_required_keys<I, S>(initial: Map<String, Value>, required_keys: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let container = Self {
            attributes: initial,
            required_keys: required_keys.into_iter().map(Into::into).collect(),
        };
        container.check_missing_keys()?;
        Ok(container)
    }

    /// Parse a JSON object and validate it like [`Attributes::with_required_keys`].
    pub fn from_json<I, S>(json: &str, required_keys: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let value: Value =
            serde_json::from_str(json).map_err(|e| AttributesError::Deserialization {
                message: e.to_string(),
            })?;
        match value {
            Value::Object(map) => Self::with_required_keys(map, required_keys),
            _ => Err(AttributesError::Deserialization {
                message: "expected a JSON object".to_string(),
            }),
        }
    }

    pub fn required_keys(&self) -> &[String] {
        &self.required_keys
    }

    /// Check that every required key resolves via [`Attributes::has`].
    ///
    /// All missing keys are collected before failing, in declaration order.
    pub fn check_missing_keys(&self) -> Result<()> {
        if self.required_keys.is_empty() {
            return Ok(());
        }

        let missing: Vec<String> = self
            .required_keys
            .iter()
            .filter(|key| !self.has(key.as_str()))
            .cloned()
            .collect();

        if missing.is_empty() {
            return Ok(());
        }

        tracing::debug!(missing = ?missing, "required attribute keys are missing");
        Err(AttributesError::Validation { missing })
    }

    /// Look up a dotted path.
    ///
    /// Traversal stops at the first segment that is not present, including
    /// when the current value is a scalar.
    pub fn get<K: Into<Key>>(&self, key: K) -> Option<&Value> {
        let key = key.into();
        let mut segments = key.segments().into_iter();
        let first = segments.next()?;
        let mut value = self.attributes.get(&*first)?;
        for segment in segments {
            value = child(value, &segment)?;
        }
        Some(value)
    }

    /// Look up a dotted path, falling back to `default` when it is absent.
    pub fn get_or<K: Into<Key>>(&self, key: K, default: Value) -> Value {
        self.get(key).cloned().unwrap_or(default)
    }

    /// Whether `key` exists, either literally at the top level or as a path.
    ///
    /// The literal check matters for top-level keys that contain a dot.
    pub fn has<K: Into<Key>>(&self, key: K) -> bool {
        if self.attributes.is_empty() {
            return false;
        }
        self.resolves(&key.into())
    }

    /// Whether every key in `keys` exists. An empty key list is never present.
    pub fn has_all<I, K>(&self, keys: I) -> bool
    where
        I: IntoIterator<Item = K>,
        K: Into<Key>,
    {
        if self.attributes.is_empty() {
            return false;
        }

        let mut any = false;
        for key in keys {
            any = true;
            if !self.resolves(&key.into()) {
                return false;
            }
        }
        any
    }

    fn resolves(&self, key: &Key) -> bool {
        self.attributes.contains_key(&*key.as_map_key()) || self.get(key).is_some()
    }

    /// Assign a top-level key. Dots in `key` are taken literally.
    pub fn set<K: Into<Key>>(&mut self, key: K, value: Value) -> &mut Self {
        let key = key.into();
        self.attributes.insert(key.as_map_key().into_owned(), value);
        self
    }

    /// Append `value` under the next sequential integer key.
    ///
    /// Fails without touching the mapping when the largest integer key is
    /// already `i64::MAX`.
    pub fn push(&mut self, value: Value) -> Result<&mut Self> {
        let next = self.next_index().ok_or(AttributesError::IndexExhausted)?;
        self.attributes.insert(next.to_string(), value);
        Ok(self)
    }

    /// One past the largest non-negative integer key, 0 when there is none,
    /// or `None` when that key is `i64::MAX`.
    fn next_index(&self) -> Option<i64> {
        self.attributes
            .keys()
            .filter_map(|key| canonical_integer(key))
            .filter(|index| *index >= 0)
            .max()
            .map_or(Some(0), |max| max.checked_add(1))
    }

    /// Top-level existence check. Unlike [`Attributes::has`], no path traversal.
    pub fn contains_key<K: Into<Key>>(&self, key: K) -> bool {
        self.attributes.contains_key(&*key.into().as_map_key())
    }

    /// Remove a top-level key, keeping the order of the remaining entries.
    pub fn unset<K: Into<Key>>(&mut self, key: K) -> Option<Value> {
        self.attributes.shift_remove(&*key.into().as_map_key())
    }

    /// The live attribute mapping.
    pub fn to_array(&self) -> &Map<String, Value> {
        &self.attributes
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.attributes
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Encode the mapping as compact JSON, leaving non-ASCII text unescaped.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.attributes)?)
    }
}

impl fmt::Display for Attributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = self.to_json().map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

impl TryFrom<Map<String, Value>> for Attributes {
    type Error = AttributesError;

    fn try_from(initial: Map<String, Value>) -> Result<Self> {
        Self::new(initial)
    }
}

impl From<Attributes> for Value {
    fn from(container: Attributes) -> Self {
        Value::Object(container.attributes)
    }
}
