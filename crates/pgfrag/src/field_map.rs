//! Ordered field maps.
//!
//! A [`FieldMap`] is an explicit sequence of `(key, value)` pairs. Its order is
//! the construction order and decides which placeholder each value receives,
//! so the order is part of the data rather than a property of a hash map.

use crate::error::{FragError, FragResult};
use crate::value::SqlValue;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;

/// Ordered mapping of logical field names to values, with unique keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldMap {
    entries: Vec<(String, SqlValue)>,
}

/// Search criteria share the field map representation. `Null` means absent.
pub type FilterCriteria = FieldMap;

impl FieldMap {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append a field, replacing the value in place if the key already exists.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Append a field, replacing the value in place if the key already exists.
    ///
    /// Replacing keeps the original position of the key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<SqlValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Append a field, failing if the key is already present.
    pub fn try_insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<SqlValue>,
    ) -> FragResult<()> {
        let key = key.into();
        if self.contains_key(&key) {
            return Err(FragError::duplicate_key(key));
        }
        self.entries.push((key, value.into()));
        Ok(())
    }

    /// Build from a JSON object, keeping its key order.
    pub fn from_json_object(object: serde_json::Map<String, serde_json::Value>) -> FragResult<Self> {
        let mut map = Self::new();
        for (key, value) in object {
            let value = SqlValue::from_json(&key, value)?;
            map.try_insert(key, value)?;
        }
        Ok(map)
    }

    /// Parse a JSON object string. Duplicate keys are rejected.
    pub fn from_json_str(s: &str) -> FragResult<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn get(&self, key: &str) -> Option<&SqlValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &SqlValue> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K, V> FromIterator<(K, V)> for FieldMap
where
    K: Into<String>,
    V: Into<SqlValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl IntoIterator for FieldMap {
    type Item = (String, SqlValue);
    type IntoIter = std::vec::IntoIter<(String, SqlValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'de> Deserialize<'de> for FieldMap {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct FieldMapVisitor;

        impl<'de> Visitor<'de> for FieldMapVisitor {
            type Value = FieldMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object of scalar values")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut map = FieldMap::new();
                while let Some((key, value)) = access.next_entry::<String, SqlValue>()? {
                    map.try_insert(key, value).map_err(serde::de::Error::custom)?;
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(FieldMapVisitor)
    }
}
