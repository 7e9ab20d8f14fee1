// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::placeholder::PlaceholderType;
use crate::value::Value;

use std::collections::HashMap;

use anyhow::Result;
use data_encoding::BASE64;
use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

/// Placeholder names and the literal values they stand for, in the order the
/// names were assigned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PlaceholderTable {
    values: IndexMap<String, Value>,
}

impl PlaceholderTable {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn into_inner(self) -> IndexMap<String, Value> {
        self.values
    }

    /// Insertion-ordered JSON object text.
    pub fn to_json_str(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Assigns sequential `%N` names to literals, reusing a name when the same
/// value is seen again with the same inferred type.
///
/// One interner lives for exactly one parameterization call, so names are
/// unique across a whole batch.
#[derive(Debug, Default)]
pub struct PlaceholderInterner {
    table: PlaceholderTable,
    seen: HashMap<(String, String), String>,
}

impl PlaceholderInterner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `value` and returns the placeholder reference that replaces it.
    pub fn intern(&mut self, value: Value, ty: &PlaceholderType) -> Value {
        let key = match dedup_key(&value, ty) {
            Ok(key) => Some(key),
            Err(e) => {
                debug!(error = %e, ty = %ty, "placeholder value not deduplicated");
                None
            }
        };

        if let Some(name) = key.as_ref().and_then(|k| self.seen.get(k)) {
            return ty.reference(name);
        }

        let name = format!("%{}", self.table.len() + 1);
        self.table.values.insert(name.clone(), value);
        if let Some(key) = key {
            self.seen.insert(key, name.clone());
        }
        ty.reference(&name)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn finish(self) -> PlaceholderTable {
        self.table
    }
}

fn dedup_key(value: &Value, ty: &PlaceholderType) -> Result<(String, String)> {
    let ty = serde_json::to_string(ty)?;
    let value = match value {
        Value::Bytes(bytes) => BASE64.encode(bytes),
        _ => value.to_json_str()?,
    };
    Ok((ty, value))
}
