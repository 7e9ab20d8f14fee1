// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::value::Value;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Arguments and result selection of one query or nested relation field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSelection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    pub action: String,
    pub query: FieldSelection,
}

impl JsonQuery {
    pub fn from_json_str(json: &str) -> Result<JsonQuery> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_value(value: &Value) -> Result<JsonQuery> {
        Self::from_json_str(&value.to_json_str()?)
    }

    pub fn to_json_str(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// `Model.action`, or the bare action for model-less operations.
    pub fn root_key(&self) -> String {
        match &self.model_name {
            Some(model) => format!("{model}.{}", self.action),
            None => self.action.clone(),
        }
    }
}

/// Queries sent together. Transaction metadata is opaque.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonBatchQuery {
    pub batch: Vec<JsonQuery>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction: Option<Value>,
}

impl JsonBatchQuery {
    pub fn from_json_str(json: &str) -> Result<JsonBatchQuery> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_value(value: &Value) -> Result<JsonBatchQuery> {
        Self::from_json_str(&value.to_json_str()?)
    }

    pub fn to_json_str(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
