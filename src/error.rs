// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use thiserror::Error;

/// Errors raised while validating or (de)serializing a parameterization graph.
///
/// Parameterization itself never fails; these only surface at the boundary
/// where a graph is loaded or produced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("unknown param graph format: 0x{format:02x}")]
    UnknownFormat { format: u8 },

    #[error("param graph data truncated at offset {offset} (need {needed} more bytes)")]
    Truncated { offset: usize, needed: usize },

    #[error("param graph blob is not valid base64url: {0}")]
    InvalidEncoding(String),

    #[error("root key `{key}` not found in strings table")]
    RootKeyMissing { key: String },

    #[error("string index {index} out of range (table has {len} entries)")]
    StringIndexOutOfRange { index: u32, len: usize },

    #[error("enum index {index} out of range (table has {len} entries)")]
    EnumIndexOutOfRange { index: u32, len: usize },

    #[error("{kind} node {id} out of range ({len} nodes)")]
    NodeOutOfRange {
        kind: &'static str,
        id: u32,
        len: usize,
    },

    #[error("param graph too large: {what} = {value}")]
    TooLarge { what: &'static str, value: usize },
}
