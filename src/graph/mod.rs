// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Compact description of which query fields may carry parameterizable
//! literals.
//!
//! All field names live in one string table and every other structure refers
//! to them by index. Nodes are addressed by position in `input_nodes` /
//! `output_nodes`.

mod builder;
mod flags;
mod serialization;

pub use builder::GraphBuilder;
pub use flags::{EdgeFlags, ScalarMask};
pub use serialization::SerializedParamGraph;

use crate::error::GraphError;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub type NodeId = u32;

/// Eligibility metadata of one argument field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputEdge {
    pub flags: EdgeFlags,
    #[serde(default)]
    pub scalar_mask: ScalarMask,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_index: Option<u32>,
}

impl InputEdge {
    pub const fn new(flags: EdgeFlags) -> Self {
        InputEdge {
            flags,
            scalar_mask: ScalarMask::NONE,
            child: None,
            enum_index: None,
        }
    }

    /// A field that takes a single scalar of the given kinds.
    pub const fn scalar(mask: ScalarMask) -> Self {
        InputEdge::new(EdgeFlags::SCALAR).with_mask(mask)
    }

    pub const fn with_mask(mut self, mask: ScalarMask) -> Self {
        self.scalar_mask = mask;
        self
    }

    pub const fn with_child(mut self, child: NodeId) -> Self {
        self.child = Some(child);
        self
    }

    pub const fn with_enum(mut self, enum_index: u32) -> Self {
        self.enum_index = Some(enum_index);
        self
    }

    pub const fn has(&self, flag: EdgeFlags) -> bool {
        self.flags.contains(flag)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputNode {
    /// Keyed by string table index of the field name.
    pub edges: BTreeMap<u32, InputEdge>,
}

/// Nested argument and selection schemas of a relation-shaped result field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputEdge {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<NodeId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputNode {
    pub edges: BTreeMap<u32, OutputEdge>,
}

/// Entry point of an operation, keyed by `Model.action` or a bare `action`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<NodeId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParamGraph {
    pub strings: Vec<String>,
    #[serde(default)]
    pub enum_names: Vec<String>,
    #[serde(default)]
    pub input_nodes: Vec<InputNode>,
    #[serde(default)]
    pub output_nodes: Vec<OutputNode>,
    #[serde(default)]
    pub roots: BTreeMap<String, RootEntry>,
}

impl ParamGraph {
    pub fn from_json_str(json: &str) -> anyhow::Result<ParamGraph> {
        let graph: ParamGraph = serde_json::from_str(json)?;
        graph.validate()?;
        Ok(graph)
    }

    pub fn input_node(&self, id: NodeId) -> Option<&InputNode> {
        self.input_nodes.get(usize::try_from(id).ok()?)
    }

    pub fn output_node(&self, id: NodeId) -> Option<&OutputNode> {
        self.output_nodes.get(usize::try_from(id).ok()?)
    }

    pub fn string(&self, index: u32) -> Option<&str> {
        self.strings
            .get(usize::try_from(index).ok()?)
            .map(String::as_str)
    }

    pub fn enum_name(&self, index: u32) -> Option<&str> {
        self.enum_names
            .get(usize::try_from(index).ok()?)
            .map(String::as_str)
    }

    /// Checks that every string, enum and node reference is in range.
    ///
    /// Lookups never rely on this; an unchecked graph just resolves fewer
    /// fields. It exists to reject corrupt graphs at load time.
    pub fn validate(&self) -> Result<(), GraphError> {
        for node in &self.input_nodes {
            for (field, edge) in &node.edges {
                self.check_string(*field)?;
                self.check_input(edge.child)?;
                if let Some(index) = edge.enum_index {
                    if self.enum_name(index).is_none() {
                        return Err(GraphError::EnumIndexOutOfRange {
                            index,
                            len: self.enum_names.len(),
                        });
                    }
                }
            }
        }

        for node in &self.output_nodes {
            for (field, edge) in &node.edges {
                self.check_string(*field)?;
                self.check_input(edge.args)?;
                self.check_output(edge.output)?;
            }
        }

        for root in self.roots.values() {
            self.check_input(root.args)?;
            self.check_output(root.output)?;
        }

        Ok(())
    }

    fn check_string(&self, index: u32) -> Result<(), GraphError> {
        match self.string(index) {
            Some(_) => Ok(()),
            None => Err(GraphError::StringIndexOutOfRange {
                index,
                len: self.strings.len(),
            }),
        }
    }

    fn check_input(&self, id: Option<NodeId>) -> Result<(), GraphError> {
        match id {
            Some(id) if self.input_node(id).is_none() => Err(GraphError::NodeOutOfRange {
                kind: "input",
                id,
                len: self.input_nodes.len(),
            }),
            _ => Ok(()),
        }
    }

    fn check_output(&self, id: Option<NodeId>) -> Result<(), GraphError> {
        match id {
            Some(id) if self.output_node(id).is_none() => Err(GraphError::NodeOutOfRange {
                kind: "output",
                id,
                len: self.output_nodes.len(),
            }),
            _ => Ok(()),
        }
    }
}
