// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use super::{InputEdge, InputNode, NodeId, OutputEdge, OutputNode, ParamGraph, RootEntry};
use crate::error::GraphError;

use std::collections::HashMap;

/// Incremental construction of a [`ParamGraph`].
///
/// Field names, root keys and enum names are interned on first use, so the
/// resulting tables hold each name once.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    graph: ParamGraph,
    string_index: HashMap<String, u32>,
    enum_index: HashMap<String, u32>,
}

fn next_index(len: usize, what: &'static str) -> Result<u32, GraphError> {
    u32::try_from(len)
        .ok()
        .filter(|n| *n != u32::MAX)
        .ok_or(GraphError::TooLarge { what, value: len })
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, s: &str) -> Result<u32, GraphError> {
        if let Some(index) = self.string_index.get(s) {
            return Ok(*index);
        }
        let index = next_index(self.graph.strings.len(), "strings")?;
        self.graph.strings.push(s.to_string());
        self.string_index.insert(s.to_string(), index);
        Ok(index)
    }

    pub fn enum_name(&mut self, name: &str) -> Result<u32, GraphError> {
        if let Some(index) = self.enum_index.get(name) {
            return Ok(*index);
        }
        let index = next_index(self.graph.enum_names.len(), "enum names")?;
        self.graph.enum_names.push(name.to_string());
        self.enum_index.insert(name.to_string(), index);
        Ok(index)
    }

    pub fn input_node(&mut self) -> Result<NodeId, GraphError> {
        let id = next_index(self.graph.input_nodes.len(), "input nodes")?;
        self.graph.input_nodes.push(InputNode::default());
        Ok(id)
    }

    pub fn output_node(&mut self) -> Result<NodeId, GraphError> {
        let id = next_index(self.graph.output_nodes.len(), "output nodes")?;
        self.graph.output_nodes.push(OutputNode::default());
        Ok(id)
    }

    pub fn input_edge(
        &mut self,
        node: NodeId,
        field: &str,
        edge: InputEdge,
    ) -> Result<&mut Self, GraphError> {
        let field = self.intern(field)?;
        let len = self.graph.input_nodes.len();
        let target = usize::try_from(node)
            .ok()
            .and_then(|n| self.graph.input_nodes.get_mut(n))
            .ok_or(GraphError::NodeOutOfRange {
                kind: "input",
                id: node,
                len,
            })?;
        target.edges.insert(field, edge);
        Ok(self)
    }

    pub fn output_edge(
        &mut self,
        node: NodeId,
        field: &str,
        edge: OutputEdge,
    ) -> Result<&mut Self, GraphError> {
        let field = self.intern(field)?;
        let len = self.graph.output_nodes.len();
        let target = usize::try_from(node)
            .ok()
            .and_then(|n| self.graph.output_nodes.get_mut(n))
            .ok_or(GraphError::NodeOutOfRange {
                kind: "output",
                id: node,
                len,
            })?;
        target.edges.insert(field, edge);
        Ok(self)
    }

    /// Registers an entry point. The key is interned so the graph can be
    /// encoded in the binary form.
    pub fn root(&mut self, key: &str, entry: RootEntry) -> Result<&mut Self, GraphError> {
        self.intern(key)?;
        self.graph.roots.insert(key.to_string(), entry);
        Ok(self)
    }

    pub fn build(self) -> Result<ParamGraph, GraphError> {
        self.graph.validate()?;
        Ok(self.graph)
    }
}
