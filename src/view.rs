// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::error::GraphError;
use crate::graph::{
    InputEdge, InputNode, NodeId, OutputEdge, OutputNode, ParamGraph, RootEntry,
    SerializedParamGraph,
};

use std::collections::{BTreeMap, HashMap};

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Members of every enum type the graph refers to, keyed by enum name.
///
/// Deserializes from `{"Role": ["ADMIN", "USER"], ...}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnumCatalog {
    enums: BTreeMap<String, IndexSet<String>>,
}

impl EnumCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> anyhow::Result<EnumCatalog> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn insert<I, S>(&mut self, name: &str, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enums
            .insert(name.to_string(), values.into_iter().map(Into::into).collect());
    }

    pub fn get(&self, name: &str) -> Option<&IndexSet<String>> {
        self.enums.get(name)
    }

    pub fn len(&self) -> usize {
        self.enums.len()
    }

    pub fn is_empty(&self) -> bool {
        self.enums.is_empty()
    }
}

/// Read-only accessor over a [`ParamGraph`] that resolves field names in
/// constant time.
///
/// Every lookup is total. A missing id, an out of range id or an unknown name
/// yields `None`; a schema gap is an expected outcome, not an error.
#[derive(Debug, Clone)]
pub struct ParamGraphView {
    graph: ParamGraph,
    enums: EnumCatalog,
    string_index: HashMap<String, u32>,
}

impl ParamGraphView {
    pub fn new(graph: ParamGraph, enums: EnumCatalog) -> Self {
        let mut string_index = HashMap::with_capacity(graph.strings.len());
        for (index, name) in graph.strings.iter().enumerate() {
            let Ok(index) = u32::try_from(index) else {
                break;
            };
            // First occurrence wins if the table repeats a name.
            string_index.entry(name.clone()).or_insert(index);
        }

        Self {
            graph,
            enums,
            string_index,
        }
    }

    pub fn from_serialized(
        serialized: &SerializedParamGraph,
        enums: EnumCatalog,
    ) -> Result<Self, GraphError> {
        Ok(Self::new(ParamGraph::from_serialized(serialized)?, enums))
    }

    pub fn graph(&self) -> &ParamGraph {
        &self.graph
    }

    pub fn enums(&self) -> &EnumCatalog {
        &self.enums
    }

    pub fn string_index(&self, name: &str) -> Option<u32> {
        self.string_index.get(name).copied()
    }

    pub fn root(&self, key: &str) -> Option<&RootEntry> {
        self.graph.roots.get(key)
    }

    pub fn input_node(&self, id: Option<NodeId>) -> Option<&InputNode> {
        self.graph.input_node(id?)
    }

    pub fn output_node(&self, id: Option<NodeId>) -> Option<&OutputNode> {
        self.graph.output_node(id?)
    }

    pub fn input_edge<'a>(
        &'a self,
        node: Option<&'a InputNode>,
        field: &str,
    ) -> Option<&'a InputEdge> {
        node?.edges.get(&self.string_index(field)?)
    }

    pub fn output_edge<'a>(
        &'a self,
        node: Option<&'a OutputNode>,
        field: &str,
    ) -> Option<&'a OutputEdge> {
        node?.edges.get(&self.string_index(field)?)
    }

    /// Members of the enum an edge refers to, in declaration order.
    pub fn enum_values(&self, edge: Option<&InputEdge>) -> Option<&IndexSet<String>> {
        let name = self.graph.enum_name(edge?.enum_index?)?;
        self.enums.get(name)
    }
}
