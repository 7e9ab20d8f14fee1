// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Binary form of a [`ParamGraph`].
//!
//! Names stay in plain string tables; the structure is packed into a
//! little-endian blob carried as unpadded base64url text.
//!
//! ```text
//! header      format: u8 (0x00 compact, 0x01 wide), padding 1|3,
//!             input node count, output node count, root count
//! input node  edge count, then per edge:
//!             field, mask: u16, [padding 2 (wide)], child, enum,
//!             flags: u8, padding 1|3
//! output node edge count, then per edge: field, args, output
//! root        key (string index), args, output
//! ```
//!
//! Every unlabelled slot is a word: u16 in the compact format, u32 in the
//! wide one. The all-ones word means "none".

use super::{
    EdgeFlags, InputEdge, InputNode, NodeId, OutputEdge, OutputNode, ParamGraph, RootEntry,
    ScalarMask,
};
use crate::error::GraphError;

use std::collections::{BTreeMap, HashMap};

use data_encoding::BASE64URL_NOPAD;
use serde::{Deserialize, Serialize};
use tracing::debug;

const FORMAT_COMPACT: u8 = 0x00;
const FORMAT_WIDE: u8 = 0x01;

const NONE_COMPACT: u32 = 0xFFFF;
const NONE_WIDE: u32 = 0xFFFF_FFFF;

// The all-ones word is reserved for "none".
const MAX_COMPACT_INDEX: usize = 0xFFFE;
const MAX_WIDE_INDEX: usize = 0xFFFF_FFFE;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedParamGraph {
    pub strings: Vec<String>,
    #[serde(default)]
    pub enum_names: Vec<String>,
    pub graph: String,
}

impl SerializedParamGraph {
    pub fn from_json_str(json: &str) -> anyhow::Result<SerializedParamGraph> {
        Ok(serde_json::from_str(json)?)
    }
}

impl ParamGraph {
    pub fn to_serialized(&self) -> Result<SerializedParamGraph, GraphError> {
        self.validate()?;

        let largest = [
            self.strings.len(),
            self.enum_names.len(),
            self.input_nodes.len(),
            self.output_nodes.len(),
            self.roots.len(),
        ]
        .into_iter()
        .max()
        .unwrap_or(0);
        if largest > MAX_WIDE_INDEX {
            return Err(GraphError::TooLarge {
                what: "table",
                value: largest,
            });
        }

        let mut writer = Writer::new(largest > MAX_COMPACT_INDEX);
        writer.header(
            self.input_nodes.len(),
            self.output_nodes.len(),
            self.roots.len(),
        )?;

        for node in &self.input_nodes {
            writer.count(node.edges.len())?;
            for (field, edge) in &node.edges {
                writer.input_edge(*field, edge)?;
            }
        }

        for node in &self.output_nodes {
            writer.count(node.edges.len())?;
            for (field, edge) in &node.edges {
                writer.word(*field)?;
                writer.optional_word(edge.args)?;
                writer.optional_word(edge.output)?;
            }
        }

        // First occurrence wins, as in the view's name lookup.
        let mut key_index: HashMap<&str, usize> = HashMap::with_capacity(self.strings.len());
        for (i, s) in self.strings.iter().enumerate() {
            key_index.entry(s.as_str()).or_insert(i);
        }
        for (key, root) in &self.roots {
            let index = key_index
                .get(key.as_str())
                .ok_or_else(|| GraphError::RootKeyMissing { key: key.clone() })?;
            writer.count(*index)?;
            writer.optional_word(root.args)?;
            writer.optional_word(root.output)?;
        }

        Ok(SerializedParamGraph {
            strings: self.strings.clone(),
            enum_names: self.enum_names.clone(),
            graph: BASE64URL_NOPAD.encode(&writer.buffer),
        })
    }

    pub fn from_serialized(serialized: &SerializedParamGraph) -> Result<ParamGraph, GraphError> {
        // Padded input is tolerated.
        let blob = BASE64URL_NOPAD
            .decode(serialized.graph.trim_end_matches('=').as_bytes())
            .map_err(|e| GraphError::InvalidEncoding(e.to_string()))?;

        let mut reader = Reader::new(&blob);
        let (input_count, output_count, root_count) = reader.header()?;

        let mut input_nodes = vec![];
        for _ in 0..input_count {
            let edge_count = reader.word()?;
            let mut edges = BTreeMap::new();
            for _ in 0..edge_count {
                let (field, edge) = reader.input_edge()?;
                edges.insert(field, edge);
            }
            input_nodes.push(InputNode { edges });
        }

        let mut output_nodes = vec![];
        for _ in 0..output_count {
            let edge_count = reader.word()?;
            let mut edges = BTreeMap::new();
            for _ in 0..edge_count {
                let field = reader.word()?;
                let args = reader.optional_word()?;
                let output = reader.optional_word()?;
                edges.insert(field, OutputEdge { args, output });
            }
            output_nodes.push(OutputNode { edges });
        }

        let mut roots = BTreeMap::new();
        for _ in 0..root_count {
            let key_index = reader.word()?;
            let args = reader.optional_word()?;
            let output = reader.optional_word()?;
            let key = usize::try_from(key_index)
                .ok()
                .and_then(|i| serialized.strings.get(i))
                .ok_or(GraphError::StringIndexOutOfRange {
                    index: key_index,
                    len: serialized.strings.len(),
                })?;
            roots.insert(key.clone(), RootEntry { args, output });
        }

        let graph = ParamGraph {
            strings: serialized.strings.clone(),
            enum_names: serialized.enum_names.clone(),
            input_nodes,
            output_nodes,
            roots,
        };
        graph.validate()?;

        debug!(
            wide = reader.wide,
            input_nodes = graph.input_nodes.len(),
            output_nodes = graph.output_nodes.len(),
            roots = graph.roots.len(),
            "decoded param graph"
        );
        Ok(graph)
    }
}

struct Writer {
    buffer: Vec<u8>,
    wide: bool,
}

impl Writer {
    fn new(wide: bool) -> Self {
        Self {
            buffer: Vec::new(),
            wide,
        }
    }

    const fn none(&self) -> u32 {
        if self.wide {
            NONE_WIDE
        } else {
            NONE_COMPACT
        }
    }

    fn padding(&mut self, len: usize) {
        self.buffer.resize(self.buffer.len() + len, 0);
    }

    fn header(&mut self, inputs: usize, outputs: usize, roots: usize) -> Result<(), GraphError> {
        self.buffer
            .push(if self.wide { FORMAT_WIDE } else { FORMAT_COMPACT });
        self.padding(if self.wide { 3 } else { 1 });
        self.count(inputs)?;
        self.count(outputs)?;
        self.count(roots)
    }

    fn word(&mut self, value: u32) -> Result<(), GraphError> {
        if self.wide {
            self.buffer.extend_from_slice(&value.to_le_bytes());
        } else {
            let value = u16::try_from(value).map_err(|_| GraphError::TooLarge {
                what: "compact word",
                value: usize::try_from(value).unwrap_or(usize::MAX),
            })?;
            self.buffer.extend_from_slice(&value.to_le_bytes());
        }
        Ok(())
    }

    fn count(&mut self, value: usize) -> Result<(), GraphError> {
        let word = u32::try_from(value).map_err(|_| GraphError::TooLarge {
            what: "count",
            value,
        })?;
        self.word(word)
    }

    fn optional_word(&mut self, value: Option<u32>) -> Result<(), GraphError> {
        let none = self.none();
        self.word(value.unwrap_or(none))
    }

    fn input_edge(&mut self, field: u32, edge: &InputEdge) -> Result<(), GraphError> {
        self.word(field)?;
        self.buffer
            .extend_from_slice(&edge.scalar_mask.bits().to_le_bytes());
        if self.wide {
            self.padding(2);
        }
        self.optional_word(edge.child)?;
        self.optional_word(edge.enum_index)?;
        self.buffer.push(edge.flags.bits());
        self.padding(if self.wide { 3 } else { 1 });
        Ok(())
    }
}

struct Reader<'a> {
    data: &'a [u8],
    offset: usize,
    wide: bool,
}

impl<'a> Reader<'a> {
    const fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            offset: 0,
            wide: false,
        }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], GraphError> {
        let end = self.offset.saturating_add(len);
        let bytes = self
            .data
            .get(self.offset..end)
            .ok_or(GraphError::Truncated {
                offset: self.offset,
                needed: end.saturating_sub(self.data.len()),
            })?;
        self.offset = end;
        Ok(bytes)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], GraphError> {
        let offset = self.offset;
        self.take(N)?
            .try_into()
            .map_err(|_| GraphError::Truncated { offset, needed: N })
    }

    fn byte(&mut self) -> Result<u8, GraphError> {
        let [b] = self.array::<1>()?;
        Ok(b)
    }

    fn u16(&mut self) -> Result<u16, GraphError> {
        Ok(u16::from_le_bytes(self.array()?))
    }

    fn u32(&mut self) -> Result<u32, GraphError> {
        Ok(u32::from_le_bytes(self.array()?))
    }

    fn word(&mut self) -> Result<u32, GraphError> {
        if self.wide {
            self.u32()
        } else {
            self.u16().map(u32::from)
        }
    }

    fn optional_word(&mut self) -> Result<Option<NodeId>, GraphError> {
        let none = if self.wide { NONE_WIDE } else { NONE_COMPACT };
        let value = self.word()?;
        Ok((value != none).then_some(value))
    }

    fn skip(&mut self, len: usize) -> Result<(), GraphError> {
        self.take(len).map(|_| ())
    }

    fn header(&mut self) -> Result<(u32, u32, u32), GraphError> {
        let format = self.byte()?;
        self.wide = match format {
            FORMAT_COMPACT => false,
            FORMAT_WIDE => true,
            _ => return Err(GraphError::UnknownFormat { format }),
        };
        self.skip(if self.wide { 3 } else { 1 })?;
        Ok((self.word()?, self.word()?, self.word()?))
    }

    fn input_edge(&mut self) -> Result<(u32, InputEdge), GraphError> {
        let field = self.word()?;
        let scalar_mask = ScalarMask::from_bits(self.u16()?);
        if self.wide {
            self.skip(2)?;
        }
        let child = self.optional_word()?;
        let enum_index = self.optional_word()?;
        let flags = EdgeFlags::from_bits(self.byte()?);
        self.skip(if self.wide { 3 } else { 1 })?;
        Ok((
            field,
            InputEdge {
                flags,
                scalar_mask,
                child,
                enum_index,
            },
        ))
    }
}
