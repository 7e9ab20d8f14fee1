// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Rewrites queries so that every literal the graph marks as eligible is
//! replaced by a typed placeholder.
//!
//! The query and the graph are walked together: each argument object is
//! paired with the input node describing it, each selection with its output
//! node. Whenever the graph has nothing to say about a value the value is
//! copied unchanged.

use crate::classify::{classify, ScalarTag, ValueClass};
use crate::config::ParameterizeConfig;
use crate::graph::{EdgeFlags, InputEdge, InputNode, NodeId, OutputEdge, ScalarMask};
use crate::interner::{PlaceholderInterner, PlaceholderTable};
use crate::placeholder::PlaceholderType;
use crate::query::{JsonBatchQuery, JsonQuery};
use crate::value::Value;
use crate::view::ParamGraphView;
use crate::Rc;

use std::collections::BTreeMap;

use anyhow::Result;
use data_encoding::{BASE64, BASE64_NOPAD};
use serde::Serialize;
use tracing::{debug, trace};

const SCALARS_MARKER: &str = "$scalars";
const COMPOSITES_MARKER: &str = "$composites";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterizedQuery {
    pub query: JsonQuery,
    pub placeholders: PlaceholderTable,
}

impl ParameterizedQuery {
    /// Compact JSON of the rewritten query. Equal for queries that differ
    /// only in eligible literal values.
    pub fn cache_key(&self) -> Result<String> {
        self.query.to_json_str()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterizedBatch {
    pub batch: JsonBatchQuery,
    pub placeholders: PlaceholderTable,
}

impl ParameterizedBatch {
    pub fn cache_key(&self) -> Result<String> {
        self.batch.to_json_str()
    }
}

/// Parameterizes one query with the default configuration.
pub fn parameterize_query(query: &JsonQuery, view: &ParamGraphView) -> ParameterizedQuery {
    Parameterizer::new(view).query(query)
}

/// Parameterizes a batch with the default configuration. Placeholder names
/// are shared across the whole batch.
pub fn parameterize_batch(batch: &JsonBatchQuery, view: &ParamGraphView) -> ParameterizedBatch {
    Parameterizer::new(view).batch(batch)
}

/// Entry point bound to a graph view. Cheap to create; holds no per-call
/// state, so one instance may serve any number of threads.
#[derive(Debug, Clone, Copy)]
pub struct Parameterizer<'a> {
    view: &'a ParamGraphView,
    config: ParameterizeConfig,
}

impl<'a> Parameterizer<'a> {
    pub fn new(view: &'a ParamGraphView) -> Self {
        Self {
            view,
            config: ParameterizeConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ParameterizeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ParameterizeConfig {
        &self.config
    }

    pub fn query(&self, query: &JsonQuery) -> ParameterizedQuery {
        let mut traversal = Traversal::new(self.view, self.config);
        let query = traversal.query(query);
        let placeholders = traversal.interner.finish();
        trace!(
            root = %query.root_key(),
            placeholders = placeholders.len(),
            "parameterized query"
        );
        ParameterizedQuery {
            query,
            placeholders,
        }
    }

    pub fn batch(&self, batch: &JsonBatchQuery) -> ParameterizedBatch {
        let mut traversal = Traversal::new(self.view, self.config);
        let queries = batch.batch.iter().map(|q| traversal.query(q)).collect();
        let placeholders = traversal.interner.finish();
        trace!(
            queries = batch.batch.len(),
            placeholders = placeholders.len(),
            "parameterized batch"
        );
        ParameterizedBatch {
            batch: JsonBatchQuery {
                batch: queries,
                transaction: batch.transaction.clone(),
            },
            placeholders,
        }
    }
}

/// State of one call: the graph being followed and the placeholders
/// assigned so far.
struct Traversal<'a> {
    view: &'a ParamGraphView,
    config: ParameterizeConfig,
    interner: PlaceholderInterner,
}

impl<'a> Traversal<'a> {
    fn new(view: &'a ParamGraphView, config: ParameterizeConfig) -> Self {
        Self {
            view,
            config,
            interner: PlaceholderInterner::new(),
        }
    }

    fn query(&mut self, query: &JsonQuery) -> JsonQuery {
        let key = query.root_key();
        let Some(root) = self.view.root(&key).copied() else {
            debug!(root = %key, "no param graph root; query left unchanged");
            return query.clone();
        };

        let mut rewritten = query.clone();
        if let Some(arguments) = &query.query.arguments {
            rewritten.query.arguments = Some(self.arguments(arguments, root.args, 1));
        }
        if let Some(selection) = &query.query.selection {
            rewritten.query.selection = Some(self.selection(selection, root.output, 1));
        }
        rewritten
    }

    /// An `arguments` object. Without a resolvable node the whole subtree is
    /// kept as is; tagged values such as `Raw` are never entered.
    fn arguments(&mut self, arguments: &Value, node: Option<NodeId>, depth: usize) -> Value {
        let view = self.view;
        match (classify(arguments), view.input_node(node)) {
            (ValueClass::Object(fields), Some(node)) => {
                self.input_object(arguments, fields, node, depth)
            }
            _ => arguments.clone(),
        }
    }

    fn input_object(
        &mut self,
        original: &Value,
        fields: &BTreeMap<Rc<str>, Value>,
        node: &InputNode,
        depth: usize,
    ) -> Value {
        if !self.config.allows(depth) {
            trace!(depth, "max depth reached; arguments left unchanged");
            return original.clone();
        }

        let view = self.view;
        let mut rewritten = BTreeMap::new();
        for (name, value) in fields.iter() {
            let value = match view.input_edge(Some(node), name) {
                Some(edge) => self.field(value, edge, depth + 1),
                None => value.clone(),
            };
            rewritten.insert(name.clone(), value);
        }
        Value::from(rewritten)
    }

    fn field(&mut self, value: &Value, edge: &InputEdge, depth: usize) -> Value {
        match classify(value) {
            ValueClass::Null => value.clone(),
            ValueClass::Structural(_) => value.clone(),
            ValueClass::Primitive(literal) => self
                .primitive(literal, edge)
                .unwrap_or_else(|| value.clone()),
            ValueClass::TaggedScalar(tag, inner) => self
                .tagged_scalar(tag, inner, edge)
                .unwrap_or_else(|| value.clone()),
            ValueClass::Array(items) => self.array(value, items, edge, depth),
            ValueClass::Object(fields) => self.object(value, fields, edge, depth),
        }
    }

    fn primitive(&mut self, literal: &Value, edge: &InputEdge) -> Option<Value> {
        if let Value::String(s) = literal {
            if edge.has(EdgeFlags::ENUM) {
                if let Some(members) = self.view.enum_values(Some(edge)) {
                    // A non-member is left for downstream validation.
                    return members
                        .contains(s.as_ref())
                        .then(|| self.interner.intern(literal.clone(), &PlaceholderType::Enum));
                }
            }
        }

        if !edge.has(EdgeFlags::SCALAR) {
            return None;
        }
        let ty = PlaceholderType::of_primitive(literal)?;
        if !ty.accepted_by(edge.scalar_mask) {
            return None;
        }
        Some(self.interner.intern(literal.clone(), &ty))
    }

    fn tagged_scalar(&mut self, tag: ScalarTag, inner: &Value, edge: &InputEdge) -> Option<Value> {
        if !edge.has(EdgeFlags::SCALAR) || !edge.scalar_mask.intersects(tag.mask()) {
            return None;
        }
        let decoded = decode_tagged(tag, inner)?;
        Some(self.interner.intern(decoded, &PlaceholderType::of_tag(tag)))
    }

    fn array(&mut self, original: &Value, items: &[Value], edge: &InputEdge, depth: usize) -> Value {
        let view = self.view;

        if edge.has(EdgeFlags::LIST_OBJECT) {
            if let Some(child) = view.input_node(edge.child) {
                if !self.config.allows(depth) {
                    return original.clone();
                }
                let items = items
                    .iter()
                    .map(|item| match classify(item) {
                        ValueClass::Object(fields) => {
                            self.input_object(item, fields, child, depth + 1)
                        }
                        _ => item.clone(),
                    })
                    .collect::<Vec<_>>();
                return Value::from(items);
            }
        }

        if edge.scalar_mask.intersects(ScalarMask::JSON) {
            if let Some(placeholder) = self.json(original) {
                return placeholder;
            }
        }

        if edge.has(EdgeFlags::LIST_ENUM) && !items.is_empty() {
            if let Some(members) = view.enum_values(Some(edge)) {
                let all_members = items
                    .iter()
                    .all(|item| item.as_str().is_some_and(|s| members.contains(s)));
                if all_members {
                    let ty = PlaceholderType::list(PlaceholderType::Enum);
                    return self.interner.intern(original.clone(), &ty);
                }
            }
        }

        if edge.has(EdgeFlags::LIST_SCALAR) && !edge.scalar_mask.is_empty() {
            if let Some((decoded, ty)) = self.scalar_list(items, edge) {
                return self
                    .interner
                    .intern(Value::from(decoded), &PlaceholderType::list(ty));
            }
        }

        original.clone()
    }

    /// Decoded elements and their widened type when every element is an
    /// eligible scalar. Empty lists are never eligible.
    fn scalar_list(&self, items: &[Value], edge: &InputEdge) -> Option<(Vec<Value>, PlaceholderType)> {
        let mut decoded = Vec::with_capacity(items.len());
        let mut types = Vec::with_capacity(items.len());

        for item in items {
            let (value, ty) = match classify(item) {
                ValueClass::Primitive(literal) => {
                    let ty = self.list_element_type(literal, edge)?;
                    (literal.clone(), ty)
                }
                ValueClass::TaggedScalar(tag, inner) => {
                    if !edge.scalar_mask.intersects(tag.mask()) {
                        return None;
                    }
                    (decode_tagged(tag, inner)?, PlaceholderType::of_tag(tag))
                }
                ValueClass::Null
                | ValueClass::Structural(_)
                | ValueClass::Array(_)
                | ValueClass::Object(_) => return None,
            };
            decoded.push(value);
            types.push(ty);
        }

        let ty = PlaceholderType::widen_all(types)?;
        Some((decoded, ty))
    }

    /// Same rule as a single primitive: enum membership decides when the
    /// edge's enum resolves, the scalar mask decides otherwise.
    fn list_element_type(&self, literal: &Value, edge: &InputEdge) -> Option<PlaceholderType> {
        if let Value::String(s) = literal {
            if edge.has(EdgeFlags::ENUM) || edge.has(EdgeFlags::LIST_ENUM) {
                if let Some(members) = self.view.enum_values(Some(edge)) {
                    return members
                        .contains(s.as_ref())
                        .then_some(PlaceholderType::Enum);
                }
            }
        }
        let ty = PlaceholderType::of_primitive(literal)?;
        ty.accepted_by(edge.scalar_mask).then_some(ty)
    }

    fn object(
        &mut self,
        original: &Value,
        fields: &BTreeMap<Rc<str>, Value>,
        edge: &InputEdge,
        depth: usize,
    ) -> Value {
        let view = self.view;
        if edge.has(EdgeFlags::OBJECT) {
            if let Some(child) = view.input_node(edge.child) {
                return self.input_object(original, fields, child, depth);
            }
        }

        if edge.scalar_mask.intersects(ScalarMask::JSON) {
            if let Some(placeholder) = self.json(original) {
                return placeholder;
            }
        }

        original.clone()
    }

    /// Whole object or array as one Json placeholder holding canonical text.
    fn json(&mut self, value: &Value) -> Option<Value> {
        match value.to_json_str() {
            Ok(text) => Some(self.interner.intern(Value::from(text), &PlaceholderType::Json)),
            Err(e) => {
                debug!(error = %e, "json value could not be serialized; left unchanged");
                None
            }
        }
    }

    fn selection(&mut self, selection: &Value, node: Option<NodeId>, depth: usize) -> Value {
        let view = self.view;
        let (Value::Object(fields), Some(node)) = (selection, view.output_node(node)) else {
            return selection.clone();
        };
        if !self.config.allows(depth) {
            trace!(depth, "max depth reached; selection left unchanged");
            return selection.clone();
        }

        let mut rewritten = BTreeMap::new();
        for (name, value) in fields.iter() {
            let is_marker = name.as_ref() == SCALARS_MARKER || name.as_ref() == COMPOSITES_MARKER;
            let value = match view.output_edge(Some(node), name) {
                Some(edge) if !is_marker && !matches!(value, Value::Bool(_)) => {
                    self.nested_selection(value, edge, depth + 1)
                }
                _ => value.clone(),
            };
            rewritten.insert(name.clone(), value);
        }
        Value::from(rewritten)
    }

    /// `{arguments, selection}` of a relation field. Keys other than those
    /// two are preserved, and a missing key stays missing.
    fn nested_selection(&mut self, value: &Value, edge: &OutputEdge, depth: usize) -> Value {
        let Value::Object(fields) = value else {
            return value.clone();
        };

        let mut rewritten = fields.as_ref().clone();
        if let Some(arguments) = fields.get("arguments") {
            let arguments = self.arguments(arguments, edge.args, depth);
            rewritten.insert("arguments".into(), arguments);
        }
        if let Some(selection) = fields.get("selection") {
            let selection = self.selection(selection, edge.output, depth);
            rewritten.insert("selection".into(), selection);
        }
        Value::from(rewritten)
    }
}

/// The literal a tagged scalar stands for. `None` when the payload cannot be
/// decoded, in which case the tagged value is kept.
fn decode_tagged(tag: ScalarTag, inner: &Value) -> Option<Value> {
    match (tag, inner) {
        (_, Value::Null) => None,
        (ScalarTag::Bytes, Value::String(s)) => BASE64
            .decode(s.as_bytes())
            .or_else(|_| BASE64_NOPAD.decode(s.as_bytes()))
            .ok()
            .map(Value::bytes),
        (ScalarTag::Bytes, _) => None,
        (ScalarTag::Json, Value::String(s)) => Some(Value::from(canonical_json(s))),
        _ => Some(inner.clone()),
    }
}

/// Re-serializes JSON text with sorted keys and no insignificant whitespace.
/// Text that does not parse is kept verbatim.
fn canonical_json(text: &str) -> String {
    Value::from_json_str(text)
        .and_then(|v| v.to_json_str())
        .unwrap_or_else(|_| text.to_string())
}
