// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Schema-aware parameterization of structured database queries.
//!
//! Given a query document (`modelName`, `action`, `query.arguments`,
//! `query.selection`) and a compact [`ParamGraph`] describing which fields may
//! carry user supplied literals, [`parameterize_query`] replaces every eligible
//! literal by a typed `{"$type":"Param"}` placeholder and returns the original
//! values in a [`PlaceholderTable`]. Two queries that only differ in literal
//! values produce byte-identical rewritten queries, which makes the rewritten
//! form usable as a cache key for compiled query plans.
//!
//! ```ignore
//! use query_parameterizer::*;
//!
//! let view = ParamGraphView::new(graph, EnumCatalog::default());
//! let query = JsonQuery::from_json_str(r#"{"modelName":"User","action":"findUnique",
//!     "query":{"arguments":{"where":{"id":1}},"selection":{"$scalars":true}}}"#)?;
//! let result = parameterize_query(&query, &view);
//! assert_eq!(result.placeholders.len(), 1);
//! ```

mod classify;
mod config;
mod error;
pub mod graph;
mod interner;
mod number;
mod parameterize;
mod placeholder;
mod query;
mod value;
mod view;

pub use classify::{classify, ScalarTag, ValueClass, SCALAR_TAGS};
pub use config::{ParameterizeConfig, DEFAULT_MAX_DEPTH};
pub use error::GraphError;
pub use graph::{
    EdgeFlags, GraphBuilder, InputEdge, InputNode, NodeId, OutputEdge, OutputNode, ParamGraph,
    RootEntry, ScalarMask, SerializedParamGraph,
};
pub use interner::{PlaceholderInterner, PlaceholderTable};
pub use number::Number;
pub use parameterize::{
    parameterize_batch, parameterize_query, ParameterizedBatch, ParameterizedQuery,
    Parameterizer,
};
pub use placeholder::PlaceholderType;
pub use query::{FieldSelection, JsonBatchQuery, JsonQuery};
pub use value::Value;
pub use view::{EnumCatalog, ParamGraphView};

#[cfg(feature = "arc")]
pub(crate) use std::sync::Arc as Rc;

#[cfg(not(feature = "arc"))]
pub(crate) use std::rc::Rc;

#[cfg(test)]
mod tests;
