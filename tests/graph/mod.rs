// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::common::{self, SCHEMA_PATH};

use query_parameterizer::*;

use anyhow::Result;

fn schema_graph() -> Result<ParamGraph> {
    Ok(common::graph_from_yaml(&std::fs::read_to_string(SCHEMA_PATH)?)?.0)
}

#[test]
fn serialized_graph_round_trips() -> Result<()> {
    let graph = schema_graph()?;
    let serialized = graph.to_serialized()?;

    // Compact format.
    assert!(serialized.graph.starts_with("AA"));
    assert!(!serialized.graph.contains('='));

    let decoded = ParamGraph::from_serialized(&serialized)?;
    assert_eq!(decoded, graph);
    Ok(())
}

#[test]
fn serialized_graph_as_json() -> Result<()> {
    let serialized = schema_graph()?.to_serialized()?;
    let json = serde_json::to_string(&serialized)?;
    assert!(json.contains(r#""enumNames":["Role"]"#));
    assert_eq!(SerializedParamGraph::from_json_str(&json)?, serialized);
    Ok(())
}

#[test]
fn decoded_view_parameterizes_the_same() -> Result<()> {
    let view = common::schema_view()?;
    let serialized = view.graph().to_serialized()?;
    let decoded = ParamGraphView::from_serialized(&serialized, view.enums().clone())?;

    let q = common::query(
        r#"{"modelName":"User","action":"findMany","query":{"arguments":{"where":{"id":1,"role":"USER"}}}}"#,
    )?;
    assert_eq!(parameterize_query(&q, &view), parameterize_query(&q, &decoded));
    Ok(())
}

#[test]
fn large_graphs_use_the_wide_format() -> Result<()> {
    let mut builder = GraphBuilder::new();
    for i in 0..70_000 {
        builder.intern(&format!("field{i}"))?;
    }
    let node = builder.input_node()?;
    builder.input_edge(node, "field69999", InputEdge::scalar(ScalarMask::INT))?;
    builder.root("big", RootEntry { args: Some(node), output: None })?;
    let graph = builder.build()?;

    let serialized = graph.to_serialized()?;
    // 0x01 followed by padding.
    assert!(serialized.graph.starts_with("AQAA"));
    assert_eq!(ParamGraph::from_serialized(&serialized)?, graph);
    Ok(())
}

#[test]
fn json_graph_form() -> Result<()> {
    let graph = ParamGraph::from_json_str(
        r#"{
            "strings": ["where", "id", "User.findUnique"],
            "inputNodes": [
                {"edges": {"0": {"flags": 16, "child": 1}}},
                {"edges": {"1": {"flags": 1, "scalarMask": 2}}}
            ],
            "roots": {"User.findUnique": {"args": 0}}
        }"#,
    )?;
    let view = ParamGraphView::new(graph, EnumCatalog::new());
    let edge = view.input_edge(view.input_node(Some(1)), "id");
    assert_eq!(edge, Some(&InputEdge::scalar(ScalarMask::INT)));
    Ok(())
}

#[test]
fn json_graph_out_of_range() {
    let err = ParamGraph::from_json_str(
        r#"{"strings": ["a"], "inputNodes": [{"edges": {"0": {"flags": 16, "child": 4}}}]}"#,
    )
    .unwrap_err();
    assert!(err.to_string().contains("input node 4 out of range"));
}

#[test]
fn decode_errors() {
    let decode = |graph: &str, strings: &[&str]| {
        ParamGraph::from_serialized(&SerializedParamGraph {
            strings: strings.iter().map(|s| s.to_string()).collect(),
            enum_names: vec![],
            graph: graph.to_string(),
        })
    };

    // Format byte 0x02.
    assert_eq!(
        decode("AgA", &[]),
        Err(GraphError::UnknownFormat { format: 2 })
    );
    assert!(matches!(
        decode("AAA", &[]),
        Err(GraphError::Truncated { .. })
    ));
    assert!(matches!(
        decode("not base64!", &[]),
        Err(GraphError::InvalidEncoding(_))
    ));

    // One root whose key index (0) is past an empty string table.
    let blob = data_encoding::BASE64URL_NOPAD.encode(&[
        0, 0, 0, 0, 0, 0, 1, 0, // header
        0, 0, 0xFF, 0xFF, 0xFF, 0xFF, // root
    ]);
    assert_eq!(
        decode(&blob, &[]),
        Err(GraphError::StringIndexOutOfRange { index: 0, len: 0 })
    );
}

#[test]
fn encode_requires_root_keys_in_strings() {
    let mut graph = ParamGraph::default();
    graph.roots.insert("User.findMany".to_string(), RootEntry::default());
    assert_eq!(
        graph.to_serialized(),
        Err(GraphError::RootKeyMissing {
            key: "User.findMany".to_string()
        })
    );
}
