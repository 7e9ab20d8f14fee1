// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::common;

use query_parameterizer::*;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use test_generator::test_resources;

mod properties;

#[derive(Serialize, Deserialize, PartialEq, Debug)]
#[serde(deny_unknown_fields)]
struct TestCase {
    note: String,
    query: Option<Value>,
    batch: Option<Value>,
    want: Value,
    want_placeholders: Value,
    max_depth: Option<usize>,
    skip: Option<bool>,
}

#[derive(Serialize, Deserialize, PartialEq, Debug)]
struct YamlTest {
    cases: Vec<TestCase>,
}

fn as_value<T: Serialize>(t: &T) -> Result<Value> {
    Value::from_json_str(&serde_json::to_string(t)?)
}

fn run_case(view: &ParamGraphView, case: &TestCase) -> Result<()> {
    let mut parameterizer = Parameterizer::new(view);
    if let Some(max_depth) = case.max_depth {
        parameterizer = parameterizer.with_config(ParameterizeConfig::with_max_depth(max_depth));
    }

    let (actual, placeholders) = match (&case.query, &case.batch) {
        (Some(query), None) => {
            let result = parameterizer.query(&JsonQuery::from_value(query)?);
            (as_value(&result.query)?, result.placeholders)
        }
        (None, Some(batch)) => {
            let result = parameterizer.batch(&JsonBatchQuery::from_value(batch)?);
            (as_value(&result.batch)?, result.placeholders)
        }
        _ => bail!("case `{}` needs exactly one of query or batch", case.note),
    };

    // Compared as text: `Value` equality treats 1 and 1.0 alike.
    let (want, got) = (case.want.to_json_str()?, actual.to_json_str()?);
    if want != got {
        bail!("rewritten query mismatch\n  want: {want}\n   got: {got}");
    }

    let want = case.want_placeholders.to_json_str()?;
    let got = as_value(&placeholders)?.to_json_str()?;
    if want != got {
        bail!("placeholder mismatch\n  want: {want}\n   got: {got}");
    }

    // Names are handed out in order.
    for (i, name) in placeholders.names().enumerate() {
        assert_eq!(name, format!("%{}", i + 1));
    }

    Ok(())
}

fn yaml_test_impl(file: &str) -> Result<()> {
    let yaml_str = std::fs::read_to_string(file)?;
    let test: YamlTest = serde_yaml::from_str(&yaml_str)?;
    let view = common::schema_view()?;

    std::eprintln!("running {file}");

    for case in &test.cases {
        std::eprint!("case {} ", case.note);
        if case.skip == Some(true) {
            std::eprintln!("skipped");
            continue;
        }

        if let Err(e) = run_case(&view, case) {
            bail!("case `{}` failed: {e}", case.note);
        }
        std::eprintln!("passed");
    }

    Ok(())
}

fn yaml_test(file: &str) -> Result<()> {
    match yaml_test_impl(file) {
        Ok(_) => Ok(()),
        Err(e) => {
            // If Err is returned, it doesn't always get printed by cargo test.
            // Therefore, panic with the error.
            panic!("{e}");
        }
    }
}

#[test_resources("tests/parameterize/cases/*.yaml")]
fn run(path: &str) {
    yaml_test(path).unwrap()
}
