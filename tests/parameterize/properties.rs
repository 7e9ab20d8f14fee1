// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::common::{query, schema_view};

use query_parameterizer::*;

use anyhow::Result;

fn find_many(where_json: &str) -> String {
    format!(
        r#"{{"modelName":"User","action":"findMany","query":{{"arguments":{{"where":{where_json}}},"selection":{{"$scalars":true}}}}}}"#
    )
}

#[test]
fn same_shape_same_cache_key() -> Result<()> {
    let view = schema_view()?;
    let literals = [
        r#"{"id":1,"email":"a@x.com","role":"ADMIN","score":{"in":[1,2]}}"#,
        r#"{"id":99,"email":"zed@y.org","role":"USER","score":{"in":[7,8,9]}}"#,
        r#"{"id":-4,"email":"","role":"USER","score":{"in":[0.5]}}"#,
    ];

    let mut keys = vec![];
    for where_json in literals {
        let result = parameterize_query(&query(&find_many(where_json))?, &view);
        assert_eq!(result.placeholders.len(), 4);
        keys.push(result.cache_key()?);
    }

    // The list type follows the elements, so only the int lists agree.
    assert_eq!(keys[0], keys[1]);
    assert_ne!(keys[1], keys[2]);
    Ok(())
}

#[test]
fn key_order_does_not_matter() -> Result<()> {
    let view = schema_view()?;
    let a = parameterize_query(&query(&find_many(r#"{"id":1,"email":"x"}"#))?, &view);
    let b = parameterize_query(&query(&find_many(r#"{"email":"x","id":1}"#))?, &view);
    assert_eq!(a, b);

    let a = parameterize_query(&query(&find_many(r#"{"meta":{"a":1,"b":2}}"#))?, &view);
    let b = parameterize_query(&query(&find_many(r#"{"meta":{"b":2,"a":1}}"#))?, &view);
    assert_eq!(a.placeholders, b.placeholders);
    Ok(())
}

#[test]
fn different_literal_types_change_the_key() -> Result<()> {
    let view = schema_view()?;
    let a = parameterize_query(&query(&find_many(r#"{"id":1}"#))?, &view);
    let b = parameterize_query(&query(&find_many(r#"{"id":5000000000}"#))?, &view);
    assert_ne!(a.cache_key()?, b.cache_key()?);
    Ok(())
}

#[test]
fn null_is_never_captured() -> Result<()> {
    let view = schema_view()?;
    let q = query(&find_many(
        r#"{"id":null,"email":{"equals":null},"AND":[{"deletedAt":null}],"meta":null}"#,
    ))?;
    let result = parameterize_query(&q, &view);
    assert!(result.placeholders.is_empty());
    assert_eq!(result.query, q);
    Ok(())
}

#[test]
fn placeholder_values_round_trip() -> Result<()> {
    let view = schema_view()?;
    let result = parameterize_query(
        &query(&find_many(r#"{"id":{"in":[3,1,2]},"email":"e"}"#))?,
        &view,
    );
    assert_eq!(
        result.placeholders.to_json_str()?,
        r#"{"%1":"e","%2":[3,1,2]}"#
    );
    Ok(())
}

#[test]
fn depth_limit() -> Result<()> {
    let view = schema_view()?;

    // 100 nested AND filters around one id.
    let mut where_json = r#"{"id":1}"#.to_string();
    for _ in 0..100 {
        where_json = format!(r#"{{"AND":{where_json}}}"#);
    }
    let q = query(&find_many(&where_json))?;

    let limited = Parameterizer::new(&view)
        .with_config(ParameterizeConfig::with_max_depth(50))
        .query(&q);
    assert!(limited.placeholders.is_empty());
    assert_eq!(limited.query, q);

    for config in [ParameterizeConfig::default(), ParameterizeConfig::unlimited()] {
        let result = Parameterizer::new(&view).with_config(config).query(&q);
        assert_eq!(result.placeholders.len(), 1);
        assert_eq!(result.placeholders.get("%1"), Some(&Value::from(1)));
    }
    Ok(())
}

#[cfg(feature = "arc")]
#[test]
fn view_is_shared_across_threads() -> Result<()> {
    let view = schema_view()?;
    let parameterizer = Parameterizer::new(&view);

    let keys = std::thread::scope(|s| {
        let handles = (0..4)
            .map(|i| {
                s.spawn(move || {
                    let q = query(&find_many(&format!(r#"{{"id":{i}}}"#)))?;
                    parameterizer.query(&q).cache_key()
                })
            })
            .collect::<Vec<_>>();
        handles
            .into_iter()
            .map(|h| h.join().expect("thread panicked"))
            .collect::<Result<Vec<_>>>()
    })?;

    assert!(keys.windows(2).all(|w| w[0] == w[1]));
    Ok(())
}

#[test]
fn batch_shares_one_interner() -> Result<()> {
    let view = schema_view()?;
    let batch = JsonBatchQuery::from_json_str(&format!(
        r#"{{"batch":[{},{}]}}"#,
        find_many(r#"{"id":1}"#),
        find_many(r#"{"id":2}"#)
    ))?;
    let result = parameterize_batch(&batch, &view);
    assert_eq!(result.placeholders.names().collect::<Vec<_>>(), ["%1", "%2"]);
    assert!(result.batch.transaction.is_none());

    let single = parameterize_query(&batch.batch[1], &view);
    assert_eq!(single.placeholders.names().collect::<Vec<_>>(), ["%1"]);
    Ok(())
}
