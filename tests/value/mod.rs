// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg(test)]

use anyhow::Result;
use query_parameterizer::*;

#[test]
fn object_keys_are_sorted() -> Result<()> {
    let v = Value::from_json_str(r#"{ "b": 1, "a": { "d": null, "c": [true] } }"#)?;
    assert_eq!(v.to_json_str()?, r#"{"a":{"c":[true],"d":null},"b":1}"#);
    Ok(())
}

#[test]
fn serialize_number() -> Result<()> {
    // Check that integer values are serialized without fractional part
    assert_eq!(serde_json::to_string_pretty(&Value::from(1.0))?, "1");
    assert_eq!(serde_json::to_string_pretty(&Value::from(-1.0))?, "-1");

    // Ensure that fractional parts are also serialized.
    assert_eq!(serde_json::to_string_pretty(&Value::from(1.1))?, "1.1");
    assert_eq!(serde_json::to_string_pretty(&Value::from(-1.1))?, "-1.1");

    Ok(())
}

#[test]
fn serialize_string() -> Result<()> {
    assert_eq!(
        Value::String("Hello, World\n".into()).to_json_str()?,
        "\"Hello, World\\n\""
    );
    Ok(())
}

#[test]
fn serialize_bytes_as_base64() -> Result<()> {
    assert_eq!(Value::bytes(vec![1u8, 2, 3]).to_json_str()?, "\"AQID\"");
    assert_eq!(Value::bytes(Vec::new()).to_json_str()?, "\"\"");
    Ok(())
}

#[test]
fn large_integers() -> Result<()> {
    let v = Value::from_json_str("18446744073709551615")?;
    assert_eq!(v, Value::from(u64::MAX));
    assert_eq!(v.as_number()?.as_i32(), None);

    let v = Value::from_json_str("-2147483648")?;
    assert_eq!(v.as_number()?.as_i32(), Some(i32::MIN));
    Ok(())
}

#[test]
fn constructors() -> Result<()> {
    assert_eq!(Value::new_object(), Value::from_json_str("{}")?);
    assert_eq!(Value::new_array(), Value::from_json_str("[]")?);
    assert_eq!(
        Value::from(vec![Value::from(1), Value::from("x"), Value::Null]),
        Value::from_json_str(r#"[1,"x",null]"#)?
    );
    Ok(())
}

#[test]
fn reserved_looking_keys_stay_objects() -> Result<()> {
    let text = r#"{"$serde_json::private::Number":"12"}"#;
    let v = Value::from_json_str(text)?;
    assert!(v.as_object().is_ok());
    assert_eq!(v.to_json_str()?, text);

    let v = Value::from_json_str(r#"{"$serde_json::private::Number":"abc"}"#)?;
    assert_eq!(v["$serde_json::private::Number"], Value::from("abc"));
    Ok(())
}

#[test]
fn integer_and_float_text() -> Result<()> {
    assert_eq!(Value::from_json_str("1")?.to_json_str()?, "1");
    assert_eq!(Value::from_json_str("1.0")?.to_json_str()?, "1");
    assert_eq!(Value::from_json_str("2.5")?.to_json_str()?, "2.5");
    assert_eq!(Value::from_json_str("-9")?.to_json_str()?, "-9");
    Ok(())
}

#[test]
fn string_as_index() -> Result<()> {
    let obj = Value::from_json_str(r#"{ "a" : 5, "b" : 6 }"#)?;
    assert_eq!(&obj["a"], &Value::from(5.0));
    assert_eq!(&obj["c"], &Value::Null);
    assert_eq!(&Value::from(1)["a"], &Value::Null);
    Ok(())
}

#[test]
fn usize_as_index() -> Result<()> {
    assert_eq!(&Value::from_json_str("[1, 2, 3]")?[0], &Value::from(1.0));
    assert_eq!(&Value::from_json_str("[1, 2, 3]")?[5], &Value::Null);
    Ok(())
}

#[test]
fn api() -> Result<()> {
    assert!(&Value::from_json_str("{}")?.as_object()?.is_empty());
    let mut v = Value::new_object();
    v.as_object_mut()?.insert("a".into(), Value::from(3.145));
    assert_eq!(v["a"], Value::from(3.145));
    assert_eq!(v.as_object()?.len(), 1);
    assert_eq!(v.get("a"), Some(&Value::from(3.145)));

    let mut a = Value::new_array();
    a.as_array_mut()?.push(Value::from("x"));
    assert_eq!(a.as_array()?.len(), 1);
    assert_eq!(a[0].as_str(), Some("x"));

    // Check invalid api calls.
    assert!(Value::Null.as_object().is_err());
    assert!(Value::Null.as_object_mut().is_err());
    assert!(Value::String("anc".into()).as_array().is_err());
    assert!(Value::String("anc".into()).as_array_mut().is_err());
    assert!(Value::new_object().as_number().is_err());
    assert!(Value::from(5.6).as_bool().is_err());
    assert!(Value::from(5.6).as_bytes().is_err());
    Ok(())
}

#[cfg(feature = "yaml")]
#[test]
fn yaml() -> Result<()> {
    let v = Value::from_yaml_str("a: [1, two]\nb: null\n")?;
    assert_eq!(v, Value::from_json_str(r#"{"a":[1,"two"],"b":null}"#)?);
    Ok(())
}
