// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::graph::ScalarMask;
use crate::value::Value;
use crate::Rc;

use std::collections::BTreeMap;

/// Tags whose payload is a scalar literal and may be parameterized.
pub const SCALAR_TAGS: [&str; 5] = ["DateTime", "Decimal", "BigInt", "Bytes", "Json"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ScalarTag {
    DateTime,
    Decimal,
    BigInt,
    Bytes,
    Json,
}

impl ScalarTag {
    pub fn from_tag(tag: &str) -> Option<ScalarTag> {
        Some(match tag {
            "DateTime" => ScalarTag::DateTime,
            "Decimal" => ScalarTag::Decimal,
            "BigInt" => ScalarTag::BigInt,
            "Bytes" => ScalarTag::Bytes,
            "Json" => ScalarTag::Json,
            _ => return None,
        })
    }

    pub const fn name(self) -> &'static str {
        match self {
            ScalarTag::DateTime => "DateTime",
            ScalarTag::Decimal => "Decimal",
            ScalarTag::BigInt => "BigInt",
            ScalarTag::Bytes => "Bytes",
            ScalarTag::Json => "Json",
        }
    }

    /// The single mask bit a field must carry to accept this tag.
    pub const fn mask(self) -> ScalarMask {
        match self {
            ScalarTag::DateTime => ScalarMask::DATETIME,
            ScalarTag::Decimal => ScalarMask::DECIMAL,
            ScalarTag::BigInt => ScalarMask::BIGINT,
            ScalarTag::Bytes => ScalarMask::BYTES,
            ScalarTag::Json => ScalarMask::JSON,
        }
    }
}

/// Semantic category of a query value. Children are not classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueClass<'a> {
    Null,
    /// A string, number or boolean.
    Primitive(&'a Value),
    /// `{"$type": <scalar tag>, "value": ..}`, carrying the inner value.
    TaggedScalar(ScalarTag, &'a Value),
    /// Any other tagged object, or a value with no query meaning.
    Structural(&'a Value),
    Array(&'a [Value]),
    Object(&'a BTreeMap<Rc<str>, Value>),
}

pub fn classify(value: &Value) -> ValueClass<'_> {
    match value {
        Value::Null => ValueClass::Null,
        Value::Bool(_) | Value::Number(_) | Value::String(_) => ValueClass::Primitive(value),
        // Arrays are never inspected for tags.
        Value::Array(items) => ValueClass::Array(items.as_slice()),
        Value::Object(fields) => match fields.get("$type") {
            Some(Value::String(tag)) => {
                let inner = fields.get("value").unwrap_or(&Value::Null);
                match ScalarTag::from_tag(tag) {
                    Some(tag) => ValueClass::TaggedScalar(tag, inner),
                    None => ValueClass::Structural(inner),
                }
            }
            _ => ValueClass::Object(fields),
        },
        Value::Bytes(_) => ValueClass::Structural(value),
    }
}
