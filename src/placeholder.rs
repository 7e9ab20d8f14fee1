// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::classify::ScalarTag;
use crate::graph::ScalarMask;
use crate::value::Value;
use crate::Rc;

use core::fmt;
use std::collections::BTreeMap;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// Inferred type of a parameterized value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PlaceholderType {
    /// Neutral start of a widening fold. Never emitted.
    Any,
    String,
    Int,
    BigInt,
    Float,
    Decimal,
    Boolean,
    DateTime,
    Json,
    Bytes,
    Enum,
    List(Box<PlaceholderType>),
}

impl PlaceholderType {
    pub fn name(&self) -> &'static str {
        match self {
            PlaceholderType::Any => "Any",
            PlaceholderType::String => "String",
            PlaceholderType::Int => "Int",
            PlaceholderType::BigInt => "BigInt",
            PlaceholderType::Float => "Float",
            PlaceholderType::Decimal => "Decimal",
            PlaceholderType::Boolean => "Boolean",
            PlaceholderType::DateTime => "DateTime",
            PlaceholderType::Json => "Json",
            PlaceholderType::Bytes => "Bytes",
            PlaceholderType::Enum => "Enum",
            PlaceholderType::List(_) => "List",
        }
    }

    pub fn list(inner: PlaceholderType) -> Self {
        PlaceholderType::List(Box::new(inner))
    }

    /// Type of a string, number or boolean literal. Integral numbers in
    /// `i32` range are `Int`, other integral numbers `BigInt`.
    pub fn of_primitive(value: &Value) -> Option<PlaceholderType> {
        match value {
            Value::String(_) => Some(PlaceholderType::String),
            Value::Bool(_) => Some(PlaceholderType::Boolean),
            Value::Number(n) if n.as_i32().is_some() => Some(PlaceholderType::Int),
            Value::Number(n) if n.is_integral() => Some(PlaceholderType::BigInt),
            Value::Number(_) => Some(PlaceholderType::Float),
            _ => None,
        }
    }

    pub const fn of_tag(tag: ScalarTag) -> PlaceholderType {
        match tag {
            ScalarTag::DateTime => PlaceholderType::DateTime,
            ScalarTag::Decimal => PlaceholderType::Decimal,
            ScalarTag::BigInt => PlaceholderType::BigInt,
            ScalarTag::Bytes => PlaceholderType::Bytes,
            ScalarTag::Json => PlaceholderType::Json,
        }
    }

    /// Whether a primitive of this type may stand in a field with `mask`.
    ///
    /// Integral numbers are accepted by any numeric mask except `Decimal`;
    /// fractional ones by `Float` and `Decimal`.
    pub fn accepted_by(&self, mask: ScalarMask) -> bool {
        let required = match self {
            PlaceholderType::String => ScalarMask::STRING,
            PlaceholderType::Boolean => ScalarMask::BOOLEAN,
            PlaceholderType::Int | PlaceholderType::BigInt => ScalarMask::INTEGRAL,
            PlaceholderType::Float => ScalarMask::FRACTIONAL,
            _ => return false,
        };
        mask.intersects(required)
    }

    fn numeric_rank(&self) -> Option<u8> {
        match self {
            PlaceholderType::Int => Some(0),
            PlaceholderType::BigInt => Some(1),
            PlaceholderType::Float => Some(2),
            _ => None,
        }
    }

    /// Common type of two list elements: numbers promote along
    /// `Int < BigInt < Float`, equal types stay, anything else is `Any`.
    pub fn widen(&self, other: &PlaceholderType) -> PlaceholderType {
        if let (Some(a), Some(b)) = (self.numeric_rank(), other.numeric_rank()) {
            return if a >= b { self.clone() } else { other.clone() };
        }
        if self == other {
            return self.clone();
        }
        PlaceholderType::Any
    }

    /// Folds [`widen`](Self::widen) over element types. `None` for an empty
    /// input or when the elements have no common type.
    pub fn widen_all<I>(types: I) -> Option<PlaceholderType>
    where
        I: IntoIterator<Item = PlaceholderType>,
    {
        let mut widened: Option<PlaceholderType> = None;
        for ty in types {
            let next = match &widened {
                None => ty,
                Some(current) => current.widen(&ty),
            };
            if next == PlaceholderType::Any {
                return None;
            }
            widened = Some(next);
        }
        widened
    }

    /// Descriptor used inside a placeholder reference:
    /// `{"type":"Int"}` or `{"type":"List","inner":{"type":"Int"}}`.
    pub fn to_value(&self) -> Value {
        let mut fields = BTreeMap::new();
        self.describe(&mut fields);
        Value::from(fields)
    }

    fn describe(&self, fields: &mut BTreeMap<Rc<str>, Value>) {
        fields.insert("type".into(), Value::from(self.name()));
        if let PlaceholderType::List(inner) = self {
            fields.insert("inner".into(), inner.to_value());
        }
    }

    /// The value that replaces a literal in the rewritten query.
    pub fn reference(&self, name: &str) -> Value {
        let mut descriptor = BTreeMap::new();
        descriptor.insert("name".into(), Value::from(name));
        self.describe(&mut descriptor);

        let mut placeholder = BTreeMap::new();
        placeholder.insert("$type".into(), Value::from("Param"));
        placeholder.insert("value".into(), Value::from(descriptor));
        Value::from(placeholder)
    }
}

impl fmt::Display for PlaceholderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaceholderType::List(inner) => write!(f, "List<{inner}>"),
            _ => f.write_str(self.name()),
        }
    }
}

impl Serialize for PlaceholderType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("type", self.name())?;
        if let PlaceholderType::List(inner) = self {
            map.serialize_entry("inner", inner.as_ref())?;
        }
        map.end()
    }
}
