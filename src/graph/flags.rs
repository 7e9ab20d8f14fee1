// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use core::fmt;
use core::ops::{BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

/// Capabilities of an input field. Each bit is independent: a field may be
/// both scalar eligible and an object (the `{ equals: .. }` shorthand).
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeFlags(u8);

impl EdgeFlags {
    pub const NONE: EdgeFlags = EdgeFlags(0);
    /// A single scalar literal may be parameterized.
    pub const SCALAR: EdgeFlags = EdgeFlags(1);
    /// A single string literal may be parameterized as an enum member.
    pub const ENUM: EdgeFlags = EdgeFlags(1 << 1);
    /// A list of scalars may be parameterized as one value.
    pub const LIST_SCALAR: EdgeFlags = EdgeFlags(1 << 2);
    /// A list of enum members may be parameterized as one value.
    pub const LIST_ENUM: EdgeFlags = EdgeFlags(1 << 3);
    /// The field nests an input object.
    pub const OBJECT: EdgeFlags = EdgeFlags(1 << 4);
    /// The field nests a list of input objects.
    pub const LIST_OBJECT: EdgeFlags = EdgeFlags(1 << 5);

    const NAMES: [(EdgeFlags, &'static str); 6] = [
        (Self::SCALAR, "Scalar"),
        (Self::ENUM, "Enum"),
        (Self::LIST_SCALAR, "ListScalar"),
        (Self::LIST_ENUM, "ListEnum"),
        (Self::OBJECT, "Object"),
        (Self::LIST_OBJECT, "ListObject"),
    ];

    pub const fn from_bits(bits: u8) -> Self {
        EdgeFlags(bits)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn contains(self, other: EdgeFlags) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for EdgeFlags {
    type Output = EdgeFlags;

    fn bitor(self, rhs: Self) -> Self::Output {
        EdgeFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for EdgeFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for EdgeFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_flag_names(f, "EdgeFlags", Self::NAMES.iter().map(|(flag, name)| {
            (self.contains(*flag), *name)
        }))
    }
}

/// Runtime scalar kinds a field accepts for parameterization.
///
/// A zero mask disables scalar parameterization regardless of the edge flags.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScalarMask(u16);

impl ScalarMask {
    pub const NONE: ScalarMask = ScalarMask(0);
    pub const STRING: ScalarMask = ScalarMask(1);
    pub const INT: ScalarMask = ScalarMask(1 << 1);
    pub const BIGINT: ScalarMask = ScalarMask(1 << 2);
    pub const FLOAT: ScalarMask = ScalarMask(1 << 3);
    pub const DECIMAL: ScalarMask = ScalarMask(1 << 4);
    pub const BOOLEAN: ScalarMask = ScalarMask(1 << 5);
    pub const DATETIME: ScalarMask = ScalarMask(1 << 6);
    pub const JSON: ScalarMask = ScalarMask(1 << 7);
    pub const BYTES: ScalarMask = ScalarMask(1 << 8);

    /// Masks an integer literal is accepted by.
    pub const INTEGRAL: ScalarMask = ScalarMask(Self::INT.0 | Self::BIGINT.0 | Self::FLOAT.0);

    /// Masks a fractional number literal is accepted by.
    pub const FRACTIONAL: ScalarMask = ScalarMask(Self::FLOAT.0 | Self::DECIMAL.0);

    const NAMES: [(ScalarMask, &'static str); 9] = [
        (Self::STRING, "String"),
        (Self::INT, "Int"),
        (Self::BIGINT, "BigInt"),
        (Self::FLOAT, "Float"),
        (Self::DECIMAL, "Decimal"),
        (Self::BOOLEAN, "Boolean"),
        (Self::DATETIME, "DateTime"),
        (Self::JSON, "Json"),
        (Self::BYTES, "Bytes"),
    ];

    pub const fn from_bits(bits: u16) -> Self {
        ScalarMask(bits)
    }

    pub const fn bits(self) -> u16 {
        self.0
    }

    /// True when any bit of `other` is set in `self`.
    pub const fn intersects(self, other: ScalarMask) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Mask bit for a scalar type name as used by the data model.
    pub fn from_type_name(name: &str) -> ScalarMask {
        match name {
            "String" | "UUID" => Self::STRING,
            "Int" => Self::INT,
            "BigInt" => Self::BIGINT,
            "Float" => Self::FLOAT,
            "Decimal" => Self::DECIMAL,
            "Boolean" => Self::BOOLEAN,
            "DateTime" => Self::DATETIME,
            "Json" => Self::JSON,
            "Bytes" => Self::BYTES,
            _ => Self::NONE,
        }
    }
}

impl BitOr for ScalarMask {
    type Output = ScalarMask;

    fn bitor(self, rhs: Self) -> Self::Output {
        ScalarMask(self.0 | rhs.0)
    }
}

impl BitOrAssign for ScalarMask {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for ScalarMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_flag_names(f, "ScalarMask", Self::NAMES.iter().map(|(mask, name)| {
            (self.intersects(*mask), *name)
        }))
    }
}

fn write_flag_names<'a>(
    f: &mut fmt::Formatter<'_>,
    kind: &str,
    names: impl Iterator<Item = (bool, &'a str)>,
) -> fmt::Result {
    write!(f, "{kind}(")?;
    let mut first = true;
    for (set, name) in names {
        if !set {
            continue;
        }
        if !first {
            f.write_str(" | ")?;
        }
        f.write_str(name)?;
        first = false;
    }
    f.write_str(")")
}
