// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.
#![allow(clippy::float_cmp, clippy::as_conversions)]

use core::fmt::{Debug, Formatter};

use serde::ser::Serializer;
use serde::Serialize;

// Largest magnitude below which every integer has an exact f64.
const F64_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0; // 2^53

/// A JSON number as delivered by the parser.
///
/// Integers beyond 64 bits arrive as `Float`; [`Number::is_integral`] still
/// reports them as integers so that they infer `BigInt`.
#[derive(Clone, Copy)]
pub enum Number {
    UInt(u64),
    Int(i64),
    Float(f64),
}

impl Number {
    /// True for integer variants and for finite floats without a fraction.
    ///
    /// The wire format carries no int/float distinction, so `2.0` is as
    /// integral as `2`.
    pub fn is_integral(&self) -> bool {
        match self {
            Number::UInt(_) | Number::Int(_) => true,
            Number::Float(f) => f.is_finite() && f.fract() == 0.0,
        }
    }

    /// The value as `i32` when it is integral and fits.
    pub fn as_i32(&self) -> Option<i32> {
        self.as_i64().and_then(|v| i32::try_from(v).ok())
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Number::UInt(v) => i64::try_from(*v).ok(),
            Number::Int(v) => Some(*v),
            Number::Float(f) if self.is_integral() && f.abs() <= F64_SAFE_INTEGER => {
                Some(*f as i64)
            }
            Number::Float(_) => None,
        }
    }

    pub fn as_f64(&self) -> f64 {
        match self {
            Number::UInt(v) => *v as f64,
            Number::Int(v) => *v as f64,
            Number::Float(f) => *f,
        }
    }

    // Exact integer view used for comparisons.
    fn as_i128(&self) -> Option<i128> {
        match self {
            Number::UInt(v) => Some(i128::from(*v)),
            Number::Int(v) => Some(i128::from(*v)),
            Number::Float(_) => self.as_i64().map(i128::from),
        }
    }
}

impl Debug for Number {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Number::UInt(v) => write!(f, "{v}"),
            Number::Int(v) => write!(f, "{v}"),
            Number::Float(v) => write!(f, "{v}"),
        }
    }
}

impl Serialize for Number {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Number::UInt(v) => serializer.serialize_u64(*v),
            Number::Int(v) => serializer.serialize_i64(*v),
            // Integral floats print without a fraction.
            Number::Float(_) => match self.as_i64() {
                Some(i) => serializer.serialize_i64(i),
                None => serializer.serialize_f64(self.as_f64()),
            },
        }
    }
}

impl From<u64> for Number {
    fn from(value: u64) -> Self {
        Number::UInt(value)
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Number::Int(value)
    }
}

impl From<i32> for Number {
    fn from(value: i32) -> Self {
        Number::Int(i64::from(value))
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Number::Float(value)
    }
}

/// Numeric equality: `1`, `1u64` and `1.0` are the same number.
impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        if let (Some(a), Some(b)) = (self.as_i128(), other.as_i128()) {
            return a == b;
        }
        // NaN never compares equal.
        self.as_f64() == other.as_f64()
    }
}

impl Eq for Number {}
