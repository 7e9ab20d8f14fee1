// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Knobs for a [`Parameterizer`](crate::Parameterizer).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParameterizeConfig {
    /// Deepest nesting level that is traversed. Anything below it is copied
    /// unchanged. `None` removes the limit.
    pub max_depth: Option<usize>,
}

impl Default for ParameterizeConfig {
    fn default() -> Self {
        Self {
            max_depth: Some(DEFAULT_MAX_DEPTH),
        }
    }
}

impl ParameterizeConfig {
    pub const fn unlimited() -> Self {
        Self { max_depth: None }
    }

    pub const fn with_max_depth(max_depth: usize) -> Self {
        Self {
            max_depth: Some(max_depth),
        }
    }

    pub(crate) const fn allows(&self, depth: usize) -> bool {
        match self.max_depth {
            Some(max) => depth <= max,
            None => true,
        }
    }
}
