//! Custom match profiles.
//!
//! A profile maps the `custommatch:<profile>=<term>` keyword to a set of weighted field
//! matches, optionally rescored by a script.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ConfigError;

/// A named custom match profile.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CustomMatchProfile {
    /// Fields to match. A profile without fields is a deployment error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldSpec>>,
    /// Optional script rescoring applied to the combined match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_score: Option<FunctionScore>,
}

impl CustomMatchProfile {
    /// Returns the configured fields, or an error naming `profile` when none are declared.
    pub fn fields(&self, profile: &str) -> Result<&[FieldSpec], ConfigError> {
        self.fields
            .as_deref()
            .ok_or_else(|| ConfigError::MissingProfileFields {
                profile: profile.to_string(),
            })
    }
}

/// How one field participates in a profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldSpec {
    /// A bare field name: matched with the term as-is at boost 1.
    Bare(String),
    /// A field matched once per entry, with the entry's prefix prepended to the term.
    Prefixed {
        /// Field name.
        field: String,
        /// Prefix and boost pairs.
        entries: Vec<PrefixBoost>,
    },
}

/// A prefix prepended to the searched term, with the boost of the resulting match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrefixBoost {
    /// Text prepended to the term.
    #[serde(default)]
    pub prefix: String,
    /// Boost of the resulting match.
    #[serde(default = "default_boost")]
    pub boost: f64,
}

/// Default boost for profile entries.
fn default_boost() -> f64 {
    1.0
}

/// A script rescoring a profile's match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionScore {
    /// Script source.
    pub script: String,
    /// Parameters made available to the script.
    #[serde(default)]
    pub params: BTreeMap<String, Value>,
}
