//! Block targets: the apps or sites the controller gates.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Coarse grouping shown next to a target in the picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TargetCategory {
    Social,
    Entertainment,
    Games,
    News,
    Shopping,
    #[default]
    Other,
}

impl TargetCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            TargetCategory::Social => "social",
            TargetCategory::Entertainment => "entertainment",
            TargetCategory::Games => "games",
            TargetCategory::News => "news",
            TargetCategory::Shopping => "shopping",
            TargetCategory::Other => "other",
        }
    }
}

impl fmt::Display for TargetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetCategory {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "social" => Ok(TargetCategory::Social),
            "entertainment" => Ok(TargetCategory::Entertainment),
            "games" => Ok(TargetCategory::Games),
            "news" => Ok(TargetCategory::News),
            "shopping" => Ok(TargetCategory::Shopping),
            "other" => Ok(TargetCategory::Other),
            _ => Err(ValidationError::UnknownVariant {
                kind: "target category",
                value: s.to_string(),
            }),
        }
    }
}

/// One app or site subject to blocking.
///
/// `id` is opaque to the controller (a package name on Android, a bundle id or
/// domain elsewhere). Equality is by value, so two targets with the same id but
/// different display names are distinct entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockTarget {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: TargetCategory,
}

impl BlockTarget {
    pub fn new(id: impl Into<String>, name: impl Into<String>, category: TargetCategory) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category,
        }
    }

    /// Target with no display metadata; the name falls back to the id.
    pub fn from_id(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            category: TargetCategory::Other,
        }
    }
}
