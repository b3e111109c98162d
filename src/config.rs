//! Resolver Configuration
//!
//! Serde-backed options for the order resolver, loadable from JSON. Every
//! field has a default, so `{}` is a valid config.

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, DomainResult};
use crate::ordering::SortSpec;

/// How to treat orphans, leaf parents, cycles and duplicate ids
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum HierarchyPolicy {
    /// Treat broken links as roots and log them
    #[default]
    Lenient,
    /// Fail on the first broken link
    Strict,
}

impl FromStr for HierarchyPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lenient" => Ok(HierarchyPolicy::Lenient),
            "strict" => Ok(HierarchyPolicy::Strict),
            _ => Err(format!("Invalid policy '{}'. Valid values: lenient, strict", s)),
        }
    }
}

/// How hierarchical sort keys are built
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum KeyEncoding {
    /// Sequence of base ranks from the root down, compared lexicographically
    #[default]
    RankPath,
    /// Power-of-ten multiplier keys; collides on deep or wide trees
    Scaled,
}

impl FromStr for KeyEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "rank-path" | "path" => Ok(KeyEncoding::RankPath),
            "scaled" | "legacy" => Ok(KeyEncoding::Scaled),
            _ => Err(format!("Invalid encoding '{}'. Valid values: rank-path, scaled", s)),
        }
    }
}

/// Options for [`crate::ChipOrderResolver`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ResolverConfig {
    pub sort: SortSpec,
    pub policy: HierarchyPolicy,
    pub encoding: KeyEncoding,
}

impl ResolverConfig {
    pub fn from_json_str(json: &str) -> DomainResult<Self> {
        serde_json::from_str(json).map_err(|e| DomainError::Config(e.to_string()))
    }

    pub fn from_path(path: impl AsRef<Path>) -> DomainResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| DomainError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&json)
    }

    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_policy(mut self, policy: HierarchyPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_encoding(mut self, encoding: KeyEncoding) -> Self {
        self.encoding = encoding;
        self
    }
}
