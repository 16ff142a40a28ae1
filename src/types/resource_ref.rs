// ABOUTME: Reference to a cluster-resident resource in kubectl's kind/name form.
// ABOUTME: Validates both parts against DNS subdomain rules.

use serde::{Deserialize, Deserializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResourceRefError {
    #[error("resource reference must have the form <kind>/<name>: '{0}'")]
    MissingSeparator(String),

    #[error("resource kind cannot be empty")]
    EmptyKind,

    #[error("resource name cannot be empty")]
    EmptyName,

    #[error("resource name exceeds maximum length of 253 characters")]
    TooLong,

    #[error("invalid character in resource reference: '{0}'")]
    InvalidChar(char),
}

/// A `kind/name` pair such as `installation/kyma-installation`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceRef {
    kind: String,
    name: String,
}

impl ResourceRef {
    pub fn parse(value: &str) -> Result<Self, ResourceRefError> {
        let value = value.trim();
        let (kind, name) = value
            .split_once('/')
            .ok_or_else(|| ResourceRefError::MissingSeparator(value.to_string()))?;

        if kind.is_empty() {
            return Err(ResourceRefError::EmptyKind);
        }
        if name.is_empty() {
            return Err(ResourceRefError::EmptyName);
        }
        if name.len() > 253 {
            return Err(ResourceRefError::TooLong);
        }

        // Kind may carry an API group suffix (installations.installer.kyma-project.io).
        for c in kind.chars().chain(name.chars()) {
            if !(c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.') {
                return Err(ResourceRefError::InvalidChar(c));
            }
        }

        Ok(Self {
            kind: kind.to_string(),
            name: name.to_string(),
        })
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Default for ResourceRef {
    fn default() -> Self {
        Self {
            kind: "installation".to_string(),
            name: "kyma-installation".to_string(),
        }
    }
}

impl FromStr for ResourceRef {
    type Err = ResourceRefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.name)
    }
}

impl<'de> Deserialize<'de> for ResourceRef {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ResourceRef::parse(&s).map_err(serde::de::Error::custom)
    }
}
