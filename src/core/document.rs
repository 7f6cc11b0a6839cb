//! Variable-set model and its YAML form.
//!
//! The decrypted file looks like:
//!
//! ```yaml
//! env:
//!   production:
//!   - name: DATABASE_URL
//!     value: postgres://db/prod
//!   developer:
//!   - name: DATABASE_URL
//!     value: postgres://localhost/dev
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::trace;
use zeroize::Zeroizing;

use crate::error::{Result, StoreError};

/// Deployment context selecting one variable list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Environment {
    Production,
    Developer,
}

impl Environment {
    pub const ALL: [Environment; 2] = [Environment::Production, Environment::Developer];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Production => "production",
            Self::Developer => "developer",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "production" => Ok(Self::Production),
            "developer" => Ok(Self::Developer),
            other => Err(format!("unknown environment: {}", other)),
        }
    }
}

/// A single `name = value` pair. Either key may be left out and reads as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub value: String,
}

impl Variable {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Both environment lists.
///
/// Lists keep insertion order until [`VariableSet::sort`] runs at save time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableSet {
    #[serde(default)]
    pub production: Vec<Variable>,
    #[serde(default)]
    pub developer: Vec<Variable>,
}

impl VariableSet {
    pub fn get(&self, environment: Environment) -> &[Variable] {
        match environment {
            Environment::Production => &self.production,
            Environment::Developer => &self.developer,
        }
    }

    pub fn get_mut(&mut self, environment: Environment) -> &mut Vec<Variable> {
        match environment {
            Environment::Production => &mut self.production,
            Environment::Developer => &mut self.developer,
        }
    }

    /// Look up a list by name; unknown names yield an empty slice.
    pub fn by_name(&self, environment: &str) -> &[Variable] {
        environment
            .parse::<Environment>()
            .map(|env| self.get(env))
            .unwrap_or(&[])
    }

    /// Order both lists by variable name.
    pub fn sort(&mut self) {
        for env in Environment::ALL {
            self.get_mut(env).sort_by(|a, b| a.name.cmp(&b.name));
        }
    }

    /// True when both lists are sorted by name.
    pub fn is_sorted(&self) -> bool {
        Environment::ALL.iter().all(|env| {
            self.get(*env)
                .windows(2)
                .all(|pair| pair[0].name <= pair[1].name)
        })
    }
}

/// The unit that gets encrypted: a [`VariableSet`] under the `env` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub env: VariableSet,
}

impl Document {
    /// Fresh document with one empty placeholder entry per environment.
    pub fn new() -> Self {
        Self {
            env: VariableSet {
                production: vec![Variable::default()],
                developer: vec![Variable::default()],
            },
        }
    }

    pub fn variables(&self, environment: Environment) -> &[Variable] {
        self.env.get(environment)
    }

    /// Serialize to YAML.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::MalformedDocument` if serialization fails.
    pub fn to_yaml(&self) -> Result<Zeroizing<String>> {
        let yaml = serde_yaml::to_string(self)
            .map_err(|e| StoreError::MalformedDocument(e.to_string()))?;
        trace!(yaml_len = yaml.len(), "document serialized");
        Ok(Zeroizing::new(yaml))
    }

    /// Parse YAML produced by [`Document::to_yaml`] or by hand in an editor.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::MalformedDocument` on any decode failure,
    /// including a missing top-level `env` key.
    pub fn from_yaml(text: &str) -> Result<Self> {
        let document: Self = serde_yaml::from_str(text)
            .map_err(|e| StoreError::MalformedDocument(e.to_string()))?;
        trace!(
            production = document.env.production.len(),
            developer = document.env.developer.len(),
            "document parsed"
        );
        Ok(document)
    }

    /// Parse raw bytes, rejecting invalid UTF-8 as malformed.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| StoreError::MalformedDocument(format!("invalid UTF-8: {}", e)))?;
        Self::from_yaml(text)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
