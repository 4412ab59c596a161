//! Column role assignment: which columns may act as flow stages and which hold values.
//!
//! Roles come from three layers, applied in order: a seed (name hints or the
//! legacy positional layout), an optional YAML roles file, then individual
//! `NAME=ROLE` overrides. The result is validated against the table headers
//! before a [`Session`](crate::session::Session) accepts it.

use std::{fmt, path::Path, str::FromStr};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::RoleError;

/// Lower-case fragments that mark a column as categorical when seeding roles.
pub const CATEGORICAL_HINTS: &[&str] = &["etapa", "unidade", "consumivel", "produto"];

/// Categorical column positions of the fixed export layout.
pub const LEGACY_CATEGORICAL_POSITIONS: &[usize] = &[0, 1, 2, 6, 7, 8];

/// Numeric column positions of the fixed export layout.
pub const LEGACY_NUMERIC_POSITIONS: &[usize] = &[
    5, 9, 10, 11, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24,
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnRole {
    Categorical,
    Numeric,
    #[default]
    Ignored,
}

impl ColumnRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnRole::Categorical => "categorical",
            ColumnRole::Numeric => "numeric",
            ColumnRole::Ignored => "ignored",
        }
    }
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnRole {
    type Err = RoleError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "categorical" | "category" | "cat" => Ok(ColumnRole::Categorical),
            "numeric" | "number" | "num" => Ok(ColumnRole::Numeric),
            "ignored" | "ignore" | "none" => Ok(ColumnRole::Ignored),
            _ => Err(RoleError::UnknownRole(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnAssignment {
    pub name: String,
    pub role: ColumnRole,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleOverride {
    pub name: String,
    pub role: ColumnRole,
}

impl FromStr for RoleOverride {
    type Err = RoleError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        // The role never contains '=', so split on the last one to allow names that do.
        let (name, role) = value
            .rsplit_once('=')
            .ok_or_else(|| RoleError::MalformedOverride(value.to_string()))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(RoleError::MalformedOverride(value.to_string()));
        }
        Ok(RoleOverride {
            name: name.to_string(),
            role: role.parse()?,
        })
    }
}

/// Ordered column → role mapping. Columns without an entry are [`ColumnRole::Ignored`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRoles {
    #[serde(default)]
    columns: Vec<ColumnAssignment>,
}

impl ColumnRoles {
    /// Seeds `Categorical` for names matching [`CATEGORICAL_HINTS`], `Ignored` otherwise.
    pub fn from_hints<S: AsRef<str>>(headers: &[S]) -> Self {
        let columns = headers
            .iter()
            .map(|name| {
                let name = name.as_ref();
                let role = if matches_categorical_hint(name) {
                    ColumnRole::Categorical
                } else {
                    ColumnRole::Ignored
                };
                ColumnAssignment {
                    name: name.to_string(),
                    role,
                }
            })
            .collect();
        Self { columns }
    }

    /// Assigns roles by column position. Positions past the last header are skipped.
    pub fn from_positions<S: AsRef<str>>(
        headers: &[S],
        categorical: &[usize],
        numeric: &[usize],
    ) -> Self {
        let columns = headers
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                let role = if categorical.contains(&idx) {
                    ColumnRole::Categorical
                } else if numeric.contains(&idx) {
                    ColumnRole::Numeric
                } else {
                    ColumnRole::Ignored
                };
                ColumnAssignment {
                    name: name.as_ref().to_string(),
                    role,
                }
            })
            .collect();
        Self { columns }
    }

    pub fn legacy_layout<S: AsRef<str>>(headers: &[S]) -> Self {
        Self::from_positions(
            headers,
            LEGACY_CATEGORICAL_POSITIONS,
            LEGACY_NUMERIC_POSITIONS,
        )
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Opening roles file {path:?}"))?;
        serde_yaml::from_str(&raw).with_context(|| format!("Parsing roles file {path:?}"))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let serialized = self.to_yaml()?;
        std::fs::write(path, serialized).with_context(|| format!("Writing roles file {path:?}"))
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Serializing column roles")
    }

    pub fn role(&self, name: &str) -> ColumnRole {
        self.columns
            .iter()
            .find(|assignment| assignment.name == name)
            .map(|assignment| assignment.role)
            .unwrap_or_default()
    }

    pub fn set(&mut self, name: &str, role: ColumnRole) {
        match self.columns.iter_mut().find(|a| a.name == name) {
            Some(existing) => existing.role = role,
            None => self.columns.push(ColumnAssignment {
                name: name.to_string(),
                role,
            }),
        }
    }

    /// Layers every assignment of `other` over this mapping.
    pub fn merge(&mut self, other: &ColumnRoles) {
        for assignment in &other.columns {
            self.set(&assignment.name, assignment.role);
        }
    }

    pub fn apply_overrides(&mut self, overrides: &[RoleOverride]) {
        for item in overrides {
            self.set(&item.name, item.role);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColumnAssignment> {
        self.columns.iter()
    }

    pub fn names_with(&self, role: ColumnRole) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|assignment| assignment.role == role)
            .map(|assignment| assignment.name.as_str())
            .collect()
    }

    /// Rejects assignments naming columns the table does not have.
    pub fn validate<S: AsRef<str>>(&self, headers: &[S]) -> Result<(), RoleError> {
        for assignment in &self.columns {
            if !headers.iter().any(|h| h.as_ref() == assignment.name) {
                return Err(RoleError::UnknownColumn(assignment.name.clone()));
            }
        }
        Ok(())
    }
}

pub fn matches_categorical_hint(name: &str) -> bool {
    let lowered = name.to_lowercase();
    CATEGORICAL_HINTS.iter().any(|hint| lowered.contains(hint))
}
