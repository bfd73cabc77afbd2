//! Authenticated caller identity.
//!
//! # Responsibility
//! - Carry the `(user_id, role)` pair produced by the external auth layer.
//! - Classify the opaque role claim into the three tiers the core gates on.
//!
//! # Invariants
//! - A `Caller` always has a non-blank user id and role.
//! - Role matching is case-insensitive; unknown non-blank roles are elevated.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Opaque user identifier issued by the auth layer.
pub type UserId = String;

/// Global role tier derived from the auth claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallerRole {
    /// Plain member: never manages teams.
    Member,
    /// Manager: manages only teams where the roster marks them leader.
    Manager,
    /// Any administrative role; bypasses per-team leader checks.
    Elevated(String),
}

impl CallerRole {
    pub fn parse(value: &str) -> Result<Self, CallerError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(CallerError::BlankRole);
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "member" => Ok(Self::Member),
            "manager" => Ok(Self::Manager),
            _ => Ok(Self::Elevated(trimmed.to_string())),
        }
    }

    /// Stable label used in log lines.
    pub fn label(&self) -> &str {
        match self {
            Self::Member => "member",
            Self::Manager => "manager",
            Self::Elevated(_) => "elevated",
        }
    }
}

/// Verified identity for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: UserId,
    pub role: CallerRole,
}

impl Caller {
    /// Builds a caller from the raw claim pair.
    pub fn new(user_id: impl Into<String>, role: &str) -> Result<Self, CallerError> {
        let user_id = user_id.into();
        if user_id.trim().is_empty() {
            return Err(CallerError::BlankUserId);
        }
        Ok(Self {
            user_id,
            role: CallerRole::parse(role)?,
        })
    }

    pub fn id(&self) -> &str {
        self.user_id.as_str()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallerError {
    BlankUserId,
    BlankRole,
}

impl Display for CallerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankUserId => write!(f, "caller user id must not be blank"),
            Self::BlankRole => write!(f, "caller role must not be blank"),
        }
    }
}

impl Error for CallerError {}
