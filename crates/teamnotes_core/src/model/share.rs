//! Share grant model and access-resolution predicates.
//!
//! # Responsibility
//! - Define the `read`/`write` access levels carried by share rows.
//! - Resolve the effective access a user holds on an owned resource.
//!
//! # Invariants
//! - Ownership always dominates a share row.
//! - At most one share row exists per `(resource, user)` pair.
//! - Shares never grant delete rights.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

use crate::model::caller::UserId;
use crate::model::folder::{Folder, FolderId};
use crate::model::note::{Note, NoteId};

/// Access level granted by a share row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    Read,
    Write,
}

impl AccessLevel {
    /// Stable storage string.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
        }
    }

    /// Parses one access level; accepts surrounding whitespace and any case.
    pub fn parse(value: &str) -> Result<Self, AccessLevelParseError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "read" => Ok(Self::Read),
            "write" => Ok(Self::Write),
            _ => Err(AccessLevelParseError(value.to_string())),
        }
    }
}

impl Display for AccessLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Access level string outside `read|write`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessLevelParseError(pub String);

impl Display for AccessLevelParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unsupported access level `{}`; expected read|write", self.0)
    }
}

impl Error for AccessLevelParseError {}

/// Folder-level grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderShare {
    pub folder_id: FolderId,
    pub user_id: UserId,
    pub access: AccessLevel,
}

/// Note-level grant, created directly or propagated from a folder share.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteShare {
    pub note_id: NoteId,
    pub user_id: UserId,
    pub access: AccessLevel,
}

/// Folder joined with the share row that exposes it to `grantee_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedFolder {
    #[serde(flatten)]
    pub folder: Folder,
    pub grantee_id: UserId,
    pub access: AccessLevel,
}

/// Note joined with the share row that exposes it to `grantee_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedNote {
    #[serde(flatten)]
    pub note: Note,
    pub grantee_id: UserId,
    pub access: AccessLevel,
}

/// Effective access one user holds on one resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectiveAccess {
    Owner,
    Write,
    Read,
}

impl EffectiveAccess {
    /// Resolves effective access from ownership and an optional share row.
    ///
    /// Returns `None` when the user is neither owner nor grantee.
    pub fn resolve(is_owner: bool, share: Option<AccessLevel>) -> Option<Self> {
        if is_owner {
            return Some(Self::Owner);
        }
        share.map(|access| match access {
            AccessLevel::Read => Self::Read,
            AccessLevel::Write => Self::Write,
        })
    }

    pub fn can_write(self) -> bool {
        matches!(self, Self::Owner | Self::Write)
    }

    pub fn can_delete(self) -> bool {
        self == Self::Owner
    }
}

#[cfg(test)]
mod tests {
    use super::{AccessLevel, EffectiveAccess};

    #[test]
    fn access_level_parse_is_case_insensitive() {
        assert_eq!(AccessLevel::parse(" WRITE ").unwrap(), AccessLevel::Write);
        assert_eq!(AccessLevel::parse("read").unwrap(), AccessLevel::Read);
        assert!(AccessLevel::parse("admin").is_err());
    }

    #[test]
    fn owner_dominates_read_share() {
        let access = EffectiveAccess::resolve(true, Some(AccessLevel::Read)).unwrap();
        assert_eq!(access, EffectiveAccess::Owner);
        assert!(access.can_write());
        assert!(access.can_delete());
    }

    #[test]
    fn write_share_never_grants_delete() {
        let access = EffectiveAccess::resolve(false, Some(AccessLevel::Write)).unwrap();
        assert!(access.can_write());
        assert!(!access.can_delete());
    }

    #[test]
    fn no_share_resolves_to_none() {
        assert_eq!(EffectiveAccess::resolve(false, None), None);
    }
}
