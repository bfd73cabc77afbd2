//! Service error taxonomy shared by folder, note, share and team services.
//!
//! # Invariants
//! - `NotFoundOrDenied` never reveals whether the resource exists.
//! - `Forbidden` always carries a reason so read-only-share denials stay
//!   distinguishable from no-share denials.
//! - Storage failures keep their source error for diagnostics.

use crate::model::caller::CallerError;
use crate::model::share::AccessLevelParseError;
use crate::repo::error::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Reason attached to a `Forbidden` outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForbiddenReason {
    /// Operation is reserved to the resource owner.
    NotOwner,
    /// Caller holds a read-only share on a resource that needs write.
    WritePermissionRequired,
    /// Caller holds no share at all on the resource.
    AccessDenied,
    /// Global `member` role may not manage teams.
    MemberRoleNotAllowed,
    /// `manager` role without a leader roster row on the team.
    NotTeamLeader,
}

impl ForbiddenReason {
    /// Stable machine-readable code used in log lines.
    pub fn code(self) -> &'static str {
        match self {
            Self::NotOwner => "not_owner",
            Self::WritePermissionRequired => "write_permission_required",
            Self::AccessDenied => "access_denied",
            Self::MemberRoleNotAllowed => "member_role_not_allowed",
            Self::NotTeamLeader => "not_team_leader",
        }
    }
}

impl Display for ForbiddenReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotOwner => write!(f, "only the owner can perform this action"),
            Self::WritePermissionRequired => write!(f, "write permission required"),
            Self::AccessDenied => write!(f, "access denied"),
            Self::MemberRoleNotAllowed => write!(f, "members are not allowed to manage teams"),
            Self::NotTeamLeader => write!(f, "you are not a manager of this team"),
        }
    }
}

/// Coarse error classification consumed by transport collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    NotFoundOrDenied,
    Forbidden,
    InvalidTarget,
    Validation,
    StorageFailure,
}

impl ErrorKind {
    /// Conventional HTTP status for this kind.
    pub fn http_status(self) -> u16 {
        match self {
            Self::NotFound | Self::NotFoundOrDenied => 404,
            Self::Forbidden | Self::InvalidTarget => 403,
            Self::Validation => 400,
            Self::StorageFailure => 500,
        }
    }
}

/// Error returned by every service operation.
#[derive(Debug)]
pub enum ServiceError {
    /// Resource does not exist; used where existence is not secret.
    NotFound { entity: &'static str, id: Uuid },
    /// Resource absent or invisible to the caller; intentionally conflated.
    NotFoundOrDenied { entity: &'static str },
    /// Resource exists but this caller may not perform this operation.
    Forbidden(ForbiddenReason),
    /// Share target is invalid (for example the caller themselves).
    InvalidTarget(&'static str),
    /// Input failed validation before any storage access.
    Validation(String),
    /// Persistence collaborator reported an error; nothing was committed.
    StorageFailure(RepoError),
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::NotFoundOrDenied { .. } => ErrorKind::NotFoundOrDenied,
            Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::InvalidTarget(_) => ErrorKind::InvalidTarget,
            Self::Validation(_) => ErrorKind::Validation,
            Self::StorageFailure(_) => ErrorKind::StorageFailure,
        }
    }

    /// Returns the forbidden reason, if this is a `Forbidden` error.
    pub fn forbidden_reason(&self) -> Option<ForbiddenReason> {
        match self {
            Self::Forbidden(reason) => Some(*reason),
            _ => None,
        }
    }

    /// Stable code used in log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::NotFoundOrDenied { .. } => "not_found_or_denied",
            Self::Forbidden(reason) => reason.code(),
            Self::InvalidTarget(_) => "invalid_target",
            Self::Validation(_) => "validation",
            Self::StorageFailure(_) => "storage_failure",
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::NotFoundOrDenied { entity } => {
                write!(f, "{entity} not found or access denied")
            }
            Self::Forbidden(reason) => write!(f, "{reason}"),
            Self::InvalidTarget(reason) => write!(f, "invalid target: {reason}"),
            Self::Validation(message) => write!(f, "invalid input: {message}"),
            Self::StorageFailure(err) => write!(f, "storage failure: {err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::StorageFailure(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { entity, id } => Self::NotFound { entity, id },
            other => Self::StorageFailure(other),
        }
    }
}

impl From<AccessLevelParseError> for ServiceError {
    fn from(value: AccessLevelParseError) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<CallerError> for ServiceError {
    fn from(value: CallerError) -> Self {
        Self::Validation(value.to_string())
    }
}

/// Trims `value` and rejects it when blank.
pub(crate) fn require_non_blank(value: &str, field: &'static str) -> ServiceResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::Validation(format!("{field} must not be blank")));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::{ErrorKind, ForbiddenReason, ServiceError};

    #[test]
    fn forbidden_reasons_render_distinct_messages() {
        assert_eq!(
            ForbiddenReason::WritePermissionRequired.to_string(),
            "write permission required"
        );
        assert_eq!(ForbiddenReason::AccessDenied.to_string(), "access denied");
    }

    #[test]
    fn kinds_map_to_established_status_codes() {
        assert_eq!(ErrorKind::NotFoundOrDenied.http_status(), 404);
        assert_eq!(ErrorKind::InvalidTarget.http_status(), 403);
        assert_eq!(ErrorKind::Validation.http_status(), 400);
        assert_eq!(ErrorKind::StorageFailure.http_status(), 500);
    }

    #[test]
    fn not_found_or_denied_hides_identity() {
        let err = ServiceError::NotFoundOrDenied { entity: "folder" };
        assert_eq!(err.to_string(), "folder not found or access denied");
    }
}
