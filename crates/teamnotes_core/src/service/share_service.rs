//! Share engine: grants, propagation and asset views.
//!
//! # Responsibility
//! - Grant and revoke folder/note access for other users.
//! - Stamp a folder grant onto the notes present at share time.
//! - Build owned/shared asset bundles for one user or a team roster.
//!
//! # Invariants
//! - Only the resource owner grants, revokes or lists grants.
//! - Self-grants are rejected before storage is touched.
//! - Revoking a folder grant leaves previously stamped note grants intact.
//! - Asset views never fail on empty or unknown rosters.

use crate::model::asset::AssetBundle;
use crate::model::caller::UserId;
use crate::model::folder::FolderId;
use crate::model::note::NoteId;
use crate::model::share::{AccessLevel, FolderShare, NoteShare};
use crate::model::team::TeamId;
use crate::repo::folder_repo::{FolderRepository, SqliteFolderRepository};
use crate::repo::note_repo::{NoteRepository, SqliteNoteRepository};
use crate::repo::share_repo::{ShareRepository, SqliteShareRepository};
use crate::repo::team_repo::{SqliteTeamRepository, TeamRepository};
use crate::service::error::{ForbiddenReason, ServiceError, ServiceResult};
use crate::service::finish;
use rusqlite::Connection;
use serde::Serialize;

const MODULE: &str = "share_service";

/// Result of one folder grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareOutcome {
    /// Notes that received the same grant in the folder transaction.
    pub notes_stamped: usize,
}

/// Share engine over folder, note, share and team repositories.
pub struct ShareService<F, N, S, T> {
    folders: F,
    notes: N,
    shares: S,
    teams: T,
}

impl<'conn>
    ShareService<
        SqliteFolderRepository<'conn>,
        SqliteNoteRepository<'conn>,
        SqliteShareRepository<'conn>,
        SqliteTeamRepository<'conn>,
    >
{
    /// Builds an engine over SQLite repositories sharing one connection.
    pub fn from_connection(conn: &'conn Connection) -> ServiceResult<Self> {
        Ok(Self::new(
            SqliteFolderRepository::try_new(conn)?,
            SqliteNoteRepository::try_new(conn)?,
            SqliteShareRepository::try_new(conn)?,
            SqliteTeamRepository::try_new(conn)?,
        ))
    }
}

impl<F, N, S, T> ShareService<F, N, S, T>
where
    F: FolderRepository,
    N: NoteRepository,
    S: ShareRepository,
    T: TeamRepository,
{
    pub fn new(folders: F, notes: N, shares: S, teams: T) -> Self {
        Self {
            folders,
            notes,
            shares,
            teams,
        }
    }

    /// Grants `access` on a folder to `target_id` and stamps the same grant
    /// on every note currently in the folder.
    ///
    /// Notes created afterwards are not covered. Re-sharing updates the
    /// existing rows instead of adding new ones.
    ///
    /// # Errors
    /// - `InvalidTarget` when the target is blank or the caller.
    /// - `NotFound` when the folder does not exist.
    /// - `Forbidden(NotOwner)` when the caller does not own the folder.
    pub fn share_folder(
        &self,
        folder_id: FolderId,
        target_id: &str,
        access: AccessLevel,
        caller_id: &str,
    ) -> ServiceResult<ShareOutcome> {
        let result = validate_target(target_id, caller_id).and_then(|target| {
            self.require_folder_owner(folder_id, caller_id)?;
            let notes_stamped = self
                .shares
                .share_folder_with_notes(folder_id, target, access)?;
            Ok(ShareOutcome { notes_stamped })
        });
        let fields = match &result {
            Ok(outcome) => format!(
                "folder_id={} access={} notes_stamped={}",
                folder_id, access, outcome.notes_stamped
            ),
            Err(_) => format!("folder_id={folder_id} access={access}"),
        };
        finish("folder_share", MODULE, &fields, result)
    }

    /// Removes one folder grant. Stamped note grants stay in place.
    ///
    /// Returns whether a grant existed.
    pub fn revoke_folder_share(
        &self,
        folder_id: FolderId,
        target_id: &str,
        caller_id: &str,
    ) -> ServiceResult<bool> {
        let result = normalize_target(target_id).and_then(|target| {
            self.require_folder_owner(folder_id, caller_id)?;
            Ok(self.shares.delete_folder_share(folder_id, target)?)
        });
        let fields = match &result {
            Ok(removed) => format!("folder_id={folder_id} removed={removed}"),
            Err(_) => format!("folder_id={folder_id}"),
        };
        finish("folder_share_revoke", MODULE, &fields, result)
    }

    /// Lists current grants on a folder. Owner only.
    pub fn list_folder_shares(
        &self,
        folder_id: FolderId,
        caller_id: &str,
    ) -> ServiceResult<Vec<FolderShare>> {
        self.require_folder_owner(folder_id, caller_id)?;
        Ok(self.shares.list_folder_shares(folder_id)?)
    }

    /// Grants `access` on one note to `target_id`, updating an existing grant.
    pub fn share_note(
        &self,
        note_id: NoteId,
        target_id: &str,
        access: AccessLevel,
        caller_id: &str,
    ) -> ServiceResult<()> {
        let result = validate_target(target_id, caller_id).and_then(|target| {
            self.require_note_owner(note_id, caller_id)?;
            Ok(self.shares.upsert_note_share(note_id, target, access)?)
        });
        finish(
            "note_share",
            MODULE,
            &format!("note_id={note_id} access={access}"),
            result,
        )
    }

    /// Removes one note grant. Returns whether a grant existed.
    pub fn revoke_note_share(
        &self,
        note_id: NoteId,
        target_id: &str,
        caller_id: &str,
    ) -> ServiceResult<bool> {
        let result = normalize_target(target_id).and_then(|target| {
            self.require_note_owner(note_id, caller_id)?;
            Ok(self.shares.delete_note_share(note_id, target)?)
        });
        let fields = match &result {
            Ok(removed) => format!("note_id={note_id} removed={removed}"),
            Err(_) => format!("note_id={note_id}"),
        };
        finish("note_share_revoke", MODULE, &fields, result)
    }

    /// Lists current grants on a note. Owner only.
    pub fn list_note_shares(&self, note_id: NoteId, caller_id: &str) -> ServiceResult<Vec<NoteShare>> {
        self.require_note_owner(note_id, caller_id)?;
        Ok(self.shares.list_note_shares(note_id)?)
    }

    /// Builds the asset bundle of every user on a team's roster.
    ///
    /// An empty roster or unknown team yields an empty bundle.
    pub fn get_team_assets(&self, team_id: TeamId) -> ServiceResult<AssetBundle> {
        let user_ids = self.teams.list_roster_user_ids(team_id)?;
        self.collect_assets(&user_ids)
    }

    /// Builds the asset bundle of one user.
    ///
    /// Role gating belongs to whoever invokes this; no caller check here.
    pub fn get_user_assets(&self, user_id: &str) -> ServiceResult<AssetBundle> {
        self.collect_assets(&[user_id.to_string()])
    }

    fn collect_assets(&self, user_ids: &[UserId]) -> ServiceResult<AssetBundle> {
        if user_ids.is_empty() {
            return Ok(AssetBundle::default());
        }
        Ok(AssetBundle {
            owned_folders: self.folders.list_folders_owned_by(user_ids)?,
            shared_folders: self.shares.list_folders_shared_with(user_ids)?,
            owned_notes: self.notes.list_notes_owned_by(user_ids)?,
            shared_notes: self.shares.list_notes_shared_with(user_ids)?,
        })
    }

    fn require_folder_owner(&self, folder_id: FolderId, caller_id: &str) -> ServiceResult<()> {
        let folder = self
            .folders
            .get_folder(folder_id)?
            .ok_or(ServiceError::NotFound {
                entity: "folder",
                id: folder_id,
            })?;
        if folder.is_owned_by(caller_id) {
            Ok(())
        } else {
            Err(ServiceError::Forbidden(ForbiddenReason::NotOwner))
        }
    }

    fn require_note_owner(&self, note_id: NoteId, caller_id: &str) -> ServiceResult<()> {
        let note = self.notes.get_note(note_id)?.ok_or(ServiceError::NotFound {
            entity: "note",
            id: note_id,
        })?;
        if note.is_owned_by(caller_id) {
            Ok(())
        } else {
            Err(ServiceError::Forbidden(ForbiddenReason::NotOwner))
        }
    }
}

/// Trims a grantee id. Grant and revoke both key rows by the trimmed value.
fn normalize_target(target_id: &str) -> ServiceResult<&str> {
    let target = target_id.trim();
    if target.is_empty() {
        return Err(ServiceError::InvalidTarget("target user id must not be blank"));
    }
    Ok(target)
}

fn validate_target<'a>(target_id: &'a str, caller_id: &str) -> ServiceResult<&'a str> {
    let target = normalize_target(target_id)?;
    if target == caller_id.trim() {
        return Err(ServiceError::InvalidTarget("cannot share with yourself"));
    }
    Ok(target)
}
