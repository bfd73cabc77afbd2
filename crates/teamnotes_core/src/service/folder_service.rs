//! Folder use-case service.
//!
//! # Responsibility
//! - Provide folder create/get/list/rename/delete APIs for one caller.
//! - Enforce owner-only mutation and owner-or-grantee visibility.
//!
//! # Invariants
//! - The owner is always the authenticated caller, never read from input.
//! - Shares of any level never grant rename or delete.
//! - Invisible and missing folders are indistinguishable on read.
//! - Delete cascades note grants, notes, folder grants and the folder in
//!   one transaction.

use crate::model::folder::{Folder, FolderDetail, FolderId};
use crate::model::share::EffectiveAccess;
use crate::repo::folder_repo::{FolderCascadeSummary, FolderRepository, SqliteFolderRepository};
use crate::repo::note_repo::{NoteRepository, SqliteNoteRepository};
use crate::repo::share_repo::{ShareRepository, SqliteShareRepository};
use crate::service::error::{require_non_blank, ForbiddenReason, ServiceError, ServiceResult};
use crate::service::finish;
use rusqlite::Connection;

const MODULE: &str = "folder_service";

/// Folder service facade over folder, note and share repositories.
pub struct FolderService<F, N, S> {
    folders: F,
    notes: N,
    shares: S,
}

impl<'conn>
    FolderService<
        SqliteFolderRepository<'conn>,
        SqliteNoteRepository<'conn>,
        SqliteShareRepository<'conn>,
    >
{
    /// Builds a service over SQLite repositories sharing one connection.
    pub fn from_connection(conn: &'conn Connection) -> ServiceResult<Self> {
        Ok(Self::new(
            SqliteFolderRepository::try_new(conn)?,
            SqliteNoteRepository::try_new(conn)?,
            SqliteShareRepository::try_new(conn)?,
        ))
    }
}

impl<F, N, S> FolderService<F, N, S>
where
    F: FolderRepository,
    N: NoteRepository,
    S: ShareRepository,
{
    /// Creates service from repository implementations.
    pub fn new(folders: F, notes: N, shares: S) -> Self {
        Self {
            folders,
            notes,
            shares,
        }
    }

    /// Creates one folder owned by `caller_id`.
    pub fn create_folder(&self, name: &str, caller_id: &str) -> ServiceResult<Folder> {
        let result = require_non_blank(name, "folder name")
            .and_then(|name| Ok(self.folders.create_folder(name.as_str(), caller_id)?));
        let fields = match &result {
            Ok(folder) => format!("folder_id={}", folder.id),
            Err(_) => String::new(),
        };
        finish("folder_create", MODULE, &fields, result)
    }

    /// Returns the folder with its current notes when the caller owns it or
    /// holds any grant on it.
    ///
    /// # Errors
    /// - `NotFoundOrDenied` when the folder is missing or invisible.
    pub fn get_folder(&self, folder_id: FolderId, caller_id: &str) -> ServiceResult<FolderDetail> {
        let (folder, access) = self.load_visible_folder(folder_id, caller_id)?;
        let notes = self.notes.list_notes_in_folder(folder.id)?;
        Ok(FolderDetail {
            folder,
            notes,
            access,
        })
    }

    /// Lists folders owned by `caller_id` in creation order.
    pub fn list_owned_folders(&self, caller_id: &str) -> ServiceResult<Vec<Folder>> {
        Ok(self
            .folders
            .list_folders_owned_by(&[caller_id.to_string()])?)
    }

    /// Renames one folder. Owner only.
    pub fn update_folder(
        &self,
        folder_id: FolderId,
        name: &str,
        caller_id: &str,
    ) -> ServiceResult<Folder> {
        let result = require_non_blank(name, "folder name").and_then(|name| {
            self.require_owned_folder(folder_id, caller_id)?;
            Ok(self.folders.rename_folder(folder_id, name.as_str())?)
        });
        finish(
            "folder_update",
            MODULE,
            &format!("folder_id={folder_id}"),
            result,
        )
    }

    /// Deletes one folder and everything hanging off it. Owner only.
    ///
    /// # Errors
    /// - `NotFound` when the folder does not exist.
    /// - `Forbidden(NotOwner)` for any non-owner, grantees included.
    /// - `StorageFailure` when the cascade fails; nothing is removed then.
    pub fn delete_folder(
        &self,
        folder_id: FolderId,
        caller_id: &str,
    ) -> ServiceResult<FolderCascadeSummary> {
        let result = self
            .require_owned_folder(folder_id, caller_id)
            .and_then(|_| Ok(self.folders.delete_folder_cascade(folder_id)?));
        let fields = match &result {
            Ok(summary) => format!(
                "folder_id={} notes_deleted={} note_shares_deleted={} folder_shares_deleted={}",
                folder_id,
                summary.notes_deleted,
                summary.note_shares_deleted,
                summary.folder_shares_deleted
            ),
            Err(_) => format!("folder_id={folder_id}"),
        };
        finish("folder_delete", MODULE, &fields, result)
    }

    /// Loads a folder and checks the caller can at least read it.
    pub(crate) fn load_visible_folder(
        &self,
        folder_id: FolderId,
        caller_id: &str,
    ) -> ServiceResult<(Folder, EffectiveAccess)> {
        let denied = || ServiceError::NotFoundOrDenied { entity: "folder" };
        let folder = self.folders.get_folder(folder_id)?.ok_or_else(denied)?;
        let share = if folder.is_owned_by(caller_id) {
            None
        } else {
            self.shares
                .get_folder_share(folder_id, caller_id)?
                .map(|share| share.access)
        };
        let access =
            EffectiveAccess::resolve(folder.is_owned_by(caller_id), share).ok_or_else(denied)?;
        Ok((folder, access))
    }

    fn require_owned_folder(&self, folder_id: FolderId, caller_id: &str) -> ServiceResult<Folder> {
        let folder = self
            .folders
            .get_folder(folder_id)?
            .ok_or(ServiceError::NotFound {
                entity: "folder",
                id: folder_id,
            })?;
        if !folder.is_owned_by(caller_id) {
            return Err(ServiceError::Forbidden(ForbiddenReason::NotOwner));
        }
        Ok(folder)
    }
}
