//! Note use-case service.
//!
//! # Responsibility
//! - Provide note create/get/list/update/delete APIs nested under folders.
//! - Resolve owner, write-grant and read-grant rights per operation.
//!
//! # Invariants
//! - Only the folder owner creates notes in a folder, whatever grants exist.
//! - Update needs ownership or a `write` grant; delete needs ownership.
//! - A read-only grant and a missing grant fail update with different
//!   `Forbidden` reasons.
//! - Invisible and missing notes are indistinguishable on read.

use crate::model::folder::FolderId;
use crate::model::note::{Note, NoteId};
use crate::model::share::EffectiveAccess;
use crate::repo::folder_repo::{FolderRepository, SqliteFolderRepository};
use crate::repo::note_repo::{NewNote, NoteRepository, SqliteNoteRepository};
use crate::repo::share_repo::{ShareRepository, SqliteShareRepository};
use crate::service::error::{require_non_blank, ForbiddenReason, ServiceError, ServiceResult};
use crate::service::finish;
use rusqlite::Connection;

const MODULE: &str = "note_service";

/// Note service facade over folder, note and share repositories.
pub struct NoteService<F, N, S> {
    folders: F,
    notes: N,
    shares: S,
}

impl<'conn>
    NoteService<
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

impl<F, N, S> NoteService<F, N, S>
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

    /// Creates one note inside a folder the caller owns.
    ///
    /// # Errors
    /// - `Validation` when the title is blank.
    /// - `NotFound` when the folder does not exist.
    /// - `Forbidden(NotOwner)` when the caller does not own the folder, even
    ///   with a write grant on it.
    pub fn create_note(
        &self,
        folder_id: FolderId,
        title: &str,
        body: &str,
        caller_id: &str,
    ) -> ServiceResult<Note> {
        let result = require_non_blank(title, "note title").and_then(|title| {
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
            Ok(self.notes.create_note(&NewNote {
                folder_id,
                owner_id: caller_id,
                title: title.as_str(),
                body,
            })?)
        });
        let fields = match &result {
            Ok(note) => format!("folder_id={} note_id={}", folder_id, note.id),
            Err(_) => format!("folder_id={folder_id}"),
        };
        finish("note_create", MODULE, &fields, result)
    }

    /// Returns one note when the caller owns it or holds any grant on it.
    ///
    /// # Errors
    /// - `NotFoundOrDenied` when the note is missing or invisible.
    pub fn get_note(&self, note_id: NoteId, caller_id: &str) -> ServiceResult<Note> {
        let denied = || ServiceError::NotFoundOrDenied { entity: "note" };
        let note = self.notes.get_note(note_id)?.ok_or_else(denied)?;
        self.effective_access(&note, caller_id)?.ok_or_else(denied)?;
        Ok(note)
    }

    /// Lists notes of a folder the caller can see.
    pub fn list_folder_notes(&self, folder_id: FolderId, caller_id: &str) -> ServiceResult<Vec<Note>> {
        let denied = || ServiceError::NotFoundOrDenied { entity: "folder" };
        let folder = self.folders.get_folder(folder_id)?.ok_or_else(denied)?;
        if !folder.is_owned_by(caller_id)
            && self.shares.get_folder_share(folder_id, caller_id)?.is_none()
        {
            return Err(denied());
        }
        Ok(self.notes.list_notes_in_folder(folder_id)?)
    }

    /// Replaces title and body. Owner or `write` grantee only.
    ///
    /// # Errors
    /// - `NotFound` when the note does not exist.
    /// - `Forbidden(WritePermissionRequired)` for a read-only grantee.
    /// - `Forbidden(AccessDenied)` for a caller with no grant.
    pub fn update_note(
        &self,
        note_id: NoteId,
        title: &str,
        body: &str,
        caller_id: &str,
    ) -> ServiceResult<Note> {
        let result = require_non_blank(title, "note title").and_then(|title| {
            let note = self.require_note(note_id)?;
            match self.effective_access(&note, caller_id)? {
                None => return Err(ServiceError::Forbidden(ForbiddenReason::AccessDenied)),
                Some(access) if !access.can_write() => {
                    return Err(ServiceError::Forbidden(
                        ForbiddenReason::WritePermissionRequired,
                    ))
                }
                Some(_) => {}
            }
            Ok(self.notes.update_note_content(note_id, title.as_str(), body)?)
        });
        finish("note_update", MODULE, &format!("note_id={note_id}"), result)
    }

    /// Deletes one note and its grants. Owner only, grantees included.
    pub fn delete_note(&self, note_id: NoteId, caller_id: &str) -> ServiceResult<usize> {
        let result = self.require_note(note_id).and_then(|note| {
            let access = self.effective_access(&note, caller_id)?;
            if !access.is_some_and(EffectiveAccess::can_delete) {
                return Err(ServiceError::Forbidden(ForbiddenReason::NotOwner));
            }
            Ok(self.notes.delete_note_cascade(note_id)?)
        });
        let fields = match &result {
            Ok(shares_deleted) => format!("note_id={note_id} note_shares_deleted={shares_deleted}"),
            Err(_) => format!("note_id={note_id}"),
        };
        finish("note_delete", MODULE, &fields, result)
    }

    fn require_note(&self, note_id: NoteId) -> ServiceResult<Note> {
        self.notes.get_note(note_id)?.ok_or(ServiceError::NotFound {
            entity: "note",
            id: note_id,
        })
    }

    fn effective_access(&self, note: &Note, caller_id: &str) -> ServiceResult<Option<EffectiveAccess>> {
        if note.is_owned_by(caller_id) {
            return Ok(Some(EffectiveAccess::Owner));
        }
        let share = self
            .shares
            .get_note_share(note.id, caller_id)?
            .map(|share| share.access);
        Ok(EffectiveAccess::resolve(false, share))
    }
}
