//! Share grant repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist folder/note share rows with upsert semantics.
//! - Propagate one folder grant onto the folder's current notes atomically.
//! - Provide the owned/shared joins used by asset views.
//!
//! # Invariants
//! - One row per `(resource, user)`; upserts rely on the store's unique
//!   constraint so concurrent writers converge on a single row.
//! - Folder grant propagation is a snapshot: it stamps the notes present when
//!   the transaction runs and records nothing for later notes.
//! - Revoking a folder grant never touches note grants.

use crate::model::caller::UserId;
use crate::model::folder::FolderId;
use crate::model::note::NoteId;
use crate::model::share::{AccessLevel, FolderShare, NoteShare, SharedFolder, SharedNote};
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::folder_repo::parse_folder_row;
use crate::repo::note_repo::{list_note_ids_in_folder, parse_note_row};
use crate::repo::sql::{ensure_connection_ready, parse_access, placeholders};
use rusqlite::{
    params, params_from_iter, Connection, OptionalExtension, Transaction, TransactionBehavior,
};

const UPSERT_FOLDER_SHARE_SQL: &str = "INSERT INTO folder_shares (folder_id, user_id, access)
     VALUES (?1, ?2, ?3)
     ON CONFLICT (folder_id, user_id) DO UPDATE
     SET access = excluded.access,
         updated_at = (strftime('%s', 'now') * 1000);";

const UPSERT_NOTE_SHARE_SQL: &str = "INSERT INTO note_shares (note_id, user_id, access)
     VALUES (?1, ?2, ?3)
     ON CONFLICT (note_id, user_id) DO UPDATE
     SET access = excluded.access,
         updated_at = (strftime('%s', 'now') * 1000);";

/// Repository interface for share grants.
pub trait ShareRepository {
    /// Loads the grant one user holds on one folder.
    fn get_folder_share(
        &self,
        folder_id: FolderId,
        user_id: &str,
    ) -> RepoResult<Option<FolderShare>>;
    /// Upserts a folder grant and stamps the same grant on every note
    /// currently in the folder, in one transaction.
    ///
    /// Returns the number of notes stamped.
    fn share_folder_with_notes(
        &self,
        folder_id: FolderId,
        user_id: &str,
        access: AccessLevel,
    ) -> RepoResult<usize>;
    /// Deletes one folder grant. Returns whether a row existed.
    fn delete_folder_share(&self, folder_id: FolderId, user_id: &str) -> RepoResult<bool>;
    /// Lists every grant on one folder.
    fn list_folder_shares(&self, folder_id: FolderId) -> RepoResult<Vec<FolderShare>>;
    /// Loads the grant one user holds on one note.
    fn get_note_share(&self, note_id: NoteId, user_id: &str) -> RepoResult<Option<NoteShare>>;
    /// Inserts or updates one note grant.
    fn upsert_note_share(
        &self,
        note_id: NoteId,
        user_id: &str,
        access: AccessLevel,
    ) -> RepoResult<()>;
    /// Deletes one note grant. Returns whether a row existed.
    fn delete_note_share(&self, note_id: NoteId, user_id: &str) -> RepoResult<bool>;
    /// Lists every grant on one note.
    fn list_note_shares(&self, note_id: NoteId) -> RepoResult<Vec<NoteShare>>;
    /// Lists folders granted to any of `user_ids`, joined with the grant.
    fn list_folders_shared_with(&self, user_ids: &[UserId]) -> RepoResult<Vec<SharedFolder>>;
    /// Lists notes granted to any of `user_ids`, joined with the grant.
    fn list_notes_shared_with(&self, user_ids: &[UserId]) -> RepoResult<Vec<SharedNote>>;
}

/// SQLite-backed share repository.
pub struct SqliteShareRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteShareRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(
            conn,
            &[
                ("folders", &["id", "owner_id"]),
                ("notes", &["id", "folder_id", "owner_id"]),
                ("folder_shares", &["folder_id", "user_id", "access"]),
                ("note_shares", &["note_id", "user_id", "access"]),
            ],
        )?;
        Ok(Self { conn })
    }
}

impl ShareRepository for SqliteShareRepository<'_> {
    fn get_folder_share(
        &self,
        folder_id: FolderId,
        user_id: &str,
    ) -> RepoResult<Option<FolderShare>> {
        let access: Option<String> = self
            .conn
            .query_row(
                "SELECT access
                 FROM folder_shares
                 WHERE folder_id = ?1
                   AND user_id = ?2;",
                params![folder_id.to_string(), user_id],
                |row| row.get(0),
            )
            .optional()?;

        access
            .map(|value| -> RepoResult<FolderShare> {
                Ok(FolderShare {
                    folder_id,
                    user_id: user_id.to_string(),
                    access: parse_access(&value, "folder_shares.access")?,
                })
            })
            .transpose()
    }

    fn share_folder_with_notes(
        &self,
        folder_id: FolderId,
        user_id: &str,
        access: AccessLevel,
    ) -> RepoResult<usize> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let folder_text = folder_id.to_string();
        ensure_folder_exists(&tx, folder_id)?;

        tx.execute(
            UPSERT_FOLDER_SHARE_SQL,
            params![folder_text.as_str(), user_id, access.as_str()],
        )?;

        let note_ids = list_note_ids_in_folder(&tx, folder_id)?;
        for note_id in &note_ids {
            tx.execute(
                UPSERT_NOTE_SHARE_SQL,
                params![note_id.to_string(), user_id, access.as_str()],
            )?;
        }

        tx.commit()?;
        Ok(note_ids.len())
    }

    fn delete_folder_share(&self, folder_id: FolderId, user_id: &str) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "DELETE FROM folder_shares WHERE folder_id = ?1 AND user_id = ?2;",
            params![folder_id.to_string(), user_id],
        )?;
        Ok(changed > 0)
    }

    fn list_folder_shares(&self, folder_id: FolderId) -> RepoResult<Vec<FolderShare>> {
        let mut stmt = self.conn.prepare(
            "SELECT user_id, access
             FROM folder_shares
             WHERE folder_id = ?1
             ORDER BY created_at ASC, rowid ASC;",
        )?;
        let mut rows = stmt.query([folder_id.to_string()])?;
        let mut shares = Vec::new();
        while let Some(row) = rows.next()? {
            let access: String = row.get("access")?;
            shares.push(FolderShare {
                folder_id,
                user_id: row.get("user_id")?,
                access: parse_access(&access, "folder_shares.access")?,
            });
        }
        Ok(shares)
    }

    fn get_note_share(&self, note_id: NoteId, user_id: &str) -> RepoResult<Option<NoteShare>> {
        let access: Option<String> = self
            .conn
            .query_row(
                "SELECT access
                 FROM note_shares
                 WHERE note_id = ?1
                   AND user_id = ?2;",
                params![note_id.to_string(), user_id],
                |row| row.get(0),
            )
            .optional()?;

        access
            .map(|value| -> RepoResult<NoteShare> {
                Ok(NoteShare {
                    note_id,
                    user_id: user_id.to_string(),
                    access: parse_access(&value, "note_shares.access")?,
                })
            })
            .transpose()
    }

    fn upsert_note_share(
        &self,
        note_id: NoteId,
        user_id: &str,
        access: AccessLevel,
    ) -> RepoResult<()> {
        self.conn.execute(
            UPSERT_NOTE_SHARE_SQL,
            params![note_id.to_string(), user_id, access.as_str()],
        )?;
        Ok(())
    }

    fn delete_note_share(&self, note_id: NoteId, user_id: &str) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "DELETE FROM note_shares WHERE note_id = ?1 AND user_id = ?2;",
            params![note_id.to_string(), user_id],
        )?;
        Ok(changed > 0)
    }

    fn list_note_shares(&self, note_id: NoteId) -> RepoResult<Vec<NoteShare>> {
        let mut stmt = self.conn.prepare(
            "SELECT user_id, access
             FROM note_shares
             WHERE note_id = ?1
             ORDER BY created_at ASC, rowid ASC;",
        )?;
        let mut rows = stmt.query([note_id.to_string()])?;
        let mut shares = Vec::new();
        while let Some(row) = rows.next()? {
            let access: String = row.get("access")?;
            shares.push(NoteShare {
                note_id,
                user_id: row.get("user_id")?,
                access: parse_access(&access, "note_shares.access")?,
            });
        }
        Ok(shares)
    }

    fn list_folders_shared_with(&self, user_ids: &[UserId]) -> RepoResult<Vec<SharedFolder>> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT
                f.id AS id,
                f.name AS name,
                f.owner_id AS owner_id,
                f.created_at AS created_at,
                f.updated_at AS updated_at,
                fs.user_id AS grantee_id,
                fs.access AS access
             FROM folders f
             INNER JOIN folder_shares fs ON fs.folder_id = f.id
             WHERE fs.user_id IN ({})
             ORDER BY f.created_at ASC, f.rowid ASC, fs.rowid ASC;",
            placeholders(user_ids.len())
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(user_ids.iter()))?;
        let mut shared = Vec::new();
        while let Some(row) = rows.next()? {
            let access: String = row.get("access")?;
            shared.push(SharedFolder {
                folder: parse_folder_row(row)?,
                grantee_id: row.get("grantee_id")?,
                access: parse_access(&access, "folder_shares.access")?,
            });
        }
        Ok(shared)
    }

    fn list_notes_shared_with(&self, user_ids: &[UserId]) -> RepoResult<Vec<SharedNote>> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT
                n.id AS id,
                n.title AS title,
                n.body AS body,
                n.folder_id AS folder_id,
                n.owner_id AS owner_id,
                n.created_at AS created_at,
                n.updated_at AS updated_at,
                ns.user_id AS grantee_id,
                ns.access AS access
             FROM notes n
             INNER JOIN note_shares ns ON ns.note_id = n.id
             WHERE ns.user_id IN ({})
             ORDER BY n.created_at ASC, n.rowid ASC, ns.rowid ASC;",
            placeholders(user_ids.len())
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(user_ids.iter()))?;
        let mut shared = Vec::new();
        while let Some(row) = rows.next()? {
            let access: String = row.get("access")?;
            shared.push(SharedNote {
                note: parse_note_row(row)?,
                grantee_id: row.get("grantee_id")?,
                access: parse_access(&access, "note_shares.access")?,
            });
        }
        Ok(shared)
    }
}

fn ensure_folder_exists(conn: &Connection, folder_id: FolderId) -> RepoResult<()> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM folders WHERE id = ?1);",
        [folder_id.to_string()],
        |row| row.get(0),
    )?;
    if exists == 1 {
        Ok(())
    } else {
        Err(RepoError::NotFound {
            entity: "folder",
            id: folder_id,
        })
    }
}
