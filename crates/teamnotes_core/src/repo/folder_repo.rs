//! Folder repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide folder CRUD over the `folders` table.
//! - Own the folder delete cascade across notes and share tables.
//!
//! # Invariants
//! - `delete_folder_cascade` removes children before parents in one
//!   `IMMEDIATE` transaction; either every row goes or none does.
//! - Listing is deterministic: creation order, then insertion order.

use crate::model::caller::UserId;
use crate::model::folder::{Folder, FolderId};
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::sql::{ensure_connection_ready, parse_uuid, placeholders};
use rusqlite::{
    params, params_from_iter, Connection, OptionalExtension, Row, Transaction, TransactionBehavior,
};
use uuid::Uuid;

const FOLDER_SELECT_SQL: &str = "SELECT
    id,
    name,
    owner_id,
    created_at,
    updated_at
FROM folders";

/// Row counts removed by one folder delete cascade.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FolderCascadeSummary {
    pub note_shares_deleted: usize,
    pub notes_deleted: usize,
    pub folder_shares_deleted: usize,
}

/// Repository interface for folder persistence.
pub trait FolderRepository {
    /// Inserts one folder with a generated id and returns the stored row.
    fn create_folder(&self, name: &str, owner_id: &str) -> RepoResult<Folder>;
    /// Loads one folder by id.
    fn get_folder(&self, folder_id: FolderId) -> RepoResult<Option<Folder>>;
    /// Renames one folder and returns the updated row.
    fn rename_folder(&self, folder_id: FolderId, name: &str) -> RepoResult<Folder>;
    /// Deletes note shares, notes, folder shares and the folder atomically.
    fn delete_folder_cascade(&self, folder_id: FolderId) -> RepoResult<FolderCascadeSummary>;
    /// Lists folders owned by any of `owner_ids`.
    fn list_folders_owned_by(&self, owner_ids: &[UserId]) -> RepoResult<Vec<Folder>>;
}

/// SQLite-backed folder repository.
pub struct SqliteFolderRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteFolderRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(
            conn,
            &[
                ("folders", &["id", "name", "owner_id", "created_at", "updated_at"]),
                ("notes", &["id", "folder_id"]),
                ("folder_shares", &["folder_id", "user_id"]),
                ("note_shares", &["note_id", "user_id"]),
            ],
        )?;
        Ok(Self { conn })
    }
}

impl FolderRepository for SqliteFolderRepository<'_> {
    fn create_folder(&self, name: &str, owner_id: &str) -> RepoResult<Folder> {
        let folder_id = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO folders (id, name, owner_id) VALUES (?1, ?2, ?3);",
            params![folder_id.to_string(), name, owner_id],
        )?;
        load_required_folder(self.conn, folder_id)
    }

    fn get_folder(&self, folder_id: FolderId) -> RepoResult<Option<Folder>> {
        load_folder(self.conn, folder_id)
    }

    fn rename_folder(&self, folder_id: FolderId, name: &str) -> RepoResult<Folder> {
        let changed = self.conn.execute(
            "UPDATE folders
             SET name = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![folder_id.to_string(), name],
        )?;
        if changed == 0 {
            return Err(folder_not_found(folder_id));
        }
        load_required_folder(self.conn, folder_id)
    }

    fn delete_folder_cascade(&self, folder_id: FolderId) -> RepoResult<FolderCascadeSummary> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let id_text = folder_id.to_string();
        if load_folder(&tx, folder_id)?.is_none() {
            return Err(folder_not_found(folder_id));
        }

        let note_shares_deleted = tx.execute(
            "DELETE FROM note_shares
             WHERE note_id IN (SELECT id FROM notes WHERE folder_id = ?1);",
            [id_text.as_str()],
        )?;
        let notes_deleted =
            tx.execute("DELETE FROM notes WHERE folder_id = ?1;", [id_text.as_str()])?;
        let folder_shares_deleted = tx.execute(
            "DELETE FROM folder_shares WHERE folder_id = ?1;",
            [id_text.as_str()],
        )?;
        tx.execute("DELETE FROM folders WHERE id = ?1;", [id_text.as_str()])?;

        tx.commit()?;
        Ok(FolderCascadeSummary {
            note_shares_deleted,
            notes_deleted,
            folder_shares_deleted,
        })
    }

    fn list_folders_owned_by(&self, owner_ids: &[UserId]) -> RepoResult<Vec<Folder>> {
        if owner_ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "{FOLDER_SELECT_SQL}
             WHERE owner_id IN ({})
             ORDER BY created_at ASC, rowid ASC;",
            placeholders(owner_ids.len())
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(owner_ids.iter()))?;
        let mut folders = Vec::new();
        while let Some(row) = rows.next()? {
            folders.push(parse_folder_row(row)?);
        }
        Ok(folders)
    }
}

/// Parses one `folders` row selected with the canonical column names.
pub(crate) fn parse_folder_row(row: &Row<'_>) -> RepoResult<Folder> {
    let id_text: String = row.get("id")?;
    Ok(Folder {
        id: parse_uuid(&id_text, "folders.id")?,
        name: row.get("name")?,
        owner_id: row.get("owner_id")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn load_folder(conn: &Connection, folder_id: FolderId) -> RepoResult<Option<Folder>> {
    let mut stmt = conn.prepare(&format!("{FOLDER_SELECT_SQL} WHERE id = ?1;"))?;
    let row = stmt
        .query_row([folder_id.to_string()], |row| Ok(parse_folder_row(row)))
        .optional()?;
    row.transpose()
}

fn load_required_folder(conn: &Connection, folder_id: FolderId) -> RepoResult<Folder> {
    load_folder(conn, folder_id)?.ok_or_else(|| folder_not_found(folder_id))
}

fn folder_not_found(folder_id: FolderId) -> RepoError {
    RepoError::NotFound {
        entity: "folder",
        id: folder_id,
    }
}
