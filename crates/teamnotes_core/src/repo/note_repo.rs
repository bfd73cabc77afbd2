//! Note repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide note CRUD over the `notes` table.
//! - Own the note delete cascade over `note_shares`.
//!
//! # Invariants
//! - A note row always references an existing folder (`foreign_keys=ON`).
//! - `delete_note_cascade` removes share rows before the note in one
//!   `IMMEDIATE` transaction.
//! - Listing is deterministic: creation order, then insertion order.

use crate::model::caller::UserId;
use crate::model::folder::FolderId;
use crate::model::note::{Note, NoteId};
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::sql::{ensure_connection_ready, parse_uuid, placeholders};
use rusqlite::{
    params, params_from_iter, Connection, OptionalExtension, Row, Transaction, TransactionBehavior,
};
use uuid::Uuid;

const NOTE_SELECT_SQL: &str = "SELECT
    id,
    title,
    body,
    folder_id,
    owner_id,
    created_at,
    updated_at
FROM notes";

/// Insert payload for one note.
#[derive(Debug, Clone, Copy)]
pub struct NewNote<'a> {
    pub folder_id: FolderId,
    pub owner_id: &'a str,
    pub title: &'a str,
    pub body: &'a str,
}

/// Repository interface for note persistence.
pub trait NoteRepository {
    /// Inserts one note with a generated id and returns the stored row.
    fn create_note(&self, note: &NewNote<'_>) -> RepoResult<Note>;
    /// Loads one note by id.
    fn get_note(&self, note_id: NoteId) -> RepoResult<Option<Note>>;
    /// Replaces title and body, returning the updated row.
    fn update_note_content(&self, note_id: NoteId, title: &str, body: &str) -> RepoResult<Note>;
    /// Deletes the note's share rows, then the note, atomically.
    ///
    /// Returns the number of share rows removed.
    fn delete_note_cascade(&self, note_id: NoteId) -> RepoResult<usize>;
    /// Lists notes currently inside one folder.
    fn list_notes_in_folder(&self, folder_id: FolderId) -> RepoResult<Vec<Note>>;
    /// Lists notes owned by any of `owner_ids`.
    fn list_notes_owned_by(&self, owner_ids: &[UserId]) -> RepoResult<Vec<Note>>;
}

/// SQLite-backed note repository.
pub struct SqliteNoteRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNoteRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(
            conn,
            &[
                (
                    "notes",
                    &[
                        "id",
                        "title",
                        "body",
                        "folder_id",
                        "owner_id",
                        "created_at",
                        "updated_at",
                    ],
                ),
                ("note_shares", &["note_id", "user_id", "access"]),
            ],
        )?;
        Ok(Self { conn })
    }
}

impl NoteRepository for SqliteNoteRepository<'_> {
    fn create_note(&self, note: &NewNote<'_>) -> RepoResult<Note> {
        let note_id = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO notes (id, title, body, folder_id, owner_id)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                note_id.to_string(),
                note.title,
                note.body,
                note.folder_id.to_string(),
                note.owner_id,
            ],
        )?;
        load_required_note(self.conn, note_id)
    }

    fn get_note(&self, note_id: NoteId) -> RepoResult<Option<Note>> {
        load_note(self.conn, note_id)
    }

    fn update_note_content(&self, note_id: NoteId, title: &str, body: &str) -> RepoResult<Note> {
        let changed = self.conn.execute(
            "UPDATE notes
             SET title = ?2,
                 body = ?3,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![note_id.to_string(), title, body],
        )?;
        if changed == 0 {
            return Err(note_not_found(note_id));
        }
        load_required_note(self.conn, note_id)
    }

    fn delete_note_cascade(&self, note_id: NoteId) -> RepoResult<usize> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let id_text = note_id.to_string();

        let shares_deleted =
            tx.execute("DELETE FROM note_shares WHERE note_id = ?1;", [id_text.as_str()])?;
        let changed = tx.execute("DELETE FROM notes WHERE id = ?1;", [id_text.as_str()])?;
        if changed == 0 {
            return Err(note_not_found(note_id));
        }

        tx.commit()?;
        Ok(shares_deleted)
    }

    fn list_notes_in_folder(&self, folder_id: FolderId) -> RepoResult<Vec<Note>> {
        let mut stmt = self.conn.prepare(&format!(
            "{NOTE_SELECT_SQL}
             WHERE folder_id = ?1
             ORDER BY created_at ASC, rowid ASC;"
        ))?;
        let mut rows = stmt.query([folder_id.to_string()])?;
        collect_notes(&mut rows)
    }

    fn list_notes_owned_by(&self, owner_ids: &[UserId]) -> RepoResult<Vec<Note>> {
        if owner_ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "{NOTE_SELECT_SQL}
             WHERE owner_id IN ({})
             ORDER BY created_at ASC, rowid ASC;",
            placeholders(owner_ids.len())
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(owner_ids.iter()))?;
        collect_notes(&mut rows)
    }
}

/// Parses one `notes` row selected with the canonical column names.
pub(crate) fn parse_note_row(row: &Row<'_>) -> RepoResult<Note> {
    let id_text: String = row.get("id")?;
    let folder_text: String = row.get("folder_id")?;
    Ok(Note {
        id: parse_uuid(&id_text, "notes.id")?,
        title: row.get("title")?,
        body: row.get("body")?,
        folder_id: parse_uuid(&folder_text, "notes.folder_id")?,
        owner_id: row.get("owner_id")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

/// Lists note ids currently inside one folder, inside the caller's transaction.
pub(crate) fn list_note_ids_in_folder(
    conn: &Connection,
    folder_id: FolderId,
) -> RepoResult<Vec<NoteId>> {
    let mut stmt = conn.prepare(
        "SELECT id
         FROM notes
         WHERE folder_id = ?1
         ORDER BY created_at ASC, rowid ASC;",
    )?;
    let mut rows = stmt.query([folder_id.to_string()])?;
    let mut ids = Vec::new();
    while let Some(row) = rows.next()? {
        let id_text: String = row.get(0)?;
        ids.push(parse_uuid(&id_text, "notes.id")?);
    }
    Ok(ids)
}

fn collect_notes(rows: &mut rusqlite::Rows<'_>) -> RepoResult<Vec<Note>> {
    let mut notes = Vec::new();
    while let Some(row) = rows.next()? {
        notes.push(parse_note_row(row)?);
    }
    Ok(notes)
}

fn load_note(conn: &Connection, note_id: NoteId) -> RepoResult<Option<Note>> {
    let mut stmt = conn.prepare(&format!("{NOTE_SELECT_SQL} WHERE id = ?1;"))?;
    let row = stmt
        .query_row([note_id.to_string()], |row| Ok(parse_note_row(row)))
        .optional()?;
    row.transpose()
}

fn load_required_note(conn: &Connection, note_id: NoteId) -> RepoResult<Note> {
    load_note(conn, note_id)?.ok_or_else(|| note_not_found(note_id))
}

fn note_not_found(note_id: NoteId) -> RepoError {
    RepoError::NotFound {
        entity: "note",
        id: note_id,
    }
}
