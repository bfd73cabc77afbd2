//! Note domain model.
//!
//! # Invariants
//! - Every note belongs to exactly one folder.
//! - `owner_id` equals the parent folder owner at creation time.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::caller::UserId;
use crate::model::folder::FolderId;

/// Stable note identifier.
pub type NoteId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub body: String,
    pub folder_id: FolderId,
    pub owner_id: UserId,
    /// Epoch ms creation timestamp.
    pub created_at: i64,
    /// Epoch ms update timestamp.
    pub updated_at: i64,
}

impl Note {
    /// Returns whether `user_id` owns this note.
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.owner_id == user_id
    }
}
