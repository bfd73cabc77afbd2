//! Folder domain model.
//!
//! # Invariants
//! - `owner_id` is fixed at creation and never transfers.
//! - `name` is non-blank after trim.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::caller::UserId;
use crate::model::note::Note;
use crate::model::share::EffectiveAccess;

/// Stable folder identifier.
pub type FolderId = Uuid;

/// Top-level container owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub id: FolderId,
    pub name: String,
    pub owner_id: UserId,
    /// Epoch ms creation timestamp.
    pub created_at: i64,
    /// Epoch ms update timestamp.
    pub updated_at: i64,
}

impl Folder {
    /// Returns whether `user_id` owns this folder.
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.owner_id == user_id
    }
}

/// Folder read model returned to callers allowed to see it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderDetail {
    #[serde(flatten)]
    pub folder: Folder,
    /// Notes currently inside the folder, in creation order.
    pub notes: Vec<Note>,
    /// How the requesting caller reaches this folder.
    pub access: EffectiveAccess,
}
