//! Aggregated asset views for one user or one team roster.

use serde::Serialize;

use crate::model::folder::Folder;
use crate::model::note::Note;
use crate::model::share::{SharedFolder, SharedNote};

/// Four named, ordered collections describing what a user set owns or
/// has been granted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetBundle {
    pub owned_folders: Vec<Folder>,
    pub shared_folders: Vec<SharedFolder>,
    pub owned_notes: Vec<Note>,
    pub shared_notes: Vec<SharedNote>,
}

impl AssetBundle {
    pub fn is_empty(&self) -> bool {
        self.owned_folders.is_empty()
            && self.shared_folders.is_empty()
            && self.owned_notes.is_empty()
            && self.shared_notes.is_empty()
    }
}
