//! Core domain logic for team notes.
//! Folders, notes, share grants and team rosters over one SQLite store.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, CoreConfig};
pub use db::{open_db, open_db_in_memory, DbError};
pub use logging::{default_log_level, init_from_config, init_logging, logging_status};
pub use model::asset::AssetBundle;
pub use model::caller::{Caller, CallerError, CallerRole, UserId};
pub use model::folder::{Folder, FolderDetail, FolderId};
pub use model::note::{Note, NoteId};
pub use model::share::{
    AccessLevel, EffectiveAccess, FolderShare, NoteShare, SharedFolder, SharedNote,
};
pub use model::team::{RosterEntry, Team, TeamDetail, TeamId};
pub use repo::error::{RepoError, RepoResult};
pub use service::error::{ErrorKind, ForbiddenReason, ServiceError, ServiceResult};
pub use service::folder_service::FolderService;
pub use service::note_service::NoteService;
pub use service::share_service::{ShareOutcome, ShareService};
pub use service::team_service::TeamService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
