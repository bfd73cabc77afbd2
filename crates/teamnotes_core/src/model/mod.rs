//! Domain model for folders, notes, share grants and team rosters.
//!
//! # Responsibility
//! - Define plain records shared by repositories and services.
//! - Hold pure access-resolution rules that need no storage.
//!
//! # Invariants
//! - Folder/note/team ids are server-generated UUIDs.
//! - User ids are opaque strings owned by the auth layer.

pub mod asset;
pub mod caller;
pub mod folder;
pub mod note;
pub mod share;
pub mod team;
