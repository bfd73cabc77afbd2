//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts, one per aggregate.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Every multi-row mutation is one repository call backed by one
//!   `IMMEDIATE` transaction; callers never observe partial cascades.
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.
//! - Repositories do not authorize; services check access before calling.

pub mod error;
pub mod folder_repo;
pub mod note_repo;
pub mod share_repo;
mod sql;
pub mod team_repo;
