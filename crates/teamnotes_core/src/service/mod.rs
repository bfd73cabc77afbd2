//! Core use-case services.
//!
//! # Responsibility
//! - Apply ownership/share/roster authorization before any repository write.
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep transport layers decoupled from storage details.
//!
//! # Invariants
//! - Caller identity is always an explicit argument; services hold no
//!   per-request state.
//! - The first failing check aborts the operation with no partial effect.

pub mod error;
pub mod folder_service;
pub mod note_service;
pub mod share_service;
pub mod team_service;

use crate::service::error::{ErrorKind, ServiceResult};
use log::{error, info, warn};

/// Emits one outcome line for a service operation and passes the result on.
///
/// Only ids and counts go into `fields`; names, titles and bodies never do.
pub(crate) fn finish<T>(
    event: &str,
    module: &str,
    fields: &str,
    result: ServiceResult<T>,
) -> ServiceResult<T> {
    match &result {
        Ok(_) => info!("event={} module={} status=ok {}", event, module, fields),
        Err(err) if err.kind() == ErrorKind::StorageFailure => error!(
            "event={} module={} status=error {} error_code={} error={}",
            event,
            module,
            fields,
            err.code(),
            err
        ),
        Err(err) => warn!(
            "event={} module={} status=denied {} error_code={}",
            event,
            module,
            fields,
            err.code()
        ),
    }
    result
}
