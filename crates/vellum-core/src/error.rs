//! Error types for document mutations.

use thiserror::Error;
use uuid::Uuid;

/// Errors raised at the document mutation boundary.
///
/// Interactive operations that cannot complete (missing ids, insufficient
/// selection, degenerate geometry) are silent no-ops; only structural
/// violations that would corrupt the object graph are rejected with an error.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Unknown object: {0}")]
    UnknownObject(Uuid),
    #[error("Reparenting {child} under {parent} would create a cycle")]
    WouldCycle { child: Uuid, parent: Uuid },
    #[error("Object {0} is not a group")]
    NotAGroup(Uuid),
}

/// Result type for document mutations.
pub type DocumentResult<T> = Result<T, DocumentError>;
