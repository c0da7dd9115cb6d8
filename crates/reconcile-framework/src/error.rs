//! # Engine Errors
//!
//! This module defines the error taxonomy used throughout the reconciliation engine.
//! Every lifecycle operation returns a [`ReconcileError`], so callers pattern match on one
//! enum regardless of which step failed.

use crate::identity::Identity;
use crate::port::TransportError;

/// Errors produced by the reconciliation engine.
///
/// # Design Note: One Enum for the Engine
///
/// The engine uses a single error type for all four lifecycle operations plus catalog loading
/// and import parsing. A `Read` can therefore never fail with `AlreadyExists` in practice,
/// but the caller only ever deals with one type when turning failures into diagnostics.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    /// The heartbeat/catalog fetch did not complete.
    #[error("failed to heartbeat control-plane: {0}")]
    Unreachable(#[source] TransportError),

    /// The catalog bodies could not be decoded.
    #[error("malformed catalog: {0}")]
    MalformedCatalog(String),

    /// A fetch or put failed at the transport level. Never retried.
    #[error("{context}: {source}")]
    Transport {
        context: &'static str,
        #[source]
        source: TransportError,
    },

    /// The logical type has no entry in the catalog.
    #[error("Resource type '{0}' is not supported by the server")]
    UnsupportedType(String),

    /// Create found an object already present at the target identity.
    #[error("Resource already exists: {0}")]
    AlreadyExists(Identity),

    /// The object was absent immediately after a successful write.
    #[error("Resource didn't exist just after the put: {0}")]
    PostWriteMissing(Identity),

    /// A declared or fetched document is not a JSON object.
    #[error("malformed document: {0}")]
    MalformedDocument(String),

    /// An identity field stayed unknown after resolution.
    #[error("identity field '{0}' is unknown and could not be derived from the document")]
    IncompleteIdentity(&'static str),

    /// The import identifier does not have two or three segments.
    #[error("invalid import id '{0}': the id of a resource must be of the format `/<mesh>/<typeOrPath>/<name>` or `/<typeOrPath>/<name>`")]
    InvalidImportId(String),

    /// The delete call itself failed.
    #[error("Unable to delete {identity}: {source}")]
    Delete {
        identity: Identity,
        #[source]
        source: TransportError,
    },
}

impl ReconcileError {
    pub(crate) fn transport(context: &'static str) -> impl FnOnce(TransportError) -> Self {
        move |source| ReconcileError::Transport { context, source }
    }
}
