//! Error type for the application layer.

use reconcile_framework::ReconcileError;
use thiserror::Error;

/// Errors raised while configuring, starting or stopping the system.
#[derive(Debug, Error)]
pub enum SystemError {
    /// The configuration JSON could not be decoded.
    #[error("invalid configuration: {0}")]
    ConfigDecode(#[from] serde_json::Error),

    /// The configuration decoded but violates a constraint.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The engine failed, e.g. while loading the catalog at startup.
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    /// The control plane task panicked or was cancelled.
    #[error("control plane task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
