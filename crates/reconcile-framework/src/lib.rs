//! # Reconcile Framework
//!
//! This crate reconciles a user-declared description of a managed resource against the actual
//! object held by a policy-management control plane, so that declared and observed state
//! converge.
//!
//! ## Architecture Overview
//!
//! Leaves first:
//!
//! 1. **Port** ([`RemoteAccess`]) - fetch, create-or-replace, delete and a one-time heartbeat.
//!    Owned by whoever embeds the engine; the engine only calls it.
//! 2. **Catalog** ([`MetadataCatalog`]) - logical type name to API path segment, loaded once.
//! 3. **Identity** ([`IdentityResolver`]) - `(mesh, type, name)` from explicit fields or from the
//!    document body.
//! 4. **Normalizer** ([`normalize`]) - drops `creationTime` / `modificationTime`.
//! 5. **Reconciler** ([`Reconciler`]) - create, read, update, delete.
//! 6. **Import** ([`parse_import_id`]) - `mesh/typeOrPath/name` back into an identity.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! let reconciler = Reconciler::connect(remote).await?;
//!
//! let declared = DeclaredDocument::new(r#"{"type":"MeshTrafficPermission","mesh":"default","name":"allow-all","spec":{}}"#);
//! let observed = reconciler.create(&declared).await?;
//!
//! // persist observed.into_declared(), then later:
//! let state = reconciler.read(&stored).await?;
//! ```
//!
//! ## Concurrency Model
//!
//! - Every operation is a sequence of awaited port calls; nothing is retried.
//! - The catalog is shared through an `Arc` and never mutated after load.
//! - Operations on one object must be serialized by the caller.
//!
//! ## Testing
//!
//! [`mock::MockRemote`] scripts port responses for unit tests. See the [`mock`] module.

pub mod catalog;
pub mod error;
pub mod identity;
pub mod import;
pub mod mock;
pub mod normalize;
pub mod port;
pub mod reconciler;
pub mod tracing;

// Re-export core types for convenience
pub use catalog::{MetadataCatalog, ResourceTypeEntry, ServerInfo};
pub use error::ReconcileError;
pub use identity::{DeclaredDocument, Identity, IdentityResolver};
pub use import::parse_import_id;
pub use normalize::normalize;
pub use port::{resource_path, CatalogPayload, RemoteAccess, TransportError};
pub use reconciler::{DeleteOutcome, Observed, ReadOutcome, Reconciler};
