//! # Reconciler
//!
//! The four lifecycle operations for one managed object. Each is an independent, short
//! sequence of [`RemoteAccess`] calls: no state machine state survives between calls beyond what
//! the caller passes in.
//!
//! ## Fetch-Mutate-Fetch
//!
//! After every mutating call the reconciler fetches the object again and returns the server's
//! representation, normalized, instead of echoing the request body. The control plane may
//! default or rewrite fields, and the caller must store what the server holds.
//!
//! | Operation | Calls                                  | Outcome                          |
//! |-----------|----------------------------------------|----------------------------------|
//! | `create`  | fetch (must be absent), put, fetch     | [`Observed`]                     |
//! | `read`    | fetch                                  | [`ReadOutcome`]                  |
//! | `update`  | put, fetch                             | [`Observed`]                     |
//! | `delete`  | fetch, delete (only if present)        | [`DeleteOutcome`]                |
//!
//! Operations on the *same* object must be serialized by the caller. Operations on different
//! objects may run concurrently; they share only the immutable catalog.

use crate::catalog::MetadataCatalog;
use crate::error::ReconcileError;
use crate::identity::{DeclaredDocument, Identity, IdentityResolver};
use crate::import::parse_import_id;
use crate::normalize::normalize;
use crate::port::RemoteAccess;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Server truth for one object after a successful operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observed {
    pub identity: Identity,
    /// Normalized JSON body.
    pub body: String,
}

impl Observed {
    /// The state the caller persists; all identity fields are known.
    pub fn into_declared(self) -> DeclaredDocument {
        DeclaredDocument::from_identity(&self.identity, self.body)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    Present(Observed),
    /// The object no longer exists; the caller drops its record.
    Gone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// Non-fatal: the object was already absent.
    AlreadyDeleted,
}

/// Drives create/read/update/delete cycles through a [`RemoteAccess`] port.
#[derive(Clone)]
pub struct Reconciler<R> {
    remote: R,
    catalog: Arc<MetadataCatalog>,
}

impl<R: RemoteAccess> Reconciler<R> {
    /// Builds a reconciler around an already loaded catalog.
    pub fn new(remote: R, catalog: Arc<MetadataCatalog>) -> Self {
        Self { remote, catalog }
    }

    /// Loads the catalog once through `remote`, then builds the reconciler.
    pub async fn connect(remote: R) -> Result<Self, ReconcileError> {
        let catalog = MetadataCatalog::load(&remote).await?;
        Ok(Self::new(remote, Arc::new(catalog)))
    }

    pub fn catalog(&self) -> &Arc<MetadataCatalog> {
        &self.catalog
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    pub fn resolver(&self) -> IdentityResolver<'_> {
        IdentityResolver::new(&self.catalog)
    }

    /// Creates a new object. Fails if one already exists at the resolved identity.
    #[instrument(skip_all)]
    pub async fn create(&self, declared: &DeclaredDocument) -> Result<Observed, ReconcileError> {
        let identity = self.resolver().resolve(declared)?;
        debug!(%identity, body = %declared.body, "Create");

        if self
            .fetch(&identity, "Unable to fetch resource before create")
            .await?
            .is_some()
        {
            warn!(%identity, "Resource already exists");
            return Err(ReconcileError::AlreadyExists(identity));
        }

        self.put(&identity, &declared.body, "Unable to create resource")
            .await?;
        let observed = self.fetch_after_write(identity).await?;
        info!(identity = %observed.identity, "Created");
        Ok(observed)
    }

    /// Refreshes an object whose identity is already committed in `prior`.
    #[instrument(skip_all)]
    pub async fn read(&self, prior: &DeclaredDocument) -> Result<ReadOutcome, ReconcileError> {
        let identity = self.resolver().resolve_committed(prior)?;
        debug!(%identity, "Read");

        match self.fetch(&identity, "Unable to read resource").await? {
            Some(raw) => {
                let body = normalize(&raw)?;
                Ok(ReadOutcome::Present(Observed { identity, body }))
            }
            None => {
                info!(%identity, "Resource no longer exists");
                Ok(ReadOutcome::Gone)
            }
        }
    }

    /// Unconditionally writes the declared body, then returns the server's version.
    #[instrument(skip_all)]
    pub async fn update(&self, declared: &DeclaredDocument) -> Result<Observed, ReconcileError> {
        let identity = self.resolver().resolve(declared)?;
        debug!(%identity, body = %declared.body, "Update");

        self.put(&identity, &declared.body, "Unable to update resource")
            .await?;
        let observed = self.fetch_after_write(identity).await?;
        info!(identity = %observed.identity, "Updated");
        Ok(observed)
    }

    /// Deletes an object whose identity is committed in `prior`.
    #[instrument(skip_all)]
    pub async fn delete(&self, prior: &DeclaredDocument) -> Result<DeleteOutcome, ReconcileError> {
        let identity = self.resolver().resolve_committed(prior)?;
        debug!(%identity, "Delete");

        if self
            .fetch(&identity, "Unable to read resource before delete")
            .await?
            .is_none()
        {
            warn!(%identity, "Resource was already deleted");
            return Ok(DeleteOutcome::AlreadyDeleted);
        }

        if let Err(source) = self
            .remote
            .delete(&identity.mesh, &identity.path_segment, &identity.name)
            .await
        {
            warn!(%identity, error = %source, "Delete failed");
            return Err(ReconcileError::Delete { identity, source });
        }
        info!(%identity, "Deleted");
        Ok(DeleteOutcome::Deleted)
    }

    /// Parses an import identifier and reads the object it names.
    #[instrument(skip(self))]
    pub async fn import(&self, id: &str) -> Result<ReadOutcome, ReconcileError> {
        let identity = parse_import_id(id, &self.catalog)?;
        self.read(&DeclaredDocument::from_identity(&identity, String::new()))
            .await
    }

    async fn fetch(
        &self,
        identity: &Identity,
        context: &'static str,
    ) -> Result<Option<Vec<u8>>, ReconcileError> {
        self.remote
            .fetch(&identity.mesh, &identity.path_segment, &identity.name)
            .await
            .map_err(ReconcileError::transport(context))
    }

    async fn put(
        &self,
        identity: &Identity,
        body: &str,
        context: &'static str,
    ) -> Result<(), ReconcileError> {
        self.remote
            .put(&identity.mesh, &identity.path_segment, &identity.name, body)
            .await
            .map_err(ReconcileError::transport(context))
    }

    async fn fetch_after_write(&self, identity: Identity) -> Result<Observed, ReconcileError> {
        match self
            .fetch(&identity, "Unable to fetch resource after write")
            .await?
        {
            Some(raw) => {
                let body = normalize(&raw)?;
                Ok(Observed { identity, body })
            }
            None => {
                warn!(%identity, "Resource missing right after write");
                Err(ReconcileError::PostWriteMissing(identity))
            }
        }
    }
}
