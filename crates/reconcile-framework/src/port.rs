//! # Remote Access Port
//!
//! The capability the engine consumes to talk to the control plane. The engine never builds
//! HTTP requests itself; it only calls the four operations of [`RemoteAccess`]. Production code
//! plugs in an HTTP-backed implementation, tests plug in [`MockRemote`](crate::mock::MockRemote)
//! or an in-memory control plane.

use async_trait::async_trait;
use std::sync::Arc;

/// Path of the server info document.
pub const INDEX_PATH: &str = "/";

/// Path of the resource-type listing.
pub const POLICIES_PATH: &str = "/policies";

/// Renders the API path of one object: `/meshes/{mesh}/{path_segment}/{name}`.
pub fn resource_path(mesh: &str, path_segment: &str, name: &str) -> String {
    format!("/meshes/{}/{}/{}", mesh, path_segment, name)
}

/// Failure of a single port call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// No response was obtained at all.
    #[error("control plane unreachable: {0}")]
    Unreachable(String),

    /// The server answered with a status the call does not accept.
    #[error("invalid http response '{status}' for {method} '{path}' request. Response: '{body}'")]
    Status {
        method: &'static str,
        path: String,
        status: u16,
        body: String,
    },
}

impl TransportError {
    pub fn status(method: &'static str, path: impl Into<String>, status: u16, body: &[u8]) -> Self {
        TransportError::Status {
            method,
            path: path.into(),
            status,
            body: String::from_utf8_lossy(body).into_owned(),
        }
    }
}

/// Raw bodies returned by the heartbeat: the server index and the resource-type listing.
///
/// Decoding is left to [`MetadataCatalog::load`](crate::catalog::MetadataCatalog::load) so that
/// an undecodable catalog is reported separately from an unreachable server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogPayload {
    /// Body of `GET /`.
    pub index: Vec<u8>,
    /// Body of `GET /policies`.
    pub policies: Vec<u8>,
}

/// Keyed access to objects on the control plane.
///
/// # Contract
///
/// - `fetch` returns `Ok(None)` when the object does not exist. Absence is not an error.
/// - `put` is create-or-replace and succeeds on 200 or 201.
/// - `delete` succeeds on 200.
/// - Any other outcome is a [`TransportError`], surfaced verbatim and never retried.
///
/// Implementations must be `Send + Sync`: one port is shared by every in-flight reconciliation.
#[async_trait]
pub trait RemoteAccess: Send + Sync {
    /// Fetches the server info and the resource-type listing.
    async fn heartbeat(&self) -> Result<CatalogPayload, TransportError>;

    /// Fetches one object, or `None` if it does not exist.
    async fn fetch(
        &self,
        mesh: &str,
        path_segment: &str,
        name: &str,
    ) -> Result<Option<Vec<u8>>, TransportError>;

    /// Creates or replaces one object with `body`.
    async fn put(
        &self,
        mesh: &str,
        path_segment: &str,
        name: &str,
        body: &str,
    ) -> Result<(), TransportError>;

    /// Deletes one object.
    async fn delete(&self, mesh: &str, path_segment: &str, name: &str)
        -> Result<(), TransportError>;
}

#[async_trait]
impl<T: RemoteAccess + ?Sized> RemoteAccess for Arc<T> {
    async fn heartbeat(&self) -> Result<CatalogPayload, TransportError> {
        (**self).heartbeat().await
    }

    async fn fetch(
        &self,
        mesh: &str,
        path_segment: &str,
        name: &str,
    ) -> Result<Option<Vec<u8>>, TransportError> {
        (**self).fetch(mesh, path_segment, name).await
    }

    async fn put(
        &self,
        mesh: &str,
        path_segment: &str,
        name: &str,
        body: &str,
    ) -> Result<(), TransportError> {
        (**self).put(mesh, path_segment, name, body).await
    }

    async fn delete(
        &self,
        mesh: &str,
        path_segment: &str,
        name: &str,
    ) -> Result<(), TransportError> {
        (**self).delete(mesh, path_segment, name).await
    }
}
