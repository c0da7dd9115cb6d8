//! # Control Plane Messages
//!
//! The requests a [`ControlPlaneClient`](super::ControlPlaneClient) sends to the
//! [`ControlPlaneActor`](super::ControlPlaneActor). Each variant mirrors one HTTP call of the
//! real API and carries a one-shot channel for the reply.

use reconcile_framework::resource_path;
use std::fmt;
use tokio::sync::oneshot;

/// Status code and body of one reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpReply {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn json(status: u16, value: &serde_json::Value) -> Self {
        Self::new(status, value.to_string())
    }
}

/// Type alias for the one-shot reply channel.
pub type Reply = oneshot::Sender<HttpReply>;

/// Where one object lives: `/meshes/{mesh}/{path_segment}/{name}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectPath {
    pub mesh: String,
    pub path_segment: String,
    pub name: String,
}

impl ObjectPath {
    pub fn new(mesh: &str, path_segment: &str, name: &str) -> Self {
        Self {
            mesh: mesh.to_owned(),
            path_segment: path_segment.to_owned(),
            name: name.to_owned(),
        }
    }
}

impl fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&resource_path(&self.mesh, &self.path_segment, &self.name))
    }
}

/// Requests handled by the control plane actor.
///
/// - **Index**: `GET /`
/// - **Policies**: `GET /policies`
/// - **Get**: `GET /meshes/{mesh}/{type}/{name}`
/// - **Put**: `PUT /meshes/{mesh}/{type}/{name}`
/// - **Delete**: `DELETE /meshes/{mesh}/{type}/{name}`
#[derive(Debug)]
pub enum ControlPlaneRequest {
    Index {
        respond_to: Reply,
    },
    Policies {
        respond_to: Reply,
    },
    Get {
        path: ObjectPath,
        respond_to: Reply,
    },
    Put {
        path: ObjectPath,
        body: String,
        respond_to: Reply,
    },
    Delete {
        path: ObjectPath,
        respond_to: Reply,
    },
}
