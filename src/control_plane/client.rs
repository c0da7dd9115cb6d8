//! # Control Plane Client
//!
//! [`ControlPlaneClient`] implements the engine's [`RemoteAccess`] port on top of the
//! in-memory control plane. Each call becomes one [`ControlPlaneRequest`] and its status code is
//! mapped exactly as an HTTP client for the real API would map it.

use super::message::{ControlPlaneRequest, HttpReply, ObjectPath, Reply};
use async_trait::async_trait;
use reconcile_framework::port::{INDEX_PATH, POLICIES_PATH};
use reconcile_framework::{CatalogPayload, RemoteAccess, TransportError};
use tokio::sync::{mpsc, oneshot};

/// Cheap to clone: it only holds the sender half of the actor's channel.
#[derive(Clone)]
pub struct ControlPlaneClient {
    sender: mpsc::Sender<ControlPlaneRequest>,
}

impl ControlPlaneClient {
    pub fn new(sender: mpsc::Sender<ControlPlaneRequest>) -> Self {
        Self { sender }
    }

    async fn call(
        &self,
        request: impl FnOnce(Reply) -> ControlPlaneRequest,
    ) -> Result<HttpReply, TransportError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(request(respond_to))
            .await
            .map_err(|_| TransportError::Unreachable("control plane closed".into()))?;
        response
            .await
            .map_err(|_| TransportError::Unreachable("control plane dropped the response".into()))
    }

    async fn get_document(&self, path: &'static str) -> Result<Vec<u8>, TransportError> {
        let reply = if path == INDEX_PATH {
            self.call(|respond_to| ControlPlaneRequest::Index { respond_to })
                .await?
        } else {
            self.call(|respond_to| ControlPlaneRequest::Policies { respond_to })
                .await?
        };
        match reply.status {
            200 => Ok(reply.body),
            status => Err(TransportError::status("GET", path, status, &reply.body)),
        }
    }
}

#[async_trait]
impl RemoteAccess for ControlPlaneClient {
    async fn heartbeat(&self) -> Result<CatalogPayload, TransportError> {
        Ok(CatalogPayload {
            index: self.get_document(INDEX_PATH).await?,
            policies: self.get_document(POLICIES_PATH).await?,
        })
    }

    async fn fetch(
        &self,
        mesh: &str,
        path_segment: &str,
        name: &str,
    ) -> Result<Option<Vec<u8>>, TransportError> {
        let path = ObjectPath::new(mesh, path_segment, name);
        let target = path.to_string();
        let reply = self
            .call(|respond_to| ControlPlaneRequest::Get { path, respond_to })
            .await?;
        match reply.status {
            200 => Ok(Some(reply.body)),
            404 => Ok(None),
            status => Err(TransportError::status("GET", target, status, &reply.body)),
        }
    }

    async fn put(
        &self,
        mesh: &str,
        path_segment: &str,
        name: &str,
        body: &str,
    ) -> Result<(), TransportError> {
        let path = ObjectPath::new(mesh, path_segment, name);
        let target = path.to_string();
        let body = body.to_owned();
        let reply = self
            .call(|respond_to| ControlPlaneRequest::Put {
                path,
                body,
                respond_to,
            })
            .await?;
        match reply.status {
            200 | 201 => Ok(()),
            status => Err(TransportError::status("PUT", target, status, &reply.body)),
        }
    }

    async fn delete(
        &self,
        mesh: &str,
        path_segment: &str,
        name: &str,
    ) -> Result<(), TransportError> {
        let path = ObjectPath::new(mesh, path_segment, name);
        let target = path.to_string();
        let reply = self
            .call(|respond_to| ControlPlaneRequest::Delete { path, respond_to })
            .await?;
        match reply.status {
            200 => Ok(()),
            status => Err(TransportError::status("DELETE", target, status, &reply.body)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A client whose actor answers every request with `reply`.
    fn scripted(reply: HttpReply) -> ControlPlaneClient {
        let (sender, mut receiver) = mpsc::channel::<ControlPlaneRequest>(4);
        tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                let respond_to = match request {
                    ControlPlaneRequest::Index { respond_to }
                    | ControlPlaneRequest::Policies { respond_to }
                    | ControlPlaneRequest::Get { respond_to, .. }
                    | ControlPlaneRequest::Put { respond_to, .. }
                    | ControlPlaneRequest::Delete { respond_to, .. } => respond_to,
                };
                let _ = respond_to.send(reply.clone());
            }
        });
        ControlPlaneClient::new(sender)
    }

    #[tokio::test]
    async fn test_fetch_status_mapping() {
        let found = scripted(HttpReply::new(200, "{}"));
        assert_eq!(found.fetch("m", "p", "n").await, Ok(Some(b"{}".to_vec())));

        let missing = scripted(HttpReply::new(404, ""));
        assert_eq!(missing.fetch("m", "p", "n").await, Ok(None));

        let broken = scripted(HttpReply::new(500, "oops"));
        assert_eq!(
            broken.fetch("m", "p", "n").await,
            Err(TransportError::status("GET", "/meshes/m/p/n", 500, b"oops"))
        );
    }

    #[tokio::test]
    async fn test_put_accepts_200_and_201_only() {
        assert!(scripted(HttpReply::new(200, "")).put("m", "p", "n", "{}").await.is_ok());
        assert!(scripted(HttpReply::new(201, "")).put("m", "p", "n", "{}").await.is_ok());
        assert!(matches!(
            scripted(HttpReply::new(204, "")).put("m", "p", "n", "{}").await,
            Err(TransportError::Status { status: 204, .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_accepts_200_only() {
        assert!(scripted(HttpReply::new(200, "")).delete("m", "p", "n").await.is_ok());
        assert!(scripted(HttpReply::new(404, "")).delete("m", "p", "n").await.is_err());
    }

    #[tokio::test]
    async fn test_closed_control_plane_is_unreachable() {
        let (sender, receiver) = mpsc::channel::<ControlPlaneRequest>(1);
        drop(receiver);
        let client = ControlPlaneClient::new(sender);

        assert!(matches!(
            client.heartbeat().await,
            Err(TransportError::Unreachable(_))
        ));
    }
}
