//! # In-Memory Control Plane
//!
//! [`ControlPlaneActor`] is a stand-in for the real control plane: it owns a store of objects
//! keyed by [`ObjectPath`] and answers the same HTTP-shaped requests the real API does. Like any
//! actor it processes its messages *sequentially*, so the store needs no locking.
//!
//! ## Server Behavior
//!
//! * **Index / Policies**: served from the [`ControlPlaneConfig`].
//! * **Get**: 200 with the stored document, 404 if absent.
//! * **Put**:
//!     1. 404 for an unknown path segment, 405 for a read-only type.
//!     2. 400 if the body is not a JSON object.
//!     3. Rewrites `type`, `mesh` and `name` from the path.
//!     4. Keeps `creationTime` of the object being replaced and stamps a new `modificationTime`.
//!     5. 201 on create, 200 on replace.
//! * **Delete**: 200 if removed, 404 if absent, 405 for a read-only type.

use super::client::ControlPlaneClient;
use super::message::{ControlPlaneRequest, HttpReply, ObjectPath};
use crate::config::ControlPlaneConfig;
use reconcile_framework::ResourceTypeEntry;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// The server half of the in-memory control plane.
pub struct ControlPlaneActor {
    receiver: mpsc::Receiver<ControlPlaneRequest>,
    store: HashMap<ObjectPath, Map<String, Value>>,
    config: ControlPlaneConfig,
}

impl ControlPlaneActor {
    /// Creates the actor and its client.
    ///
    /// The actor does nothing until [`run`](Self::run) is spawned.
    pub fn new(config: ControlPlaneConfig) -> (Self, ControlPlaneClient) {
        let (sender, receiver) = mpsc::channel(config.buffer_size.max(1));
        let actor = Self {
            receiver,
            store: HashMap::new(),
            config,
        };
        (actor, ControlPlaneClient::new(sender))
    }

    /// Processes requests until every client has been dropped.
    pub async fn run(mut self) {
        info!(
            product = %self.config.product,
            version = %self.config.version,
            types = self.config.resource_types.len(),
            "Control plane started"
        );

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ControlPlaneRequest::Index { respond_to } => {
                    let _ = respond_to.send(self.index());
                }
                ControlPlaneRequest::Policies { respond_to } => {
                    let _ = respond_to.send(self.policies());
                }
                ControlPlaneRequest::Get { path, respond_to } => {
                    let reply = self.get(&path);
                    debug!(%path, status = reply.status, "GET");
                    let _ = respond_to.send(reply);
                }
                ControlPlaneRequest::Put {
                    path,
                    body,
                    respond_to,
                } => {
                    let reply = self.put(&path, &body);
                    if reply.status >= 400 {
                        warn!(%path, status = reply.status, "PUT rejected");
                    } else {
                        info!(%path, status = reply.status, size = self.store.len(), "PUT");
                    }
                    let _ = respond_to.send(reply);
                }
                ControlPlaneRequest::Delete { path, respond_to } => {
                    let reply = self.delete(&path);
                    info!(%path, status = reply.status, size = self.store.len(), "DELETE");
                    let _ = respond_to.send(reply);
                }
            }
        }

        info!(size = self.store.len(), "Control plane shutdown");
    }

    fn entry_for(&self, path_segment: &str) -> Option<&ResourceTypeEntry> {
        self.config
            .resource_types
            .iter()
            .find(|e| e.path_segment == path_segment)
    }

    fn index(&self) -> HttpReply {
        HttpReply::json(
            200,
            &json!({
                "hostname": "in-memory",
                "tagline": self.config.product,
                "product": self.config.product,
                "version": self.config.version,
            }),
        )
    }

    fn policies(&self) -> HttpReply {
        let policies: Vec<Value> = self
            .config
            .resource_types
            .iter()
            .map(|e| {
                json!({
                    "name": e.logical_name,
                    "path": e.path_segment,
                    "readOnly": e.read_only,
                })
            })
            .collect();
        HttpReply::json(200, &json!({ "policies": policies }))
    }

    fn get(&self, path: &ObjectPath) -> HttpReply {
        match self.store.get(path) {
            Some(document) => HttpReply::new(200, Value::Object(document.clone()).to_string()),
            None => not_found(path),
        }
    }

    fn put(&mut self, path: &ObjectPath, body: &str) -> HttpReply {
        let logical_name = match self.entry_for(&path.path_segment) {
            Some(entry) if entry.read_only => return read_only(path),
            Some(entry) => entry.logical_name.clone(),
            None => return not_found(path),
        };

        let mut document: Map<String, Value> = match serde_json::from_str(body) {
            Ok(document) => document,
            Err(e) => {
                return HttpReply::json(
                    400,
                    &json!({ "title": "Could not process a resource", "detail": e.to_string() }),
                )
            }
        };

        let now = Value::String(timestamp());
        let (status, created) = match self.store.get(path) {
            Some(existing) => (
                200,
                existing
                    .get("creationTime")
                    .cloned()
                    .unwrap_or_else(|| now.clone()),
            ),
            None => (201, now.clone()),
        };

        document.insert("type".to_owned(), Value::String(logical_name));
        document.insert("mesh".to_owned(), Value::String(path.mesh.clone()));
        document.insert("name".to_owned(), Value::String(path.name.clone()));
        document.insert("creationTime".to_owned(), created);
        document.insert("modificationTime".to_owned(), now);
        self.store.insert(path.clone(), document);

        HttpReply::new(status, Vec::new())
    }

    fn delete(&mut self, path: &ObjectPath) -> HttpReply {
        if self.entry_for(&path.path_segment).is_some_and(|e| e.read_only) {
            return read_only(path);
        }
        match self.store.remove(path) {
            Some(_) => HttpReply::json(200, &json!({})),
            None => not_found(path),
        }
    }
}

fn timestamp() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default()
}

fn not_found(path: &ObjectPath) -> HttpReply {
    HttpReply::json(
        404,
        &json!({ "title": "Could not get a resource", "detail": format!("{} not found", path) }),
    )
}

fn read_only(path: &ObjectPath) -> HttpReply {
    HttpReply::json(
        405,
        &json!({ "title": "Method not allowed", "detail": format!("{} is read only", path) }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor() -> ControlPlaneActor {
        let mut config = ControlPlaneConfig::default();
        config.resource_types = vec![
            ResourceTypeEntry::policy("MeshTimeout", "meshtimeouts"),
            ResourceTypeEntry {
                read_only: true,
                ..ResourceTypeEntry::policy("MeshGatewayInstance", "meshgatewayinstances")
            },
        ];
        ControlPlaneActor::new(config).0
    }

    fn stored(actor: &ControlPlaneActor, path: &ObjectPath) -> Map<String, Value> {
        let reply = actor.get(path);
        assert_eq!(reply.status, 200);
        serde_json::from_slice(&reply.body).unwrap()
    }

    #[test]
    fn test_put_creates_then_replaces() {
        let mut actor = actor();
        let path = ObjectPath::new("default", "meshtimeouts", "t");

        assert_eq!(actor.put(&path, r#"{"spec":{"a":1}}"#).status, 201);
        let first = stored(&actor, &path);
        assert_eq!(first["type"], "MeshTimeout");
        assert_eq!(first["mesh"], "default");
        assert_eq!(first["name"], "t");

        assert_eq!(actor.put(&path, r#"{"spec":{"a":2}}"#).status, 200);
        let second = stored(&actor, &path);
        assert_eq!(second["creationTime"], first["creationTime"]);
        assert_eq!(second["spec"]["a"], 2);
    }

    #[test]
    fn test_put_rejections() {
        let mut actor = actor();
        let unknown = ObjectPath::new("default", "meshwidgets", "w");
        let read_only = ObjectPath::new("default", "meshgatewayinstances", "g");
        let ok = ObjectPath::new("default", "meshtimeouts", "t");

        assert_eq!(actor.put(&unknown, "{}").status, 404);
        assert_eq!(actor.put(&read_only, "{}").status, 405);
        assert_eq!(actor.put(&ok, "[1]").status, 400);
        assert_eq!(actor.get(&ok).status, 404);
    }

    #[test]
    fn test_delete() {
        let mut actor = actor();
        let path = ObjectPath::new("default", "meshtimeouts", "t");
        assert_eq!(actor.delete(&path).status, 404);
        actor.put(&path, "{}");
        assert_eq!(actor.delete(&path).status, 200);
        assert_eq!(actor.get(&path).status, 404);
    }
}
