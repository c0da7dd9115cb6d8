//! # Metadata Catalog
//!
//! The table mapping logical resource-type names (`MeshTrafficPermission`) to the path segment
//! the control plane uses for them (`meshtrafficpermissions`).
//!
//! The catalog is fetched exactly once through [`RemoteAccess::heartbeat`] and is immutable
//! afterwards. It is a plain value: build it at startup, wrap it in an `Arc`, and hand it to
//! every [`Reconciler`](crate::Reconciler) that needs it. There is no global instance and no
//! background refresh.

use crate::error::ReconcileError;
use crate::port::RemoteAccess;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{info, warn};

/// One supported resource type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceTypeEntry {
    pub logical_name: String,
    pub path_segment: String,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default)]
    pub is_policy: bool,
}

impl ResourceTypeEntry {
    /// A writable policy type.
    pub fn policy(logical_name: impl Into<String>, path_segment: impl Into<String>) -> Self {
        Self {
            logical_name: logical_name.into(),
            path_segment: path_segment.into(),
            read_only: false,
            is_policy: true,
        }
    }
}

/// Product and version reported by the control plane index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerInfo {
    #[serde(default)]
    pub product: String,
    #[serde(default)]
    pub version: String,
}

/// Wire shape of `GET /policies`.
#[derive(Deserialize)]
struct PoliciesResponse {
    policies: Vec<PolicyDescriptor>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PolicyDescriptor {
    name: String,
    path: String,
    #[serde(default)]
    read_only: bool,
}

/// The loaded, read-only resource-type table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataCatalog {
    server: ServerInfo,
    entries: Vec<ResourceTypeEntry>,
}

impl MetadataCatalog {
    /// Performs the single heartbeat/catalog fetch and decodes it.
    ///
    /// # Errors
    ///
    /// - [`ReconcileError::Unreachable`] if the heartbeat call fails.
    /// - [`ReconcileError::MalformedCatalog`] if either body cannot be decoded.
    pub async fn load<R: RemoteAccess + ?Sized>(remote: &R) -> Result<Self, ReconcileError> {
        let payload = remote
            .heartbeat()
            .await
            .map_err(ReconcileError::Unreachable)?;

        let server: ServerInfo = serde_json::from_slice(&payload.index)
            .map_err(|e| ReconcileError::MalformedCatalog(format!("index: {}", e)))?;
        let listing: PoliciesResponse = serde_json::from_slice(&payload.policies)
            .map_err(|e| ReconcileError::MalformedCatalog(format!("policies: {}", e)))?;

        let entries = listing
            .policies
            .into_iter()
            .map(|p| ResourceTypeEntry {
                logical_name: p.name,
                path_segment: p.path,
                read_only: p.read_only,
                is_policy: true,
            })
            .collect();

        let catalog = Self::from_entries(server, entries);
        info!(
            product = %catalog.server.product,
            version = %catalog.server.version,
            types = catalog.entries.len(),
            "successfully checked connection"
        );
        Ok(catalog)
    }

    /// Builds a catalog without a fetch, e.g. a fixed single-type map.
    pub fn from_entries(server: ServerInfo, entries: Vec<ResourceTypeEntry>) -> Self {
        {
            let mut names = HashSet::new();
            let mut paths = HashSet::new();
            for entry in &entries {
                if !names.insert(entry.logical_name.as_str()) {
                    warn!(logical_name = %entry.logical_name, "Duplicate catalog entry, first match wins");
                }
                if !paths.insert(entry.path_segment.as_str()) {
                    warn!(path_segment = %entry.path_segment, "Duplicate catalog entry, first match wins");
                }
            }
        }
        Self { server, entries }
    }

    pub fn server(&self) -> &ServerInfo {
        &self.server
    }

    pub fn entries(&self) -> &[ResourceTypeEntry] {
        &self.entries
    }

    /// Logical name to path segment.
    pub fn resolve_to_path(&self, logical_name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.logical_name == logical_name)
            .map(|e| e.path_segment.as_str())
    }

    /// Path segment to logical name.
    pub fn resolve_to_logical(&self, path_segment: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.path_segment == path_segment)
            .map(|e| e.logical_name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockRemote;
    use crate::port::{CatalogPayload, TransportError};

    fn catalog() -> MetadataCatalog {
        MetadataCatalog::from_entries(
            ServerInfo::default(),
            vec![
                ResourceTypeEntry::policy("MeshTrafficPermission", "meshtrafficpermissions"),
                ResourceTypeEntry::policy("MeshTimeout", "meshtimeouts"),
            ],
        )
    }

    #[test]
    fn test_lookups_both_directions() {
        let catalog = catalog();
        assert_eq!(catalog.resolve_to_path("MeshTimeout"), Some("meshtimeouts"));
        assert_eq!(
            catalog.resolve_to_logical("meshtrafficpermissions"),
            Some("MeshTrafficPermission")
        );
        assert_eq!(catalog.resolve_to_path("meshtimeouts"), None);
        assert_eq!(catalog.resolve_to_logical("MeshTimeout"), None);
    }

    #[test]
    fn test_first_match_wins_on_duplicates() {
        let catalog = MetadataCatalog::from_entries(
            ServerInfo::default(),
            vec![
                ResourceTypeEntry::policy("MeshRetry", "meshretries"),
                ResourceTypeEntry::policy("MeshRetry", "meshretries-v2"),
            ],
        );
        assert_eq!(catalog.resolve_to_path("MeshRetry"), Some("meshretries"));
    }

    #[tokio::test]
    async fn test_load_decodes_index_and_policies() {
        let mock = MockRemote::new();
        mock.expect_heartbeat().return_ok(CatalogPayload {
            index: br#"{"hostname":"cp-0","tagline":"Kuma","product":"Kuma","version":"2.9.0"}"#
                .to_vec(),
            policies: br#"{"policies":[
                {"name":"MeshTrafficPermission","path":"meshtrafficpermissions","readOnly":false,"pluralDisplayName":"Mesh Traffic Permissions"},
                {"name":"MeshGatewayInstance","path":"meshgatewayinstances","readOnly":true}
            ]}"#
            .to_vec(),
        });

        let catalog = MetadataCatalog::load(&mock).await.unwrap();
        assert_eq!(catalog.server().product, "Kuma");
        assert_eq!(catalog.server().version, "2.9.0");
        assert_eq!(catalog.entries().len(), 2);
        assert!(catalog.entries().iter().all(|e| e.is_policy));
        assert!(catalog.entries()[1].read_only);
        mock.verify();
    }

    #[tokio::test]
    async fn test_load_transport_failure_is_unreachable() {
        let mock = MockRemote::new();
        mock.expect_heartbeat()
            .return_err(TransportError::Unreachable("connection refused".into()));

        let result = MetadataCatalog::load(&mock).await;
        assert!(matches!(result, Err(ReconcileError::Unreachable(_))));
    }

    #[tokio::test]
    async fn test_load_decode_failure_is_malformed_catalog() {
        let mock = MockRemote::new();
        mock.expect_heartbeat().return_ok(CatalogPayload {
            index: br#"{"product":"Kuma","version":"2.9.0"}"#.to_vec(),
            policies: b"<html>not json</html>".to_vec(),
        });

        let result = MetadataCatalog::load(&mock).await;
        assert!(matches!(result, Err(ReconcileError::MalformedCatalog(_))));
    }
}
