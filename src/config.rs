//! Configuration of the in-memory control plane.
//!
//! Every field has a default, so an empty JSON object is a valid configuration:
//!
//! ```json
//! {
//!   "product": "Kuma",
//!   "version": "2.9.0",
//!   "bufferSize": 32,
//!   "resourceTypes": [
//!     { "logicalName": "MeshTrafficPermission", "pathSegment": "meshtrafficpermissions", "isPolicy": true }
//!   ]
//! }
//! ```

use crate::error::SystemError;
use reconcile_framework::ResourceTypeEntry;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ControlPlaneConfig {
    pub product: String,
    pub version: String,
    /// Capacity of the request channel.
    pub buffer_size: usize,
    /// Served by `GET /policies`.
    pub resource_types: Vec<ResourceTypeEntry>,
}

impl Default for ControlPlaneConfig {
    fn default() -> Self {
        Self {
            product: "Kuma".to_string(),
            version: "2.9.0".to_string(),
            buffer_size: 32,
            resource_types: default_resource_types(),
        }
    }
}

/// The mesh-scoped policy types served when none are configured.
pub fn default_resource_types() -> Vec<ResourceTypeEntry> {
    [
        ("MeshAccessLog", "meshaccesslogs"),
        ("MeshCircuitBreaker", "meshcircuitbreakers"),
        ("MeshFaultInjection", "meshfaultinjections"),
        ("MeshHealthCheck", "meshhealthchecks"),
        ("MeshRateLimit", "meshratelimits"),
        ("MeshRetry", "meshretries"),
        ("MeshTimeout", "meshtimeouts"),
        ("MeshTrafficPermission", "meshtrafficpermissions"),
    ]
    .into_iter()
    .map(|(logical, path)| ResourceTypeEntry::policy(logical, path))
    .collect()
}

impl ControlPlaneConfig {
    /// Decodes and validates a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, SystemError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects a zero buffer and duplicate logical names or path segments.
    pub fn validate(&self) -> Result<(), SystemError> {
        if self.buffer_size == 0 {
            return Err(SystemError::InvalidConfig(
                "bufferSize must be at least 1".into(),
            ));
        }
        let mut names = HashSet::new();
        let mut paths = HashSet::new();
        for entry in &self.resource_types {
            if !names.insert(entry.logical_name.as_str()) {
                return Err(SystemError::InvalidConfig(format!(
                    "duplicate resource type '{}'",
                    entry.logical_name
                )));
            }
            if !paths.insert(entry.path_segment.as_str()) {
                return Err(SystemError::InvalidConfig(format!(
                    "duplicate path segment '{}'",
                    entry.path_segment
                )));
            }
        }
        Ok(())
    }
}
