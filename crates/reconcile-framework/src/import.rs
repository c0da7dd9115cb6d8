//! Parsing of externally supplied import identifiers.
//!
//! Accepted forms, matching the API path of the object:
//!
//! - `mesh/typeOrPath/name`
//! - `typeOrPath/name` (mesh is the empty string)
//!
//! Leading and trailing slashes are ignored. The middle segment may be either the path segment
//! (`meshtrafficpermissions`) or the logical name (`MeshTrafficPermission`).

use crate::catalog::MetadataCatalog;
use crate::error::ReconcileError;
use crate::identity::Identity;

/// Turns an import identifier into an [`Identity`].
///
/// A middle segment unknown to the catalog is kept verbatim as both logical type and path
/// segment; the read that follows an import reports it as unsupported.
pub fn parse_import_id(id: &str, catalog: &MetadataCatalog) -> Result<Identity, ReconcileError> {
    let mut parts: Vec<&str> = id.trim_matches('/').split('/').collect();
    if parts.len() == 2 {
        parts.insert(0, "");
    }
    let [mesh, type_or_path, name] = parts[..] else {
        return Err(ReconcileError::InvalidImportId(id.to_owned()));
    };

    let (logical_type, path_segment) = match catalog.resolve_to_logical(type_or_path) {
        Some(logical) => (logical, type_or_path),
        None => (
            type_or_path,
            catalog.resolve_to_path(type_or_path).unwrap_or(type_or_path),
        ),
    };

    Ok(Identity {
        mesh: mesh.to_owned(),
        path_segment: path_segment.to_owned(),
        logical_type: logical_type.to_owned(),
        name: name.to_owned(),
    })
}
