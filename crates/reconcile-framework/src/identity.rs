//! # Identity Resolution
//!
//! An [`Identity`] is the `(mesh, type, name)` coordinate of one managed object, plus the path
//! segment the catalog maps the type to. It is never stored on its own: every operation
//! recomputes it from the caller's [`DeclaredDocument`].
//!
//! Users either declare the identity fields explicitly or write one self-describing document
//! whose top-level `mesh`, `type` and `name` keys carry them. [`IdentityResolver::resolve`]
//! prefers explicit fields and only falls back to inspecting the body.
//! [`IdentityResolver::resolve_committed`] is for objects that already have an identity and
//! never looks at the body, so the identity stays stable for the object's whole lifetime.

use crate::catalog::MetadataCatalog;
use crate::error::ReconcileError;
use crate::port::resource_path;
use serde_json::{Map, Value};
use std::fmt;

/// Addressable coordinates of one object on the control plane.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity {
    pub mesh: String,
    pub path_segment: String,
    pub logical_type: String,
    pub name: String,
}

impl Identity {
    /// `/meshes/{mesh}/{path_segment}/{name}`
    pub fn api_path(&self) -> String {
        resource_path(&self.mesh, &self.path_segment, &self.name)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.api_path())
    }
}

/// Desired state handed over by the declarative front end.
///
/// `None` means the field is unknown (not yet computed), not empty. An empty mesh is a known
/// value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeclaredDocument {
    pub mesh: Option<String>,
    pub resource_type: Option<String>,
    pub name: Option<String>,
    /// The object body as JSON text.
    pub body: String,
}

impl DeclaredDocument {
    /// A document with every identity field unknown.
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            ..Default::default()
        }
    }

    /// A document whose identity is already committed.
    pub fn from_identity(identity: &Identity, body: impl Into<String>) -> Self {
        Self {
            mesh: Some(identity.mesh.clone()),
            resource_type: Some(identity.logical_type.clone()),
            name: Some(identity.name.clone()),
            body: body.into(),
        }
    }

    pub fn with_mesh(mut self, mesh: impl Into<String>) -> Self {
        self.mesh = Some(mesh.into());
        self
    }

    pub fn with_type(mut self, resource_type: impl Into<String>) -> Self {
        self.resource_type = Some(resource_type.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    fn is_fully_known(&self) -> bool {
        self.mesh.is_some() && self.resource_type.is_some() && self.name.is_some()
    }
}

/// Identity fields found at the top level of a document body.
#[derive(Debug, Default)]
struct InspectedFields {
    mesh: Option<String>,
    resource_type: Option<String>,
    name: Option<String>,
}

/// Reads the top-level `mesh`, `type` and `name` string values of `body`.
/// Non-string values are ignored.
fn inspect(body: &str) -> Result<InspectedFields, ReconcileError> {
    let map: Map<String, Value> = serde_json::from_str(body)
        .map_err(|e| ReconcileError::MalformedDocument(format!("json parse failed: {}", e)))?;
    let field = |key: &str| map.get(key).and_then(Value::as_str).map(str::to_owned);
    Ok(InspectedFields {
        mesh: field("mesh"),
        resource_type: field("type"),
        name: field("name"),
    })
}

/// Derives and validates identities against a loaded catalog.
#[derive(Debug, Clone, Copy)]
pub struct IdentityResolver<'a> {
    catalog: &'a MetadataCatalog,
}

impl<'a> IdentityResolver<'a> {
    pub fn new(catalog: &'a MetadataCatalog) -> Self {
        Self { catalog }
    }

    /// First-time derivation.
    ///
    /// 1. A known type must resolve through the catalog.
    /// 2. If any field is unknown, the body is inspected and fills the unknown fields only.
    /// 3. A type discovered in step 2 is resolved through the catalog.
    pub fn resolve(&self, declared: &DeclaredDocument) -> Result<Identity, ReconcileError> {
        if let Some(resource_type) = &declared.resource_type {
            self.path_for(resource_type)?;
        }
        if declared.is_fully_known() {
            return self.resolve_committed(declared);
        }

        let inspected = inspect(&declared.body)?;
        let filled = DeclaredDocument {
            mesh: declared.mesh.clone().or(inspected.mesh),
            resource_type: declared.resource_type.clone().or(inspected.resource_type),
            name: declared.name.clone().or(inspected.name),
            body: String::new(),
        };
        self.resolve_committed(&filled)
    }

    /// Resolution for an object that already has an identity. The body is never inspected.
    pub fn resolve_committed(
        &self,
        declared: &DeclaredDocument,
    ) -> Result<Identity, ReconcileError> {
        let logical_type = declared
            .resource_type
            .clone()
            .ok_or(ReconcileError::IncompleteIdentity("type"))?;
        let path_segment = self.path_for(&logical_type)?.to_owned();
        let mesh = declared
            .mesh
            .clone()
            .ok_or(ReconcileError::IncompleteIdentity("mesh"))?;
        let name = declared
            .name
            .clone()
            .ok_or(ReconcileError::IncompleteIdentity("name"))?;
        Ok(Identity {
            mesh,
            path_segment,
            logical_type,
            name,
        })
    }

    fn path_for(&self, logical_type: &str) -> Result<&'a str, ReconcileError> {
        self.catalog
            .resolve_to_path(logical_type)
            .ok_or_else(|| ReconcileError::UnsupportedType(logical_type.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ResourceTypeEntry, ServerInfo};

    const MTP_BODY: &str = r#"{"type":"MeshTrafficPermission","name":"test-1","mesh":"default","spec":{"targetRef":{"kind":"Mesh"}}}"#;

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
    fn test_explicit_fields_win_regardless_of_body() {
        let catalog = catalog();
        let declared = DeclaredDocument::new("this is not json")
            .with_mesh("prod")
            .with_type("MeshTimeout")
            .with_name("slow");

        let identity = IdentityResolver::new(&catalog).resolve(&declared).unwrap();
        assert_eq!(
            identity,
            Identity {
                mesh: "prod".into(),
                path_segment: "meshtimeouts".into(),
                logical_type: "MeshTimeout".into(),
                name: "slow".into(),
            }
        );
    }

    #[test]
    fn test_derives_unknown_fields_from_body() {
        let catalog = catalog();
        let identity = IdentityResolver::new(&catalog)
            .resolve(&DeclaredDocument::new(MTP_BODY))
            .unwrap();

        assert_eq!(identity.mesh, "default");
        assert_eq!(identity.name, "test-1");
        assert_eq!(identity.logical_type, "MeshTrafficPermission");
        assert_eq!(identity.path_segment, "meshtrafficpermissions");
    }

    #[test]
    fn test_known_fields_are_not_overwritten_by_body() {
        let catalog = catalog();
        let declared = DeclaredDocument::new(MTP_BODY).with_name("explicit");

        let identity = IdentityResolver::new(&catalog).resolve(&declared).unwrap();
        assert_eq!(identity.name, "explicit");
        assert_eq!(identity.mesh, "default");
    }

    #[test]
    fn test_unsupported_explicit_type_fails_before_parsing() {
        let catalog = catalog();
        let declared = DeclaredDocument::new("not json").with_type("MeshUnknown");

        let result = IdentityResolver::new(&catalog).resolve(&declared);
        assert!(matches!(result, Err(ReconcileError::UnsupportedType(t)) if t == "MeshUnknown"));
    }

    #[test]
    fn test_unsupported_discovered_type() {
        let catalog = catalog();
        let declared =
            DeclaredDocument::new(r#"{"type":"MeshUnknown","name":"a","mesh":"default"}"#);

        let result = IdentityResolver::new(&catalog).resolve(&declared);
        assert!(matches!(result, Err(ReconcileError::UnsupportedType(_))));
    }

    #[test]
    fn test_malformed_body_when_inspection_needed() {
        let catalog = catalog();
        for body in ["not json", "[1, 2]", "\"text\""] {
            let result = IdentityResolver::new(&catalog).resolve(&DeclaredDocument::new(body));
            assert!(
                matches!(result, Err(ReconcileError::MalformedDocument(_))),
                "body {body:?} should be malformed"
            );
        }
    }

    #[test]
    fn test_non_string_values_are_ignored() {
        let catalog = catalog();
        let declared =
            DeclaredDocument::new(r#"{"type":"MeshTimeout","name":42,"mesh":"default"}"#);

        let result = IdentityResolver::new(&catalog).resolve(&declared);
        assert!(matches!(result, Err(ReconcileError::IncompleteIdentity("name"))));
    }

    #[test]
    fn test_committed_resolution_never_inspects_body() {
        let catalog = catalog();
        let declared = DeclaredDocument::new(MTP_BODY)
            .with_type("MeshTrafficPermission")
            .with_name("test-1");

        let result = IdentityResolver::new(&catalog).resolve_committed(&declared);
        assert!(matches!(result, Err(ReconcileError::IncompleteIdentity("mesh"))));
    }

    #[test]
    fn test_empty_mesh_is_a_known_value() {
        let catalog = catalog();
        let declared = DeclaredDocument::new(r#"{"mesh":"other"}"#)
            .with_mesh("")
            .with_type("MeshTimeout")
            .with_name("t");

        let identity = IdentityResolver::new(&catalog).resolve(&declared).unwrap();
        assert_eq!(identity.mesh, "");
        assert_eq!(identity.to_string(), "/meshes//meshtimeouts/t");
    }
}
