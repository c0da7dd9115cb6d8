use mesh_reconcile::config::ControlPlaneConfig;
use mesh_reconcile::lifecycle::ReconcileSystem;
use reconcile_framework::tracing::setup_tracing;
use reconcile_framework::{DeclaredDocument, ReadOutcome};
use tracing::{info, Instrument};

const PERMISSION: &str = r#"{
  "type": "MeshTrafficPermission",
  "name": "allow-all",
  "mesh": "default",
  "spec": {
    "targetRef": { "kind": "Mesh" },
    "from": [{ "targetRef": { "kind": "Mesh" }, "default": { "action": "Allow" } }]
  }
}"#;

const PERMISSION_DENY: &str = r#"{
  "type": "MeshTrafficPermission",
  "name": "allow-all",
  "mesh": "default",
  "spec": {
    "targetRef": { "kind": "Mesh" },
    "from": [{ "targetRef": { "kind": "Mesh" }, "default": { "action": "Deny" } }]
  }
}"#;

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    info!("Starting in-memory control plane");
    let system = ReconcileSystem::start(ControlPlaneConfig::default())
        .await
        .map_err(|e| e.to_string())?;
    let reconciler = &system.reconciler;

    let span = tracing::info_span!("create");
    let state = async {
        reconciler
            .create(&DeclaredDocument::new(PERMISSION))
            .await
            .map_err(|e| e.to_string())
    }
    .instrument(span)
    .await?
    .into_declared();
    info!(body = %state.body, "Stored state after create");

    match reconciler.read(&state).await.map_err(|e| e.to_string())? {
        ReadOutcome::Present(observed) => info!(body = %observed.body, "Refreshed"),
        ReadOutcome::Gone => info!("Object vanished"),
    }

    // Identity stays committed; only the body changes.
    let changed = DeclaredDocument {
        body: PERMISSION_DENY.to_string(),
        ..state.clone()
    };
    let state = reconciler
        .update(&changed)
        .await
        .map_err(|e| e.to_string())?
        .into_declared();
    info!(body = %state.body, "Stored state after update");

    let imported = reconciler
        .import("default/meshtrafficpermissions/allow-all")
        .await
        .map_err(|e| e.to_string())?;
    info!(present = matches!(imported, ReadOutcome::Present(_)), "Imported");

    let outcome = reconciler.delete(&state).await.map_err(|e| e.to_string())?;
    info!(?outcome, "Delete");
    // A second delete finds nothing and only warns.
    let outcome = reconciler.delete(&state).await.map_err(|e| e.to_string())?;
    info!(?outcome, "Delete again");

    system.shutdown().await.map_err(|e| e.to_string())?;
    Ok(())
}
