//! # Observability & Tracing
//!
//! [`setup_tracing`] installs the process-wide subscriber. The engine itself only emits events;
//! installing a subscriber is left to binaries and tests that want output.
//!
//! ## What Gets Traced
//!
//! - **Catalog load**: product, version and number of types (`info`)
//! - **Lifecycle entry points**: one span per `create`/`read`/`update`/`delete`/`import`, the
//!   resolved identity and the declared body (`debug`)
//! - **Mutations**: `Created`, `Updated`, `Deleted` (`info`)
//! - **Non-fatal surprises**: already exists, already deleted, missing after write (`warn`)
//!
//! ## Usage Examples
//!
//! ```bash
//! # Mutations only
//! RUST_LOG=info cargo run
//!
//! # Identities and declared bodies
//! RUST_LOG=debug cargo run
//!
//! # Only the engine
//! RUST_LOG=reconcile_framework=debug cargo run
//! ```
//!
//! **With `RUST_LOG=info`**:
//!
//! ```text
//! INFO successfully checked connection product=Kuma version=2.9.0 types=8
//! INFO create: Created identity=/meshes/default/meshtrafficpermissions/allow-all
//! WARN delete: Resource was already deleted identity=/meshes/default/meshtrafficpermissions/allow-all
//! ```
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false) // identities already say what the event is about
        .compact()
        .init();
}
