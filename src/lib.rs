//! # Mesh Reconcile
//!
//! Keeps mesh policy objects on a Kuma-style control plane in line with declared JSON
//! documents. The engine itself lives in [`reconcile_framework`]; this crate wires it to an
//! in-memory control plane and drives it from the demo binary.
//!
//! ## Module Tour
//!
//! - **[`control_plane`]**: An actor that serves the control plane API from memory, and the
//!   [`ControlPlaneClient`](control_plane::ControlPlaneClient) that implements the engine's
//!   [`RemoteAccess`](reconcile_framework::RemoteAccess) port against it.
//! - **[`config`]**: Product, version and the served resource types.
//! - **[`lifecycle`]**: [`ReconcileSystem`](lifecycle::ReconcileSystem) starts the control plane,
//!   connects a [`Reconciler`](reconcile_framework::Reconciler) and shuts both down.
//!
//! ## Running the Demo
//!
//! ```bash
//! RUST_LOG=info cargo run
//! ```

pub mod config;
pub mod control_plane;
pub mod error;
pub mod lifecycle;
