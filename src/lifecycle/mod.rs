//! Startup and shutdown of the in-memory control plane together with its reconciler.

pub mod system;

pub use system::ReconcileSystem;
