//! An in-memory control plane and a [`RemoteAccess`](reconcile_framework::RemoteAccess) client
//! for it.
//!
//! Used by the demo binary and the end-to-end tests in place of a live server.

pub mod actor;
pub mod client;
pub mod message;

pub use actor::ControlPlaneActor;
pub use client::ControlPlaneClient;
pub use message::{ControlPlaneRequest, HttpReply, ObjectPath};
