//! # Mock Remote & Testing Guide
//!
//! [`MockRemote`] implements [`RemoteAccess`] entirely in memory from a queue of expectations.
//! It lets tests drive every branch of the [`Reconciler`](crate::Reconciler) (absence,
//! conflicts, transport failures, an object vanishing right after a write) without a live
//! control plane.
//!
//! ## When to use the Mock vs an In-Memory Control Plane
//!
//! | Feature | MockRemote | In-memory control plane |
//! |---------|------------|-------------------------|
//! | **Determinism** | Exact call sequence asserted | Real store semantics |
//! | **Error Injection** | Easy (`return_err`) | Only what the server would do |
//! | **Use Case** | One branch of one operation | Full lifecycle flows |
//!
//! ## Example
//!
//! ```rust
//! use reconcile_framework::mock::MockRemote;
//! use reconcile_framework::{
//!     DeclaredDocument, MetadataCatalog, ReconcileError, Reconciler, ResourceTypeEntry, ServerInfo,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let catalog = MetadataCatalog::from_entries(
//!         ServerInfo::default(),
//!         vec![ResourceTypeEntry::policy("MeshTimeout", "meshtimeouts")],
//!     );
//!     let mock = MockRemote::new();
//!     let reconciler = Reconciler::new(mock.clone(), Arc::new(catalog));
//!
//!     // The object is already there.
//!     mock.expect_fetch("default", "meshtimeouts", "t")
//!         .return_ok(Some(br#"{"name":"t"}"#.to_vec()));
//!
//!     let declared = DeclaredDocument::new(r#"{"type":"MeshTimeout","mesh":"default","name":"t"}"#);
//!     let result = reconciler.create(&declared).await;
//!     assert!(matches!(result, Err(ReconcileError::AlreadyExists(_))));
//!
//!     // No put was attempted.
//!     mock.verify();
//! }
//! ```
//!
//! Expectations are consumed in order. A call that does not match the next expectation (wrong
//! operation or wrong coordinates) panics, as does `verify()` with expectations left over.

use crate::port::{CatalogPayload, RemoteAccess, TransportError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex};

/// Coordinates a port call was made with.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Key {
    mesh: String,
    path_segment: String,
    name: String,
}

impl Key {
    fn new(mesh: &str, path_segment: &str, name: &str) -> Self {
        Self {
            mesh: mesh.to_owned(),
            path_segment: path_segment.to_owned(),
            name: name.to_owned(),
        }
    }
}

/// Represents an expected call to the mock remote.
enum Expectation {
    Heartbeat {
        response: Result<CatalogPayload, TransportError>,
    },
    Fetch {
        key: Key,
        response: Result<Option<Vec<u8>>, TransportError>,
    },
    Put {
        key: Key,
        response: Result<(), TransportError>,
    },
    Delete {
        key: Key,
        response: Result<(), TransportError>,
    },
}

impl fmt::Debug for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expectation::Heartbeat { .. } => write!(f, "heartbeat"),
            Expectation::Fetch { key, .. } => write!(f, "fetch {:?}", key),
            Expectation::Put { key, .. } => write!(f, "put {:?}", key),
            Expectation::Delete { key, .. } => write!(f, "delete {:?}", key),
        }
    }
}

type Expectations = Arc<Mutex<VecDeque<Expectation>>>;

/// A scripted [`RemoteAccess`] implementation for tests.
///
/// Cloning shares the expectation queue, so a test can hand one clone to the
/// [`Reconciler`](crate::Reconciler) and keep another to add expectations and `verify()`.
#[derive(Clone, Default)]
pub struct MockRemote {
    expectations: Expectations,
    put_bodies: Arc<Mutex<Vec<String>>>,
}

impl MockRemote {
    /// Creates a new mock with no expectations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Expects a `heartbeat` call.
    pub fn expect_heartbeat(&self) -> ExpectationBuilder<CatalogPayload> {
        ExpectationBuilder::new(&self.expectations, |response| Expectation::Heartbeat {
            response,
        })
    }

    /// Expects a `fetch` call for the given coordinates.
    pub fn expect_fetch(
        &self,
        mesh: &str,
        path_segment: &str,
        name: &str,
    ) -> ExpectationBuilder<Option<Vec<u8>>> {
        let key = Key::new(mesh, path_segment, name);
        ExpectationBuilder::new(&self.expectations, move |response| Expectation::Fetch {
            key,
            response,
        })
    }

    /// Expects a `put` call for the given coordinates.
    pub fn expect_put(&self, mesh: &str, path_segment: &str, name: &str) -> ExpectationBuilder<()> {
        let key = Key::new(mesh, path_segment, name);
        ExpectationBuilder::new(&self.expectations, move |response| Expectation::Put {
            key,
            response,
        })
    }

    /// Expects a `delete` call for the given coordinates.
    pub fn expect_delete(
        &self,
        mesh: &str,
        path_segment: &str,
        name: &str,
    ) -> ExpectationBuilder<()> {
        let key = Key::new(mesh, path_segment, name);
        ExpectationBuilder::new(&self.expectations, move |response| Expectation::Delete {
            key,
            response,
        })
    }

    /// Bodies received by `put`, in call order.
    pub fn put_bodies(&self) -> Vec<String> {
        self.put_bodies.lock().unwrap().clone()
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let exps = self.expectations.lock().unwrap();
        if !exps.is_empty() {
            panic!(
                "Not all expectations were met. {} remaining: {:?}",
                exps.len(),
                exps
            );
        }
    }

    fn next(&self, call: &str) -> Expectation {
        let mut exps = self.expectations.lock().unwrap();
        match exps.pop_front() {
            Some(expectation) => expectation,
            None => panic!("Unexpected {} call: no expectations left", call),
        }
    }
}

fn check_key(expected: &Key, actual: Key) {
    assert_eq!(expected, &actual, "mock called with unexpected coordinates");
}

#[async_trait]
impl RemoteAccess for MockRemote {
    async fn heartbeat(&self) -> Result<CatalogPayload, TransportError> {
        match self.next("heartbeat") {
            Expectation::Heartbeat { response } => response,
            other => panic!("Unexpected heartbeat call, expected {:?}", other),
        }
    }

    async fn fetch(
        &self,
        mesh: &str,
        path_segment: &str,
        name: &str,
    ) -> Result<Option<Vec<u8>>, TransportError> {
        match self.next("fetch") {
            Expectation::Fetch { key, response } => {
                check_key(&key, Key::new(mesh, path_segment, name));
                response
            }
            other => panic!("Unexpected fetch call, expected {:?}", other),
        }
    }

    async fn put(
        &self,
        mesh: &str,
        path_segment: &str,
        name: &str,
        body: &str,
    ) -> Result<(), TransportError> {
        match self.next("put") {
            Expectation::Put { key, response } => {
                check_key(&key, Key::new(mesh, path_segment, name));
                self.put_bodies.lock().unwrap().push(body.to_owned());
                response
            }
            other => panic!("Unexpected put call, expected {:?}", other),
        }
    }

    async fn delete(
        &self,
        mesh: &str,
        path_segment: &str,
        name: &str,
    ) -> Result<(), TransportError> {
        match self.next("delete") {
            Expectation::Delete { key, response } => {
                check_key(&key, Key::new(mesh, path_segment, name));
                response
            }
            other => panic!("Unexpected delete call, expected {:?}", other),
        }
    }
}

/// Builder that queues one expectation with its scripted response.
pub struct ExpectationBuilder<T> {
    expectations: Expectations,
    wrap: Box<dyn FnOnce(Result<T, TransportError>) -> Expectation + Send>,
}

impl<T> ExpectationBuilder<T> {
    fn new(
        expectations: &Expectations,
        wrap: impl FnOnce(Result<T, TransportError>) -> Expectation + Send + 'static,
    ) -> Self {
        Self {
            expectations: expectations.clone(),
            wrap: Box::new(wrap),
        }
    }

    /// Sets the expectation to return a successful result.
    pub fn return_ok(self, value: T) {
        let expectation = (self.wrap)(Ok(value));
        self.expectations.lock().unwrap().push_back(expectation);
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: TransportError) {
        let expectation = (self.wrap)(Err(error));
        self.expectations.lock().unwrap().push_back(expectation);
    }
}
