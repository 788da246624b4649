use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use drain_eligibility::{ControllerKind, ControllerLookup, ControllerObject, LookupError};

/// In-memory control plane.
#[derive(Default)]
pub struct FakeControllerLookup {
    objects: HashMap<(ControllerKind, String, String), ControllerObject>,
    calls: AtomicUsize,
    requests: Mutex<Vec<(ControllerKind, String, String)>>,
}

impl FakeControllerLookup {
    pub fn with(mut self, kind: ControllerKind, namespace: &str, name: &str) -> Self {
        self.insert(kind, namespace, name, None);
        self
    }

    pub fn with_replicas(
        mut self,
        kind: ControllerKind,
        namespace: &str,
        name: &str,
        replicas: i32,
    ) -> Self {
        self.insert(kind, namespace, name, Some(replicas));
        self
    }

    fn insert(&mut self, kind: ControllerKind, namespace: &str, name: &str, replicas: Option<i32>) {
        self.objects.insert(
            (kind, namespace.to_owned(), name.to_owned()),
            ControllerObject {
                kind,
                namespace: namespace.to_owned(),
                name: name.to_owned(),
                replicas,
            },
        );
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<(ControllerKind, String, String)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ControllerLookup for FakeControllerLookup {
    async fn get_controller(
        &self,
        kind: ControllerKind,
        namespace: &str,
        name: &str,
    ) -> Result<ControllerObject, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let key = (kind, namespace.to_owned(), name.to_owned());
        self.requests.lock().unwrap().push(key.clone());

        // yield, so that lookups of different pods interleave
        tokio::task::yield_now().await;

        self.objects.get(&key).cloned().ok_or(LookupError::NotFound)
    }
}

/// Control plane that never answers.
pub struct HangingControllerLookup;

#[async_trait]
impl ControllerLookup for HangingControllerLookup {
    async fn get_controller(
        &self,
        _kind: ControllerKind,
        _namespace: &str,
        _name: &str,
    ) -> Result<ControllerObject, LookupError> {
        std::future::pending().await
    }
}
