use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::{FutureExt, StreamExt, stream};
use k8s_openapi::api::core::v1::Pod;
use tracing::{Level, debug, info, span, warn};

use crate::aggregate::{DrainDecision, DrainError, aggregate};
use crate::classify::{Verdict, classify};
use crate::instrumented;
use crate::lookup::ControllerLookup;
use crate::owner::{ReferenceDecoder, resolve};
use crate::policy::DrainPolicy;
use crate::utils::get_object_ref;

const DEFAULT_MAX_CONCURRENT_LOOKUPS: usize = 16;
const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

/// Decides which pods of a node may be evicted for the node to be drained.
///
/// The engine keeps no state between calls. Every call looks the controllers up again.
#[derive(Clone)]
pub struct DrainEngine {
    decoder: Arc<dyn ReferenceDecoder>,
    lookup: Arc<dyn ControllerLookup>,
    max_concurrent_lookups: usize,
    lookup_timeout: Option<Duration>,
}

impl DrainEngine {
    pub fn new(decoder: Arc<dyn ReferenceDecoder>, lookup: Arc<dyn ControllerLookup>) -> Self {
        Self {
            decoder,
            lookup,
            max_concurrent_lookups: DEFAULT_MAX_CONCURRENT_LOOKUPS,
            lookup_timeout: Some(DEFAULT_LOOKUP_TIMEOUT),
        }
    }

    pub fn with_max_concurrent_lookups(mut self, max_concurrent_lookups: usize) -> Self {
        self.max_concurrent_lookups = max_concurrent_lookups.max(1);
        self
    }

    pub fn with_lookup_timeout(mut self, lookup_timeout: Option<Duration>) -> Self {
        self.lookup_timeout = lookup_timeout;
        self
    }

    /// Every pod is evaluated even after a violation is found, so that the error
    /// names all the pods that block the drain.
    ///
    /// Lookups still in flight when `cancelled` completes fail as [`LookupError::Cancelled`].
    ///
    /// [`LookupError::Cancelled`]: crate::lookup::LookupError::Cancelled
    pub async fn pods_for_deletion<'a>(
        &self,
        pods: &'a [Pod],
        policy: &DrainPolicy,
        cancelled: impl Future<Output = ()>,
    ) -> Result<DrainDecision<'a>, DrainError> {
        let cancelled = cancelled.shared();

        let verdicts: Vec<(&'a Pod, Verdict)> = stream::iter(pods)
            .map(|pod| {
                let cancelled = cancelled.clone();
                let object_ref = get_object_ref(pod);
                instrumented!(span!(Level::DEBUG, "pod", %object_ref), async move {
                    let verdict = self.evaluate(pod, policy, cancelled).await;
                    (pod, verdict)
                })
            })
            .buffered(self.max_concurrent_lookups)
            .collect()
            .await;

        let result = aggregate(verdicts);
        match &result {
            Ok(decision) => info!(
                evict = decision.pods_to_evict.len(),
                skip = decision.skipped.len(),
                "node can be drained"
            ),
            Err(err) => warn!(violations = err.violations().len(), "node cannot be drained"),
        }

        result
    }

    async fn evaluate(
        &self,
        pod: &Pod,
        policy: &DrainPolicy,
        cancelled: impl Future<Output = ()>,
    ) -> Verdict {
        let ownership = resolve(
            pod,
            self.decoder.as_ref(),
            self.lookup.as_ref(),
            policy,
            self.lookup_timeout,
            cancelled,
        )
        .await;

        let verdict = classify(pod, &ownership, policy);
        debug!(?verdict, "classified");
        verdict
    }
}
