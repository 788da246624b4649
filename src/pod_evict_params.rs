use k8s_openapi::api::core::v1::Pod;
use kube::api::{DeleteParams, EvictParams, Preconditions};
use kube::ResourceExt;

use crate::policy::DrainPolicy;

/// Parameters for whoever performs the eviction of a pod chosen by the drain.
pub fn evict_params_for(pod: &Pod, policy: &DrainPolicy) -> EvictParams {
    EvictParams {
        delete_options: Some(DeleteParams {
            dry_run: false,
            grace_period_seconds: policy.grace_period_seconds,
            preconditions: Some(Preconditions {
                uid: pod.uid(),
                // the pod may have been updated since the decision, that's fine
                resource_version: None,
            }),
            propagation_policy: None,
        }),
        ..EvictParams::default()
    }
}
