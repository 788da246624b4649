use k8s_openapi::api::core::v1::Pod;
use thiserror::Error;

use crate::lookup::ControllerKind;
use crate::owner::{ControllerStatus, DecodeError, Ownership};
use crate::pod_state::{is_mirror_pod, is_system_pod, local_storage_volumes};
use crate::policy::DrainPolicy;

#[derive(Debug, PartialEq)]
pub enum Verdict {
    Evict,
    Skip(SkipReason),
    /// Never empty.
    Violation(Vec<ViolationReason>),
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SkipReason {
    MirrorPod,
    /// The daemon set controller recreates the pod wherever it belongs.
    DaemonSet { name: String },
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum ViolationReason {
    #[error("malformed owner reference: {0}")]
    MalformedOwnerReference(String),
    #[error("pod has no controller; draining would permanently destroy its sole replica")]
    NoController,
    #[error("pod is controlled by {kind} {name} which is not known to recreate it")]
    UnrecognizedController { kind: String, name: String },
    #[error("referenced {kind} {namespace}/{name} not found: {cause}")]
    ControllerNotFound {
        kind: ControllerKind,
        namespace: String,
        name: String,
        cause: String,
    },
    #[error("{kind} {namespace}/{name} has too few replicas (spec: {replicas}, min: {min_replicas})")]
    TooFewReplicas {
        kind: ControllerKind,
        namespace: String,
        name: String,
        replicas: i32,
        min_replicas: i32,
    },
    #[error("pod in system namespace {namespace} is not managed by a daemon set")]
    SystemPod { namespace: String },
    #[error("pod uses node-local storage; eviction would lose data (volumes: {})", .volumes.join(", "))]
    LocalStorage { volumes: Vec<String> },
}

pub fn classify(
    pod: &Pod,
    ownership: &Result<Ownership, DecodeError>,
    policy: &DrainPolicy,
) -> Verdict {
    if is_mirror_pod(pod) {
        return Verdict::Skip(SkipReason::MirrorPod);
    }

    let mut reasons = Vec::new();
    match ownership {
        Err(err) => reasons.push(ViolationReason::MalformedOwnerReference(err.to_string())),
        Ok(Ownership::Absent) => {
            if !policy.permit_unmanaged_pods {
                reasons.push(ViolationReason::NoController);
            }
        }
        Ok(Ownership::Unrecognized { kind, name }) => {
            if !policy.permit_unmanaged_pods {
                reasons.push(ViolationReason::UnrecognizedController {
                    kind: kind.clone(),
                    name: name.clone(),
                });
            }
        }
        Ok(Ownership::Controller {
            kind,
            namespace,
            name,
            status,
        }) => match kind {
            // the daemon set ignores the unschedulable bit, and would race the drain
            ControllerKind::DaemonSet => {
                return Verdict::Skip(SkipReason::DaemonSet { name: name.clone() });
            }
            // run-to-completion, so it doesn't matter whether the job is still around
            ControllerKind::Job => {}
            ControllerKind::ReplicationController | ControllerKind::ReplicaSet => match status {
                ControllerStatus::Live(object) => {
                    if let Some(replicas) = object.replicas {
                        if replicas < policy.min_replicas {
                            reasons.push(ViolationReason::TooFewReplicas {
                                kind: *kind,
                                namespace: namespace.clone(),
                                name: name.clone(),
                                replicas,
                                min_replicas: policy.min_replicas,
                            });
                        }
                    }
                }
                ControllerStatus::Unverified => {}
                ControllerStatus::Missing(err) => {
                    reasons.push(ViolationReason::ControllerNotFound {
                        kind: *kind,
                        namespace: namespace.clone(),
                        name: name.clone(),
                        cause: err.to_string(),
                    });
                }
            },
        },
    }

    if is_system_pod(pod) && !policy.permit_system_pods {
        reasons.push(ViolationReason::SystemPod {
            namespace: pod.metadata.namespace.clone().unwrap_or_default(),
        });
    }

    let volumes = local_storage_volumes(pod);
    if !volumes.is_empty() && !policy.permit_local_storage {
        reasons.push(ViolationReason::LocalStorage {
            volumes: volumes.into_iter().map(String::from).collect(),
        });
    }

    if reasons.is_empty() {
        Verdict::Evict
    } else {
        Verdict::Violation(reasons)
    }
}
