use std::future::Future;
use std::str::FromStr;
use std::time::Duration;

use k8s_openapi::api::core::v1::{ObjectReference, Pod};
use k8s_openapi::serde::Deserialize;
use kube::ResourceExt;
use thiserror::Error;
use tokio::select;
use tracing::{debug, warn};

use crate::consts::CREATED_BY_ANNOTATION_KEY;
use crate::error_codes::is_transient_error;
use crate::lookup::{ControllerKind, ControllerLookup, ControllerObject, LookupError};
use crate::policy::DrainPolicy;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid serialized reference: {0}")]
    Json(#[from] serde_json::Error),
    #[error("reference has no {0}")]
    MissingField(&'static str),
}

/// Parses the serialized owner reference found in pod metadata.
pub trait ReferenceDecoder: Send + Sync {
    fn decode(&self, raw: &str) -> Result<ObjectReference, DecodeError>;
}

/// Decodes the `{"kind":"SerializedReference","reference":{..}}` document of the
/// `kubernetes.io/created-by` annotation.
#[derive(Clone, Debug, Default)]
pub struct SerializedReferenceDecoder;

#[derive(Deserialize)]
struct SerializedReference {
    reference: ObjectReference,
}

impl ReferenceDecoder for SerializedReferenceDecoder {
    fn decode(&self, raw: &str) -> Result<ObjectReference, DecodeError> {
        let serialized: SerializedReference = serde_json::from_str(raw)?;
        Ok(serialized.reference)
    }
}

#[derive(Debug)]
pub enum ControllerStatus {
    Live(ControllerObject),
    /// Owner reference verification is turned off by the policy.
    Unverified,
    Missing(LookupError),
}

#[derive(Debug)]
pub enum Ownership {
    /// Naked pod.
    Absent,
    Unrecognized {
        kind: String,
        name: String,
    },
    Controller {
        kind: ControllerKind,
        namespace: String,
        name: String,
        status: ControllerStatus,
    },
}

/// Reference read from the pod, before it is checked against the control plane.
#[derive(Debug, Eq, PartialEq)]
pub enum OwnerReference {
    Absent,
    Unrecognized {
        kind: String,
        name: String,
    },
    Controller {
        kind: ControllerKind,
        namespace: String,
        name: String,
    },
}

pub fn read_owner_reference(
    pod: &Pod,
    decoder: &dyn ReferenceDecoder,
) -> Result<OwnerReference, DecodeError> {
    let pod_namespace = pod.namespace().unwrap_or_default();

    if let Some(raw) = pod.annotations().get(CREATED_BY_ANNOTATION_KEY) {
        let reference = decoder.decode(raw)?;
        let kind = reference.kind.ok_or(DecodeError::MissingField("kind"))?;
        let name = reference.name.ok_or(DecodeError::MissingField("name"))?;
        let namespace = reference.namespace.unwrap_or(pod_namespace);
        return Ok(to_owner_reference(kind, namespace, name));
    }

    let controller_ref = pod
        .owner_references()
        .iter()
        .find(|owner| owner.controller == Some(true));
    match controller_ref {
        Some(owner) => Ok(to_owner_reference(
            owner.kind.clone(),
            pod_namespace,
            owner.name.clone(),
        )),
        None => Ok(OwnerReference::Absent),
    }
}

fn to_owner_reference(kind: String, namespace: String, name: String) -> OwnerReference {
    match ControllerKind::from_str(&kind) {
        Ok(kind) => OwnerReference::Controller {
            kind,
            namespace,
            name,
        },
        Err(_) => OwnerReference::Unrecognized { kind, name },
    }
}

/// Reads the owner reference of the pod, and checks that the controller it points to exists.
///
/// Lookup failures are part of the returned [`Ownership`]; only a malformed reference is an error.
pub async fn resolve(
    pod: &Pod,
    decoder: &dyn ReferenceDecoder,
    lookup: &dyn ControllerLookup,
    policy: &DrainPolicy,
    lookup_timeout: Option<Duration>,
    cancelled: impl Future<Output = ()>,
) -> Result<Ownership, DecodeError> {
    let (kind, namespace, name) = match read_owner_reference(pod, decoder)? {
        OwnerReference::Absent => return Ok(Ownership::Absent),
        OwnerReference::Unrecognized { kind, name } => {
            return Ok(Ownership::Unrecognized { kind, name })
        }
        OwnerReference::Controller {
            kind,
            namespace,
            name,
        } => (kind, namespace, name),
    };

    let status = if policy.verify_owner_references {
        let result =
            get_controller(lookup, kind, &namespace, &name, lookup_timeout, cancelled).await;
        match result {
            Ok(object) => {
                debug!(%kind, %namespace, %name, "controller is live");
                ControllerStatus::Live(object)
            }
            Err(err) => {
                log_lookup_error(kind, &namespace, &name, &err);
                ControllerStatus::Missing(err)
            }
        }
    } else {
        ControllerStatus::Unverified
    };

    Ok(Ownership::Controller {
        kind,
        namespace,
        name,
        status,
    })
}

async fn get_controller(
    lookup: &dyn ControllerLookup,
    kind: ControllerKind,
    namespace: &str,
    name: &str,
    lookup_timeout: Option<Duration>,
    cancelled: impl Future<Output = ()>,
) -> Result<ControllerObject, LookupError> {
    let get = async {
        match lookup_timeout {
            Some(timeout) => {
                tokio::time::timeout(timeout, lookup.get_controller(kind, namespace, name))
                    .await
                    .unwrap_or_else(|_| Err(LookupError::Timeout(timeout)))
            }
            None => lookup.get_controller(kind, namespace, name).await,
        }
    };

    select! {
        biased;
        result = get => result,
        _ = cancelled => Err(LookupError::Cancelled),
    }
}

fn log_lookup_error(kind: ControllerKind, namespace: &str, name: &str, err: &LookupError) {
    match err {
        LookupError::NotFound | LookupError::Cancelled => {
            debug!(%kind, %namespace, %name, %err, "controller lookup failed");
        }
        LookupError::Kube(kube_err) if is_transient_error(kube_err) => {
            debug!(%kind, %namespace, %name, %err, "transient error on controller lookup");
        }
        LookupError::Timeout(_) | LookupError::Kube(_) => {
            warn!(%kind, %namespace, %name, %err, "controller lookup failed");
        }
    }
}
