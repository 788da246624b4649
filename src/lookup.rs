use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use k8s_openapi::api::apps::v1::{DaemonSet, ReplicaSet};
use k8s_openapi::api::batch::v1::Job;
use k8s_openapi::api::core::v1::ReplicationController;
use k8s_openapi::serde::de::DeserializeOwned;
use k8s_openapi::NamespaceResourceScope;
use kube::Resource;
use strum_macros::{Display, EnumString};
use thiserror::Error;

use crate::api_resolver::ApiResolver;
use crate::error_codes::is_404_not_found_error;

/// Kinds of controllers a pod reference is recognized to point at.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Display, EnumString)]
pub enum ControllerKind {
    ReplicationController,
    ReplicaSet,
    DaemonSet,
    Job,
}

/// What the control plane knows about a controller at the time of the lookup.
#[derive(Clone, Debug, PartialEq)]
pub struct ControllerObject {
    pub kind: ControllerKind,
    pub namespace: String,
    pub name: String,
    /// `spec.replicas`, only for replication controllers and replica sets.
    pub replicas: Option<i32>,
}

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("not found")]
    NotFound,
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    #[error("cancelled")]
    Cancelled,
    #[error("kube error: {0}")]
    Kube(#[from] kube::Error),
}

/// Point lookups of the controllers that own pods.
///
/// Called concurrently from every pod evaluation, so implementations must not
/// rely on exclusive access.
#[async_trait]
pub trait ControllerLookup: Send + Sync {
    async fn get_controller(
        &self,
        kind: ControllerKind,
        namespace: &str,
        name: &str,
    ) -> Result<ControllerObject, LookupError>;
}

#[derive(Clone)]
pub struct KubeControllerLookup {
    api_resolver: ApiResolver,
}

impl KubeControllerLookup {
    pub fn new(api_resolver: &ApiResolver) -> Self {
        Self {
            api_resolver: api_resolver.clone(),
        }
    }

    async fn get<K>(&self, namespace: &str, name: &str) -> Result<K, LookupError>
    where
        K: Resource<Scope = NamespaceResourceScope> + Clone + Debug + DeserializeOwned,
        K::DynamicType: Default,
    {
        let api = self.api_resolver.namespaced::<K>(namespace);
        lookup_result(api.get(name).await)
    }
}

fn lookup_result<K>(result: Result<K, kube::Error>) -> Result<K, LookupError> {
    match result {
        Ok(object) => Ok(object),
        Err(err) if is_404_not_found_error(&err) => Err(LookupError::NotFound),
        Err(err) => Err(err.into()),
    }
}

#[async_trait]
impl ControllerLookup for KubeControllerLookup {
    async fn get_controller(
        &self,
        kind: ControllerKind,
        namespace: &str,
        name: &str,
    ) -> Result<ControllerObject, LookupError> {
        let replicas = match kind {
            ControllerKind::ReplicationController => {
                let rc: ReplicationController = self.get(namespace, name).await?;
                rc.spec.and_then(|spec| spec.replicas)
            }
            ControllerKind::ReplicaSet => {
                let rs: ReplicaSet = self.get(namespace, name).await?;
                rs.spec.and_then(|spec| spec.replicas)
            }
            ControllerKind::DaemonSet => {
                let _: DaemonSet = self.get(namespace, name).await?;
                None
            }
            ControllerKind::Job => {
                let _: Job = self.get(namespace, name).await?;
                None
            }
        };

        Ok(ControllerObject {
            kind,
            namespace: namespace.to_owned(),
            name: name.to_owned(),
            replicas,
        })
    }
}
