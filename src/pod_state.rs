use k8s_openapi::api::core::v1::Pod;
use kube::ResourceExt;

use crate::consts::{MIRROR_POD_ANNOTATION_KEY, SYSTEM_NAMESPACE};
use crate::try_some;

/// Static pods are owned by the kubelet; deleting the mirror object does nothing.
pub fn is_mirror_pod(pod: &Pod) -> bool {
    pod.annotations().contains_key(MIRROR_POD_ANNOTATION_KEY)
}

pub fn is_system_pod(pod: &Pod) -> bool {
    pod.metadata.namespace.as_deref() == Some(SYSTEM_NAMESPACE)
}

/// Names of the `emptyDir` volumes of the pod. Their contents live on the node's disk
/// and are gone once the pod is rescheduled elsewhere.
pub fn local_storage_volumes(pod: &Pod) -> Vec<&str> {
    let Some(volumes) = try_some!(pod.spec?.volumes?) else {
        return Vec::new();
    };

    volumes
        .iter()
        .filter(|volume| volume.empty_dir.is_some())
        .map(|volume| volume.name.as_str())
        .collect()
}
