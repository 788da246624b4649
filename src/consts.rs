pub const BINARY_NAME: &str = "drain-eligibility";

/// Legacy annotation holding a JSON `SerializedReference` to the creator of the pod.
pub const CREATED_BY_ANNOTATION_KEY: &str = "kubernetes.io/created-by";
/// Set by the kubelet on the API-server mirror of a static pod.
pub const MIRROR_POD_ANNOTATION_KEY: &str = "kubernetes.io/config.mirror";

pub const SYSTEM_NAMESPACE: &str = "kube-system";
