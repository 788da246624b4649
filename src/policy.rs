/// Overrides of the default drain safety checks.
///
/// Each `permit_*` flag relaxes exactly one check; they do not imply each other.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DrainPolicy {
    /// Evict pods without a controller, or with a controller of an unrecognized kind.
    pub permit_unmanaged_pods: bool,
    /// Evict pods with `emptyDir` volumes.
    pub permit_local_storage: bool,
    /// Evict pods in the `kube-system` namespace that are not managed by a daemon set.
    pub permit_system_pods: bool,
    /// Look the owning controllers up, instead of trusting the references on the pods.
    pub verify_owner_references: bool,
    /// Replication controllers and replica sets must declare at least this many replicas.
    pub min_replicas: i32,
    /// Forwarded to the eviction of each pod.
    pub grace_period_seconds: Option<u32>,
}

impl Default for DrainPolicy {
    fn default() -> Self {
        Self {
            permit_unmanaged_pods: false,
            permit_local_storage: false,
            permit_system_pods: false,
            verify_owner_references: true,
            min_replicas: 0,
            grace_period_seconds: None,
        }
    }
}
