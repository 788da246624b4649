use std::time::Duration;

use clap::Parser;
use eyre::{Result, eyre};
use humantime::parse_duration;

use crate::policy::DrainPolicy;

#[derive(Clone, Debug, Parser)]
#[command(version, about)]
pub struct Config {
    /// Node to be drained.
    pub node: String,

    /// Evict pods that no controller would recreate.
    #[arg(long, default_value = "false")]
    pub permit_unmanaged_pods: bool,

    /// Evict pods with emptyDir volumes.
    #[arg(long, default_value = "false")]
    pub permit_local_storage: bool,

    /// Evict kube-system pods that are not managed by a daemon set.
    #[arg(long, default_value = "false")]
    pub permit_system_pods: bool,

    /// Trust owner references without looking the controllers up.
    #[arg(long, default_value = "false")]
    pub skip_owner_verification: bool,

    #[arg(long, default_value = "0")]
    pub min_replicas: i32,

    /// Grace period for the eviction of each pod. Pod's own setting if omitted.
    #[arg(long, value_parser = parse_grace_period)]
    pub grace_period: Option<Duration>,

    /// "0s" to disable.
    #[arg(long, default_value = "10s", value_parser = parse_duration)]
    pub lookup_timeout: Duration,

    #[arg(long, default_value = "16")]
    pub max_concurrent_lookups: usize,
}

impl Config {
    pub fn policy(&self) -> DrainPolicy {
        DrainPolicy {
            permit_unmanaged_pods: self.permit_unmanaged_pods,
            permit_local_storage: self.permit_local_storage,
            permit_system_pods: self.permit_system_pods,
            verify_owner_references: !self.skip_owner_verification,
            min_replicas: self.min_replicas,
            grace_period_seconds: self
                .grace_period
                .map(|duration| duration.as_secs() as u32),
        }
    }

    pub fn lookup_timeout(&self) -> Option<Duration> {
        if self.lookup_timeout.is_zero() {
            None
        } else {
            Some(self.lookup_timeout)
        }
    }
}

fn parse_grace_period(input: &str) -> Result<Duration> {
    let duration = parse_duration(input)?;
    if duration.subsec_nanos() != 0 {
        return Err(eyre!("grace-period should be whole seconds"));
    }
    if duration.as_secs() > u64::from(u32::MAX) {
        return Err(eyre!("grace-period is too long"));
    }

    Ok(duration)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_should_be_default_policy() {
        let config = Config::try_parse_from(["drain-eligibility", "node-1"]).unwrap();
        assert_eq!(config.node, "node-1");
        assert_eq!(config.policy(), DrainPolicy::default());
        assert_eq!(config.lookup_timeout(), Some(Duration::from_secs(10)));
        assert_eq!(config.max_concurrent_lookups, 16);
    }

    #[test]
    fn flags_should_map_to_policy() {
        let config = Config::try_parse_from([
            "drain-eligibility",
            "node-1",
            "--permit-unmanaged-pods",
            "--permit-local-storage",
            "--skip-owner-verification",
            "--min-replicas=2",
            "--grace-period=1m",
            "--lookup-timeout=0s",
        ])
        .unwrap();

        let policy = config.policy();
        assert!(policy.permit_unmanaged_pods);
        assert!(policy.permit_local_storage);
        assert!(!policy.permit_system_pods);
        assert!(!policy.verify_owner_references);
        assert_eq!(policy.min_replicas, 2);
        assert_eq!(policy.grace_period_seconds, Some(60));
        assert_eq!(config.lookup_timeout(), None);
    }

    #[test]
    fn grace_period_should_be_whole_seconds() {
        assert!(parse_grace_period("1500ms").is_err());
        assert_eq!(parse_grace_period("0s").unwrap(), Duration::ZERO);
    }
}
