use std::fmt::{Display, Formatter};

use k8s_openapi::api::core::v1::Pod;
use kube::api::EvictParams;
use kube::runtime::reflector::ObjectRef;
use thiserror::Error;

use crate::classify::{SkipReason, Verdict, ViolationReason};
use crate::pod_evict_params::evict_params_for;
use crate::policy::DrainPolicy;
use crate::utils::get_object_ref;

/// Pods that may be evicted from the node, in the order they were given.
#[derive(Debug, Default)]
pub struct DrainDecision<'a> {
    pub pods_to_evict: Vec<&'a Pod>,
    pub skipped: Vec<(&'a Pod, SkipReason)>,
}

impl<'a> DrainDecision<'a> {
    pub fn evictions(&self, policy: &DrainPolicy) -> Vec<(&'a Pod, EvictParams)> {
        self.pods_to_evict
            .iter()
            .map(|pod| (*pod, evict_params_for(pod, policy)))
            .collect()
    }
}

#[derive(Debug)]
pub struct PodViolation {
    pub pod: ObjectRef<Pod>,
    pub reasons: Vec<ViolationReason>,
}

impl Display for PodViolation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.pod.namespace {
            Some(namespace) => write!(f, "{}/{}", namespace, self.pod.name)?,
            None => write!(f, "{}", self.pod.name)?,
        }
        for (i, reason) in self.reasons.iter().enumerate() {
            let separator = if i == 0 { ": " } else { "; " };
            write!(f, "{separator}{reason}")?;
        }
        Ok(())
    }
}

/// Every pod that blocks the drain, with all of its reasons.
#[derive(Debug, Error)]
pub struct DrainError {
    violations: Vec<PodViolation>,
}

impl DrainError {
    pub fn violations(&self) -> &[PodViolation] {
        &self.violations
    }
}

impl Display for DrainError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} pod(s) cannot be evicted from the node",
            self.violations.len()
        )?;
        for violation in &self.violations {
            write!(f, "\n{violation}")?;
        }
        Ok(())
    }
}

pub fn aggregate<'a>(
    verdicts: impl IntoIterator<Item = (&'a Pod, Verdict)>,
) -> Result<DrainDecision<'a>, DrainError> {
    let mut decision = DrainDecision::default();
    let mut violations = Vec::new();

    for (pod, verdict) in verdicts {
        match verdict {
            Verdict::Evict => decision.pods_to_evict.push(pod),
            Verdict::Skip(reason) => decision.skipped.push((pod, reason)),
            Verdict::Violation(reasons) => violations.push(PodViolation {
                pod: get_object_ref(pod),
                reasons,
            }),
        }
    }

    if violations.is_empty() {
        Ok(decision)
    } else {
        Err(DrainError { violations })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! from_json {
        ($($json:tt)+) => {
            ::serde_json::from_value(::serde_json::json!($($json)+)).expect("Invalid json")
        };
    }

    fn pod(name: &str) -> Pod {
        from_json!({
            "metadata": {
                "name": name,
                "namespace": "default",
            },
        })
    }

    #[test]
    fn evict_list_should_keep_input_order() {
        let pods = [pod("a"), pod("b"), pod("c"), pod("d")];
        let decision = aggregate([
            (&pods[0], Verdict::Evict),
            (
                &pods[1],
                Verdict::Skip(SkipReason::DaemonSet {
                    name: String::from("ds"),
                }),
            ),
            (&pods[2], Verdict::Evict),
            (&pods[3], Verdict::Evict),
        ])
        .unwrap();

        let names: Vec<_> = decision
            .pods_to_evict
            .iter()
            .map(|pod| pod.metadata.name.as_deref().unwrap())
            .collect();
        assert_eq!(names, vec!["a", "c", "d"]);
        assert_eq!(decision.skipped.len(), 1);
    }

    #[test]
    fn skipped_only_should_succeed() {
        let pods = [pod("a")];
        let decision = aggregate([(&pods[0], Verdict::Skip(SkipReason::MirrorPod))]).unwrap();
        assert!(decision.pods_to_evict.is_empty());

        let decision = aggregate(Vec::<(&Pod, Verdict)>::new()).unwrap();
        assert!(decision.pods_to_evict.is_empty());
    }

    #[test]
    fn every_violation_should_be_reported() {
        let pods = [pod("a"), pod("b"), pod("c")];
        let result = aggregate([
            (&pods[0], Verdict::Violation(vec![ViolationReason::NoController])),
            (&pods[1], Verdict::Evict),
            (
                &pods[2],
                Verdict::Violation(vec![ViolationReason::LocalStorage {
                    volumes: vec![String::from("scratch")],
                }]),
            ),
        ]);

        let err = result.unwrap_err();
        assert_eq!(err.violations().len(), 2);
        assert_eq!(err.violations()[0].pod.name, "a");
        assert_eq!(
            err.violations()[0].reasons,
            vec![ViolationReason::NoController]
        );
        assert_eq!(err.violations()[1].pod.name, "c");

        let message = err.to_string();
        assert!(message.starts_with("2 pod(s) cannot be evicted from the node"));
        assert!(message.contains("default/a: pod has no controller"));
        assert!(message.contains("default/c: pod uses node-local storage"));
        assert!(message.contains("volumes: scratch"));
    }

    #[test]
    fn evictions_should_forward_grace_period() {
        let pods = [pod("a")];
        let decision = aggregate([(&pods[0], Verdict::Evict)]).unwrap();
        let policy = DrainPolicy {
            grace_period_seconds: Some(30),
            ..DrainPolicy::default()
        };

        let evictions = decision.evictions(&policy);
        assert_eq!(evictions.len(), 1);
        let delete_options = evictions[0].1.delete_options.as_ref().unwrap();
        assert_eq!(delete_options.grace_period_seconds, Some(30));
    }
}
