mod aggregate;
mod api_resolver;
mod classify;
mod config;
mod consts;
mod drain;
mod error_codes;
mod lookup;
mod owner;
mod pod_evict_params;
mod pod_state;
mod policy;
mod shutdown;
mod utils;

pub use crate::aggregate::{DrainDecision, DrainError, PodViolation, aggregate};
pub use crate::api_resolver::ApiResolver;
pub use crate::classify::{SkipReason, Verdict, ViolationReason, classify};
pub use crate::config::Config;
pub use crate::consts::{BINARY_NAME, CREATED_BY_ANNOTATION_KEY, MIRROR_POD_ANNOTATION_KEY};
pub use crate::drain::DrainEngine;
pub use crate::lookup::{
    ControllerKind, ControllerLookup, ControllerObject, KubeControllerLookup, LookupError,
};
pub use crate::owner::{
    ControllerStatus, DecodeError, OwnerReference, Ownership, ReferenceDecoder,
    SerializedReferenceDecoder, read_owner_reference, resolve,
};
pub use crate::pod_evict_params::evict_params_for;
pub use crate::policy::DrainPolicy;
pub use crate::shutdown::Shutdown;

#[cfg(test)]
#[macro_use]
extern crate assert_matches;
