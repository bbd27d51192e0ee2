// Copyright 2024 The Kubernetes Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Admission error types.

use super::attributes::{Attributes, GroupResource};
use crate::cache::LookupError;
use thiserror::Error;

/// Result type for admission operations.
pub type AdmissionResult<T> = Result<T, AdmissionError>;

/// AdmissionError represents errors that can occur during admission.
#[derive(Debug, Error)]
pub enum AdmissionError {
    /// BadRequest indicates a malformed request.
    #[error("{0}")]
    BadRequest(String),

    /// Forbidden indicates the request is not allowed.
    #[error(transparent)]
    Forbidden(#[from] ForbiddenError),

    /// Internal represents an internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AdmissionError {
    /// Create a new BadRequest error.
    pub fn bad_request(msg: impl Into<String>) -> Self {
        AdmissionError::BadRequest(msg.into())
    }

    /// Create a Forbidden error for the given resource and object name.
    /// This corresponds to apierrors.NewForbidden.
    pub fn forbidden(resource: GroupResource, name: impl Into<String>, reason: DenyReason) -> Self {
        AdmissionError::Forbidden(ForbiddenError {
            resource,
            name: name.into(),
            reason,
        })
    }

    /// Create a Forbidden error scoped to the resource named by the request attributes.
    /// This corresponds to admission.NewForbidden.
    ///
    /// The request name is used when present; otherwise the name is taken from
    /// the object being admitted, which is the case for generated names.
    pub fn forbidden_for(attributes: &dyn Attributes, reason: DenyReason) -> Self {
        let name = match attributes.get_name() {
            "" => attributes.get_object().map(|o| o.name()).unwrap_or_default(),
            name => name,
        };
        Self::forbidden(attributes.get_resource().group_resource(), name, reason)
    }

    /// Create an Internal error.
    pub fn internal_error(msg: impl Into<String>) -> Self {
        AdmissionError::Internal(msg.into())
    }

    /// Returns true if this error is a forbidden denial.
    pub fn is_forbidden(&self) -> bool {
        matches!(self, AdmissionError::Forbidden(_))
    }

    /// Returns the denial reason if this is a forbidden error.
    pub fn deny_reason(&self) -> Option<&DenyReason> {
        match self {
            AdmissionError::Forbidden(f) => Some(&f.reason),
            _ => None,
        }
    }
}

/// ForbiddenError is a structured denial naming the offending resource.
#[derive(Debug, Error)]
#[error("{resource} \"{name}\" is forbidden: {reason}")]
pub struct ForbiddenError {
    pub resource: GroupResource,
    pub name: String,
    #[source]
    pub reason: DenyReason,
}

/// DenyReason explains why a request was forbidden.
#[derive(Debug, Error)]
pub enum DenyReason {
    /// The namespace cache did not report synced before the wait deadline.
    #[error("{plugin}: caches not synchronized")]
    CacheNotSynchronized { plugin: &'static str },

    /// The caller gave up on the request while the plugin was waiting for its caches.
    #[error("{plugin}: admission canceled while waiting for caches to synchronize")]
    Canceled { plugin: &'static str },

    /// The request namespace could not be resolved from the cache.
    #[error(transparent)]
    NamespaceLookup(#[from] LookupError),

    /// A namespace policy rejected the request.
    #[error("{0}")]
    Policy(String),
}

/// InitializationError is returned when a plugin is placed into service
/// without the collaborators it depends on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InitializationError {
    #[error("{plugin} plugin needs a namespace lister")]
    MissingNamespaceLister { plugin: &'static str },

    #[error("{plugin} plugin needs a namespace lister synced")]
    MissingNamespaceListerSynced { plugin: &'static str },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admission::attributes::AttributesRecord;
    use crate::admission::Operation;
    use crate::api::core::{resource, Pod};

    #[test]
    fn test_forbidden_error_display() {
        let err = AdmissionError::forbidden(
            resource("pods"),
            "test-pod",
            DenyReason::NamespaceLookup(LookupError::NotFound("missing".to_string())),
        );
        assert!(err.is_forbidden());
        assert_eq!(
            err.to_string(),
            "pods \"test-pod\" is forbidden: namespaces \"missing\" not found"
        );
    }

    #[test]
    fn test_forbidden_group_qualified_resource() {
        let err = AdmissionError::forbidden(
            GroupResource::new("apps", "deployments"),
            "web",
            DenyReason::Policy("not allowed".to_string()),
        );
        assert_eq!(
            err.to_string(),
            "deployments.apps \"web\" is forbidden: not allowed"
        );
    }

    #[test]
    fn test_forbidden_for_uses_object_name_when_request_name_empty() {
        let attrs = AttributesRecord::new_pod(
            "",
            "default",
            Operation::Create,
            Pod::new("generated-abc12", "default"),
        );
        let err = AdmissionError::forbidden_for(
            &attrs,
            DenyReason::CacheNotSynchronized { plugin: "test-plugin" },
        );
        assert_eq!(
            err.to_string(),
            "pods \"generated-abc12\" is forbidden: test-plugin: caches not synchronized"
        );
        assert!(matches!(
            err.deny_reason(),
            Some(DenyReason::CacheNotSynchronized { .. })
        ));
    }

    #[test]
    fn test_initialization_error_display() {
        let err = InitializationError::MissingNamespaceLister { plugin: "mutate spc" };
        assert_eq!(err.to_string(), "mutate spc plugin needs a namespace lister");
        let err = InitializationError::MissingNamespaceListerSynced { plugin: "mutate spc" };
        assert_eq!(
            err.to_string(),
            "mutate spc plugin needs a namespace lister synced"
        );
    }

    #[test]
    fn test_non_forbidden_has_no_reason() {
        let err = AdmissionError::bad_request("expected Pod");
        assert!(!err.is_forbidden());
        assert!(err.deny_reason().is_none());
        assert_eq!(
            AdmissionError::internal_error("boom").to_string(),
            "internal error: boom"
        );
    }
}
