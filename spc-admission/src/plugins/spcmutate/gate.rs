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

//! Namespace annotation gate.

use crate::admission::{AdmissionError, AdmissionResult, Attributes, DenyReason};
use crate::api::core::Namespace;
use tracing::debug;

/// GateDecision is the outcome of checking a namespace against the gate annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    Deny(String),
}

impl GateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GateDecision::Allow)
    }

    /// Convert the decision into an admission result for the given request.
    pub fn into_result(self, attributes: &dyn Attributes) -> AdmissionResult<()> {
        match self {
            GateDecision::Allow => Ok(()),
            GateDecision::Deny(reason) => Err(AdmissionError::forbidden_for(
                attributes,
                DenyReason::Policy(reason),
            )),
        }
    }
}

/// Decide whether a pod in `namespace` may proceed.
///
/// A namespace carrying `gate_key` has opted out and is skipped. Without the
/// annotation the pod would be mutated, but no mutation is defined yet, so
/// both paths admit the pod unchanged.
pub fn decide(namespace: &Namespace, gate_key: &str) -> GateDecision {
    if namespace.has_annotation(gate_key) {
        debug!(namespace = %namespace.name, annotation = gate_key, "Namespace opted out, skipping");
        return GateDecision::Allow;
    }

    // TODO: rewrite the pod spec here once the namespace-driven mutation is defined.
    debug!(namespace = %namespace.name, "Namespace not annotated, admitting pod unchanged");
    GateDecision::Allow
}
