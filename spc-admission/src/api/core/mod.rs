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

//! Core Kubernetes API types (Pod, Namespace, Service).

use std::any::Any;
use std::collections::HashMap;

/// ApiObject is a trait for Kubernetes API objects that can be used in admission.
pub trait ApiObject: Send + Sync {
    /// Returns the object as Any for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Returns the object as mutable Any for downcasting.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Returns the kind of this object.
    fn kind(&self) -> &str;

    /// Returns the name recorded in the object's metadata.
    fn name(&self) -> &str;
}

// ============================================================================
// Pod
// ============================================================================

/// PodSpec describes the specification of a pod.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PodSpec {
    /// NodeSelector is a selector which must be true for the pod to fit on a node.
    pub node_selector: HashMap<String, String>,
}

/// Pod represents a Kubernetes Pod.
#[derive(Debug, Clone, PartialEq)]
pub struct Pod {
    /// Name of the pod.
    pub name: String,
    /// Namespace of the pod.
    pub namespace: String,
    /// Pod specification.
    pub spec: PodSpec,
    /// Annotations is an unstructured key value map.
    pub annotations: HashMap<String, String>,
}

impl Pod {
    /// Create a new pod with the given name and namespace.
    pub fn new(name: &str, namespace: &str) -> Self {
        Self {
            name: name.to_string(),
            namespace: namespace.to_string(),
            spec: PodSpec::default(),
            annotations: HashMap::new(),
        }
    }

    /// Set the pod's node selector.
    pub fn with_node_selector(mut self, node_selector: HashMap<String, String>) -> Self {
        self.spec.node_selector = node_selector;
        self
    }
}

impl ApiObject for Pod {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn kind(&self) -> &str {
        "Pod"
    }

    fn name(&self) -> &str {
        &self.name
    }
}

// ============================================================================
// Namespace
// ============================================================================

/// Namespace represents a Kubernetes Namespace as seen through the informer cache.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Namespace {
    pub name: String,
    pub annotations: HashMap<String, String>,
}

impl Namespace {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            annotations: HashMap::new(),
        }
    }

    /// Add an annotation to the namespace.
    pub fn with_annotation(mut self, key: &str, value: &str) -> Self {
        self.annotations.insert(key.to_string(), value.to_string());
        self
    }

    /// Returns true if the namespace carries the given annotation key, whatever its value.
    pub fn has_annotation(&self, key: &str) -> bool {
        self.annotations.contains_key(key)
    }
}

impl ApiObject for Namespace {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn kind(&self) -> &str {
        "Namespace"
    }

    fn name(&self) -> &str {
        &self.name
    }
}

// ============================================================================
// Service
// ============================================================================

/// Service represents a Kubernetes Service (for testing non-pod resources).
#[derive(Debug, Clone, PartialEq)]
pub struct Service {
    pub name: String,
    pub namespace: String,
}

impl Service {
    /// Create a new service with the given name and namespace.
    pub fn new(name: &str, namespace: &str) -> Self {
        Self {
            name: name.to_string(),
            namespace: namespace.to_string(),
        }
    }
}

impl ApiObject for Service {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn kind(&self) -> &str {
        "Service"
    }

    fn name(&self) -> &str {
        &self.name
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Helper to create a core API resource GroupResource.
pub fn resource(name: &str) -> crate::admission::attributes::GroupResource {
    crate::admission::attributes::GroupResource::new("", name)
}

// ============================================================================
// Tests
// ============================================================================
