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

//! Pod admission gate backed by a namespace informer cache.
//!
//! The `node.openshift.io/mutate-spc` plugin decides, for every pod creation,
//! whether the request may proceed. Its decision depends on the pod's namespace
//! as seen through a locally replicated cache whose freshness is not guaranteed
//! when the request arrives, so the plugin waits (bounded and cancellable) for
//! the cache to sync before it consults it.

pub mod admission;
pub mod api;
pub mod cache;
pub mod plugins;
pub mod wait;

// Re-export commonly used types
pub use admission::{
    AdmissionError, AdmissionResult, Attributes, AttributesRecord, Handler, Interface,
    MutationInterface, Operation, Phase, ValidationInterface,
};
pub use api::core::{Namespace, Pod};
pub use cache::{InMemoryNamespaceStore, InformerSynced, NamespaceInformer, NamespaceLister};
pub use plugins::spcmutate::PodMutateSpc;
