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

//! Mutate-SPC admission controller.
//!
//! Gates pod creation on the pod's namespace as seen through the shared
//! namespace informer. The informer is not guaranteed to be synced when a
//! request arrives, so each request first waits (bounded, cancellable) for the
//! cache to report synced and is denied if it never does. A namespace missing
//! from a synced cache is also a denial. The mutating and validating passes run
//! the same evaluation, so anything admitted by one is admitted by the other.

pub mod config;
pub mod gate;

pub use config::{Config, ConfigError};
pub use gate::{decide, GateDecision};

use crate::admission::initializer::{InitializablePlugin, WantsNamespaceInformer};
use crate::admission::{
    AdmissionError, AdmissionResult, Attributes, DenyReason, Handler, InitializationError,
    InitializationValidator, Interface, MutationInterface, Operation, Phase, ValidationInterface,
};
use crate::api::core::Pod;
use crate::cache::{synced_predicate, InformerSynced, NamespaceInformer, NamespaceLister};
use crate::wait::{wait_for_synced, WaitError};
use async_trait::async_trait;
use std::io::Read;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

/// Plugin name for the mutate-spc admission controller.
pub const PLUGIN_NAME: &str = "node.openshift.io/mutate-spc";

/// Namespace annotation that opts a namespace out of pod mutation.
pub const MUTATE_SPC_ANNOTATION: &str = "node.openshift.io/mutate-spc";

const DISPLAY_NAME: &str = "mutate spc";

/// PodMutateSpc is an implementation of the mutate-spc admission controller.
pub struct PodMutateSpc {
    handler: Handler,
    namespace_lister: Option<Arc<dyn NamespaceLister>>,
    namespace_synced: Option<InformerSynced>,
    config: Config,
}

impl PodMutateSpc {
    /// Create the plugin. It cannot serve requests until a namespace informer is injected.
    pub fn new(config: Config) -> Self {
        Self {
            handler: Handler::new_create(),
            namespace_lister: None,
            namespace_synced: None,
            config,
        }
    }

    /// Build the plugin from an optional JSON config stream, the way the host's
    /// plugin factories receive their configuration.
    pub fn from_config_reader(config: Option<&mut dyn Read>) -> Result<Self, ConfigError> {
        let config = match config {
            Some(reader) => Config::from_reader(reader)?,
            None => Config::default(),
        };
        if let Some(selector) = &config.default_node_selector {
            debug!(plugin = PLUGIN_NAME, default_node_selector = %selector, "Loaded config");
        }
        Ok(Self::new(config))
    }

    /// Inject the lister and its synced predicate directly.
    pub fn set_namespace_lister(
        &mut self,
        lister: Arc<dyn NamespaceLister>,
        synced: InformerSynced,
    ) {
        self.namespace_lister = Some(lister);
        self.namespace_synced = Some(synced);
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Evaluate a request. Both admission phases call this with the same attributes.
    #[instrument(
        skip_all,
        fields(
            plugin = PLUGIN_NAME,
            phase = %phase,
            namespace = attributes.get_namespace(),
            name = attributes.get_name(),
        )
    )]
    pub async fn evaluate(
        &self,
        cancel: &CancellationToken,
        attributes: &dyn Attributes,
        phase: Phase,
    ) -> AdmissionResult<()> {
        if should_ignore(attributes) {
            return Ok(());
        }

        let pod = match attributes
            .get_object()
            .and_then(|obj| obj.as_any().downcast_ref::<Pod>())
        {
            Some(pod) => pod,
            None => return Ok(()),
        };

        let (lister, synced) = match (&self.namespace_lister, &self.namespace_synced) {
            (Some(lister), Some(synced)) => (lister, synced),
            _ => {
                return Err(AdmissionError::internal_error(format!(
                    "{} admission plugin used before initialization",
                    PLUGIN_NAME
                )))
            }
        };

        if let Err(err) = wait_for_synced(
            synced.as_ref(),
            self.config.sync_poll_interval(),
            self.config.sync_timeout(),
            cancel,
        )
        .await
        {
            let reason = match err {
                WaitError::Timeout(_) => DenyReason::CacheNotSynchronized {
                    plugin: PLUGIN_NAME,
                },
                WaitError::Canceled => DenyReason::Canceled {
                    plugin: PLUGIN_NAME,
                },
            };
            warn!(error = %err, "Denying pod, namespace cache not ready");
            return Err(AdmissionError::forbidden_for(attributes, reason));
        }

        let namespace = lister.get(attributes.get_namespace()).map_err(|err| {
            warn!(error = %err, "Denying pod, namespace lookup failed");
            AdmissionError::forbidden(
                attributes.get_resource().group_resource(),
                pod.name.as_str(),
                DenyReason::NamespaceLookup(err),
            )
        })?;

        gate::decide(&namespace, MUTATE_SPC_ANNOTATION).into_result(attributes)
    }
}

impl Default for PodMutateSpc {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

/// Only pods proper are gated; subresources and every other resource pass through.
fn should_ignore(attributes: &dyn Attributes) -> bool {
    let resource = attributes.get_resource();
    if !resource.group.is_empty() || resource.resource != "pods" {
        return true;
    }
    !attributes.get_subresource().is_empty()
}

impl Interface for PodMutateSpc {
    fn handles(&self, operation: Operation) -> bool {
        self.handler.handles(operation)
    }
}

#[async_trait]
impl MutationInterface for PodMutateSpc {
    async fn admit(
        &self,
        cancel: &CancellationToken,
        attributes: &mut dyn Attributes,
    ) -> AdmissionResult<()> {
        self.evaluate(cancel, &*attributes, Phase::Mutating).await
    }
}

#[async_trait]
impl ValidationInterface for PodMutateSpc {
    async fn validate(
        &self,
        cancel: &CancellationToken,
        attributes: &dyn Attributes,
    ) -> AdmissionResult<()> {
        self.evaluate(cancel, attributes, Phase::Validating).await
    }
}

impl InitializationValidator for PodMutateSpc {
    fn validate_initialization(&self) -> Result<(), InitializationError> {
        if self.namespace_lister.is_none() {
            return Err(InitializationError::MissingNamespaceLister {
                plugin: DISPLAY_NAME,
            });
        }
        if self.namespace_synced.is_none() {
            return Err(InitializationError::MissingNamespaceListerSynced {
                plugin: DISPLAY_NAME,
            });
        }
        Ok(())
    }
}

impl WantsNamespaceInformer for PodMutateSpc {
    fn set_namespace_informer(&mut self, informer: Arc<dyn NamespaceInformer>) {
        let lister = informer.lister();
        self.set_namespace_lister(lister, synced_predicate(informer));
    }
}

impl InitializablePlugin for PodMutateSpc {
    fn name(&self) -> &str {
        PLUGIN_NAME
    }

    fn as_wants_namespace_informer(&mut self) -> Option<&mut dyn WantsNamespaceInformer> {
        Some(self)
    }
}
