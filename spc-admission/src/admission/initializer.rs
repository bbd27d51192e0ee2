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

//! Plugin initialization.
//!
//! Plugins are constructed without their collaborators. Before a plugin is put
//! into service the host runs every initializer over it; each initializer asks
//! the plugin whether it wants what the initializer provides.

use crate::cache::NamespaceInformer;
use std::sync::Arc;
use tracing::debug;

/// WantsNamespaceInformer is implemented by plugins that read namespaces from
/// a shared informer cache.
pub trait WantsNamespaceInformer {
    fn set_namespace_informer(&mut self, informer: Arc<dyn NamespaceInformer>);
}

/// InitializablePlugin exposes the initialization interfaces a plugin implements.
pub trait InitializablePlugin {
    /// Plugin name, used for logging.
    fn name(&self) -> &str;

    fn as_wants_namespace_informer(&mut self) -> Option<&mut dyn WantsNamespaceInformer> {
        None
    }
}

/// PluginInitializer is used to initialize plugins after they are created.
pub trait PluginInitializer: Send + Sync {
    /// Initialize is called to initialize the plugin.
    fn initialize(&self, plugin: &mut dyn InitializablePlugin);
}

/// NamespaceInformerInitializer hands a namespace informer to every plugin that wants one.
pub struct NamespaceInformerInitializer {
    informer: Arc<dyn NamespaceInformer>,
}

impl NamespaceInformerInitializer {
    pub fn new(informer: Arc<dyn NamespaceInformer>) -> Self {
        Self { informer }
    }
}

impl PluginInitializer for NamespaceInformerInitializer {
    fn initialize(&self, plugin: &mut dyn InitializablePlugin) {
        let name = plugin.name().to_string();
        if let Some(wants) = plugin.as_wants_namespace_informer() {
            debug!(plugin = %name, "Injecting namespace informer");
            wants.set_namespace_informer(Arc::clone(&self.informer));
        }
    }
}

/// Run each initializer over the plugin in order.
pub fn initialize_plugin(
    initializers: &[Box<dyn PluginInitializer>],
    plugin: &mut dyn InitializablePlugin,
) {
    for initializer in initializers {
        initializer.initialize(plugin);
    }
}
