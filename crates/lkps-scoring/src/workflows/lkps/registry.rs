use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use super::plugin::TablePlugin;
use super::plugins::{
    AdjunctFacultyPlugin, CitationPlugin, CooperationPlugin, FacultyOutputPlugin,
    FundedActivityPlugin, PermanentFacultyPlugin, PublicationPlugin, RecognitionPlugin,
    StudentInvolvementPlugin, StudentOutputPlugin, WorkloadPlugin,
};

/// Table code to plugin map. Lookups are exact; families are expanded to their member
/// codes when the plugin is registered.
#[derive(Clone, Default)]
pub struct PluginRegistry {
    plugins: BTreeMap<String, Arc<dyn TablePlugin>>,
}

/// Registry listing entry for API and CLI output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginSummary {
    pub code: String,
    pub title: &'static str,
    pub allows_selection: bool,
    pub header_rows: usize,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every built-in LKPS table plugin.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register(CooperationPlugin::new());
        registry.register(PermanentFacultyPlugin::new());
        registry.register(WorkloadPlugin::new());
        registry.register(AdjunctFacultyPlugin::new());
        registry.register(RecognitionPlugin::new());
        registry.register(FundedActivityPlugin::research());
        registry.register(FundedActivityPlugin::community_service());
        registry.register(PublicationPlugin::new());
        registry.register(CitationPlugin::new());
        registry.register(FacultyOutputPlugin::new());
        registry.register(StudentInvolvementPlugin::research());
        registry.register(StudentInvolvementPlugin::community_service());
        registry.register(StudentOutputPlugin::new());
        registry
    }

    /// Registers `plugin` under every code it declares. A later registration replaces an
    /// earlier one for the same code.
    pub fn register<P>(&mut self, plugin: P)
    where
        P: TablePlugin + 'static,
    {
        let plugin: Arc<dyn TablePlugin> = Arc::new(plugin);
        for code in plugin.codes() {
            self.plugins.insert((*code).to_string(), Arc::clone(&plugin));
        }
    }

    pub fn register_code(&mut self, code: &str, plugin: Arc<dyn TablePlugin>) {
        self.plugins.insert(code.trim().to_string(), plugin);
    }

    pub fn resolve(&self, code: &str) -> Option<Arc<dyn TablePlugin>> {
        self.plugins.get(code.trim()).cloned()
    }

    pub fn codes(&self) -> Vec<&str> {
        self.plugins.keys().map(String::as_str).collect()
    }

    pub fn summaries(&self) -> Vec<PluginSummary> {
        self.plugins
            .iter()
            .map(|(code, plugin)| PluginSummary {
                code: code.clone(),
                title: plugin.title(),
                allows_selection: plugin.schema().allows_selection,
                header_rows: plugin.schema().header_rows,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("codes", &self.codes())
            .finish()
    }
}
