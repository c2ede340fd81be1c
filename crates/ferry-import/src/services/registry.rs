//! Lookup of importer providers by source

use std::collections::HashMap;
use std::sync::Arc;

use ferry_core::ImportSource;
use ferry_import_types::{ImportError, ImportResult, ImporterProvider};
use tracing::info;

/// Registered importer providers, one per external service
#[derive(Clone, Default)]
pub struct ImporterRegistry {
    providers: HashMap<ImportSource, Arc<dyn ImporterProvider>>,
}

impl ImporterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider, replacing any earlier one for the same source
    pub fn register(&mut self, provider: Arc<dyn ImporterProvider>) {
        let source = provider.source();
        info!("Registering importer for source: {}", source);
        self.providers.insert(source, provider);
    }

    pub fn with_provider(mut self, provider: Arc<dyn ImporterProvider>) -> Self {
        self.register(provider);
        self
    }

    pub fn provider(&self, source: ImportSource) -> ImportResult<Arc<dyn ImporterProvider>> {
        self.providers
            .get(&source)
            .cloned()
            .ok_or_else(|| ImportError::SourceNotAvailable(source.to_string()))
    }

    /// Registered sources in a stable order
    pub fn sources(&self) -> Vec<ImportSource> {
        let mut sources: Vec<_> = self.providers.keys().copied().collect();
        sources.sort();
        sources
    }
}
