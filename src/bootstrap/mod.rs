//! Bootstrap for Pre-Clear
//!
//! Loads the rule table and both catalogs once at startup and wires them
//! into the retriever and scorer shared by every request. Catalog failures
//! degrade the service to rules-only; a broken rule file stops startup.

use std::sync::Arc;
use tracing::{info, warn};

use crate::config::{CatalogConfig, Config};
use crate::embedding::{Embedder, EmbeddingEngine, ModelConfig};
use crate::errors::Result;
use crate::loader::{ResourceLoader, RetrieverHandle};
use crate::retrieval::SemanticRetriever;
use crate::rules::{builtin_rules, RuleEngine, RuleSet};
use crate::scoring::HybridScorer;

/// Catalog names used in logs and readiness output
pub const HS_CATALOG: &str = "hs";
pub const DOCUMENTS_CATALOG: &str = "documents";

/// Everything the request path needs, built once
#[derive(Clone)]
pub struct AppResources {
    pub hs: Arc<RetrieverHandle>,
    pub documents: Arc<RetrieverHandle>,
    pub rules: Arc<dyn RuleEngine>,
    pub rule_count: usize,
}

/// Loads the embedding model at most once across catalogs.
///
/// A failed load is remembered so the second catalog does not retry it.
struct SharedModel<F> {
    factory: F,
    loaded: Option<std::result::Result<Arc<dyn Embedder>, String>>,
}

impl<F> SharedModel<F>
where
    F: Fn(&ModelConfig) -> anyhow::Result<Arc<dyn Embedder>>,
{
    fn new(factory: F) -> Self {
        Self {
            factory,
            loaded: None,
        }
    }

    fn get(&mut self, config: &ModelConfig) -> anyhow::Result<Arc<dyn Embedder>> {
        if self.loaded.is_none() {
            let result = (self.factory)(config).map_err(|e| format!("{:#}", e));
            self.loaded = Some(result);
        }
        match &self.loaded {
            Some(Ok(model)) => Ok(model.clone()),
            Some(Err(reason)) => Err(anyhow::anyhow!("{}", reason)),
            None => Err(anyhow::anyhow!("embedding model not loaded")),
        }
    }
}

impl AppResources {
    /// Load with the production sentence-transformer
    pub fn load(config: &Config) -> Result<Self> {
        Self::load_with(config, |model| {
            let engine = EmbeddingEngine::load(model)?;
            Ok(Arc::new(engine) as Arc<dyn Embedder>)
        })
    }

    /// Load with a caller-supplied model factory
    pub fn load_with<F>(config: &Config, factory: F) -> Result<Self>
    where
        F: Fn(&ModelConfig) -> anyhow::Result<Arc<dyn Embedder>>,
    {
        let rules = load_rules(config)?;
        let rule_count = rules.len();
        info!(rules = rule_count, "rule table loaded");

        let mut model = SharedModel::new(factory);
        let hs = load_catalog(HS_CATALOG, &config.catalogs.hs, &config.model, &mut model);
        let documents = load_catalog(
            DOCUMENTS_CATALOG,
            &config.catalogs.documents,
            &config.model,
            &mut model,
        );

        Ok(Self {
            hs: Arc::new(hs),
            documents: Arc::new(documents),
            rules: Arc::new(rules),
            rule_count,
        })
    }

    /// Retriever over the HS code catalog
    pub fn hs_retriever(&self) -> SemanticRetriever {
        SemanticRetriever::new(self.hs.clone())
    }

    /// Scorer combining the rules with the document catalog
    pub fn scorer(&self, config: &Config) -> HybridScorer {
        HybridScorer::new(
            self.rules.clone(),
            SemanticRetriever::new(self.documents.clone()),
            config.scoring.clone(),
        )
    }
}

/// Configured rule file, or the built-in table
pub fn load_rules(config: &Config) -> Result<RuleSet> {
    match &config.rules.path {
        Some(path) => {
            info!(path = %path.display(), "loading rule file");
            RuleSet::load(path)
        }
        None => builtin_rules(),
    }
}

fn load_catalog<F>(
    name: &str,
    catalog: &CatalogConfig,
    model_config: &ModelConfig,
    model: &mut SharedModel<F>,
) -> RetrieverHandle
where
    F: Fn(&ModelConfig) -> anyhow::Result<Arc<dyn Embedder>>,
{
    if !catalog.enabled {
        warn!(catalog = name, "catalog disabled, semantic search off");
        return RetrieverHandle::unloaded(name);
    }

    let loader = ResourceLoader::new(name, catalog.paths(), catalog.id_column.clone());
    loader.load(|| model.get(model_config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::ResourceState;
    use std::cell::Cell;
    use tempfile::TempDir;

    #[test]
    fn test_missing_artifacts_degrade_to_rules_only() {
        let temp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.catalogs.hs.dir = temp.path().join("hs");
        config.catalogs.documents.dir = temp.path().join("documents");

        let calls = Cell::new(0);
        let resources = AppResources::load_with(&config, |_| {
            calls.set(calls.get() + 1);
            Err(anyhow::anyhow!("no model in tests"))
        })
        .unwrap();

        assert_eq!(calls.get(), 0);
        assert!(!resources.hs.is_ready());
        assert!(!resources.documents.is_ready());
        assert!(resources.rule_count > 0);
        assert!(!resources.hs_retriever().is_ready());
    }

    #[test]
    fn test_disabled_catalog_is_unloaded() {
        let mut config = Config::default();
        config.catalogs.hs.enabled = false;
        config.catalogs.documents.enabled = false;

        let resources =
            AppResources::load_with(&config, |_| Err(anyhow::anyhow!("unused"))).unwrap();
        assert_eq!(resources.hs.state(), &ResourceState::Unloaded);
        assert_eq!(resources.documents.state(), &ResourceState::Unloaded);
    }

    #[test]
    fn test_broken_rule_file_is_fatal() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("rules.toml");
        std::fs::write(&path, "[[rule]]\nname = 1").unwrap();

        let mut config = Config::default();
        config.rules.path = Some(path);
        assert!(load_rules(&config).is_err());
    }

    #[test]
    fn test_shared_model_remembers_failure() {
        let calls = Cell::new(0);
        let mut model = SharedModel::new(|_: &ModelConfig| -> anyhow::Result<Arc<dyn Embedder>> {
            calls.set(calls.get() + 1);
            Err(anyhow::anyhow!("download failed"))
        });

        let config = ModelConfig::default();
        assert!(model.get(&config).is_err());
        let err = model.get(&config).err().unwrap();
        assert!(err.to_string().contains("download failed"));
        assert_eq!(calls.get(), 1);
    }
}
