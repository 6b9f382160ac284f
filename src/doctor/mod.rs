//! Doctor command for artifact diagnostics
//!
//! Inspects the configuration, the rule table and each catalog's artifacts
//! before anything is served, then reports readiness after loading.

use colored::Colorize;
use std::path::Path;

use crate::artifacts::{embeddings_shape, ArtifactPaths, MetadataTable, VectorIndex};
use crate::bootstrap::{load_rules, AppResources};
use crate::config::{CatalogConfig, Config};
use crate::loader::{ResourceState, RetrieverHandle};

/// Files a local sentence-transformer directory must contain
const MODEL_FILES: [&str; 3] = ["config.json", "tokenizer.json", "model.safetensors"];

/// Health check result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Pass,
    Warn(String),
    Fail(String),
}

/// Individual health check
#[derive(Debug)]
pub struct HealthCheck {
    pub name: String,
    pub status: HealthStatus,
}

impl HealthCheck {
    fn new(name: impl Into<String>, status: HealthStatus) -> Self {
        Self {
            name: name.into(),
            status,
        }
    }
}

/// Doctor diagnostics system
pub struct Doctor {
    config: Config,
}

impl Doctor {
    /// Create a new doctor instance
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run all static checks; nothing here loads the model
    pub fn run_diagnostics(&self) -> Vec<HealthCheck> {
        let mut checks = Vec::new();

        checks.push(self.check_rules());
        checks.push(self.check_model());
        checks.push(self.check_bind_address());
        for (name, catalog) in self.catalogs() {
            checks.push(Self::check_artifacts(name, catalog));
            if catalog.enabled && catalog.paths().all_present() {
                checks.push(Self::check_consistency(name, catalog));
            }
        }

        checks
    }

    /// Readiness of each loaded catalog
    pub fn check_readiness(resources: &AppResources) -> Vec<HealthCheck> {
        [&resources.hs, &resources.documents]
            .into_iter()
            .map(|handle| Self::readiness(handle))
            .collect()
    }

    fn catalogs(&self) -> [(&'static str, &CatalogConfig); 2] {
        [
            ("hs", &self.config.catalogs.hs),
            ("documents", &self.config.catalogs.documents),
        ]
    }

    fn check_rules(&self) -> HealthCheck {
        let name = "Rule Table";
        match load_rules(&self.config) {
            Ok(rules) if rules.is_empty() => HealthCheck::new(
                name,
                HealthStatus::Warn("no rules defined, only semantic items will be returned".to_string()),
            ),
            Ok(_) => HealthCheck::new(name, HealthStatus::Pass),
            Err(e) => HealthCheck::new(name, HealthStatus::Fail(e.to_string())),
        }
    }

    fn check_model(&self) -> HealthCheck {
        let name = "Embedding Model";
        match &self.config.model.local_dir {
            Some(dir) => {
                let missing: Vec<&str> = MODEL_FILES
                    .iter()
                    .copied()
                    .filter(|f| !dir.join(f).is_file())
                    .collect();
                if missing.is_empty() {
                    HealthCheck::new(name, HealthStatus::Pass)
                } else {
                    HealthCheck::new(
                        name,
                        HealthStatus::Fail(format!(
                            "{} missing {}",
                            dir.display(),
                            missing.join(", ")
                        )),
                    )
                }
            }
            None => HealthCheck::new(
                name,
                HealthStatus::Warn(format!(
                    "{} will be fetched from the Hugging Face Hub",
                    self.config.model.model_id
                )),
            ),
        }
    }

    fn check_bind_address(&self) -> HealthCheck {
        let name = "Bind Address";
        match self.config.server.bind.parse::<std::net::SocketAddr>() {
            Ok(_) => HealthCheck::new(name, HealthStatus::Pass),
            Err(e) => HealthCheck::new(
                name,
                HealthStatus::Fail(format!("invalid bind address {}: {}", self.config.server.bind, e)),
            ),
        }
    }

    fn check_artifacts(name: &str, catalog: &CatalogConfig) -> HealthCheck {
        let check_name = format!("Artifacts ({})", name);
        if !catalog.enabled {
            return HealthCheck::new(check_name, HealthStatus::Warn("catalog disabled".to_string()));
        }

        let paths = catalog.paths();
        let missing = paths.missing();
        if missing.is_empty() {
            HealthCheck::new(check_name, HealthStatus::Pass)
        } else {
            let names: Vec<String> = missing.iter().map(|p| display_name(p)).collect();
            HealthCheck::new(
                check_name,
                HealthStatus::Fail(format!(
                    "missing {} in {}",
                    names.join(", "),
                    paths.dir.display()
                )),
            )
        }
    }

    /// Metadata, index and raw embeddings must agree on rows and dimension
    fn check_consistency(name: &str, catalog: &CatalogConfig) -> HealthCheck {
        let check_name = format!("Consistency ({})", name);
        match inspect(&catalog.paths(), &catalog.id_column) {
            Ok(None) => HealthCheck::new(check_name, HealthStatus::Pass),
            Ok(Some(problem)) => HealthCheck::new(check_name, HealthStatus::Fail(problem)),
            Err(e) => HealthCheck::new(check_name, HealthStatus::Fail(format!("{:#}", e))),
        }
    }

    fn readiness(handle: &RetrieverHandle) -> HealthCheck {
        let name = format!("Readiness ({})", handle.catalog());
        let status = match handle.state() {
            ResourceState::Ready { .. } => HealthStatus::Pass,
            ResourceState::Unloaded => HealthStatus::Warn("not loaded, rules only".to_string()),
            ResourceState::Failed { reason } => HealthStatus::Fail(reason.clone()),
        };
        HealthCheck::new(name, status)
    }

    /// Display diagnostics results
    pub fn display_results(checks: &[HealthCheck]) {
        println!("\n{}\n", "Pre-Clear Diagnostics".bold());
        println!("{:<26} {}", "Check", "Status");
        println!("{}", "=".repeat(60));

        for check in checks {
            let status = match &check.status {
                HealthStatus::Pass => "PASS".green().to_string(),
                HealthStatus::Warn(msg) => format!("WARN: {}", msg).yellow().to_string(),
                HealthStatus::Fail(msg) => format!("FAIL: {}", msg).red().to_string(),
            };

            println!("{:<26} {}", check.name, status);
        }

        println!();
    }

    /// Get overall health status
    pub fn overall_status(checks: &[HealthCheck]) -> bool {
        !checks.iter().any(|c| matches!(c.status, HealthStatus::Fail(_)))
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn inspect(paths: &ArtifactPaths, id_column: &str) -> anyhow::Result<Option<String>> {
    let metadata = MetadataTable::load(&paths.metadata, id_column)?;
    let index = VectorIndex::load(&paths.index)?;
    let (raw_rows, raw_dim) = embeddings_shape(&paths.embeddings)?;

    if metadata.len() != index.len() || raw_rows != index.len() {
        return Ok(Some(format!(
            "row counts differ: metadata {}, index {}, embeddings {}",
            metadata.len(),
            index.len(),
            raw_rows
        )));
    }
    if raw_dim != index.dimension() {
        return Ok(Some(format!(
            "dimension differs: index {}, embeddings {}",
            index.dimension(),
            raw_dim
        )));
    }
    Ok(None)
}
