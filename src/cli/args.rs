//! Command-line argument parsing for Pre-Clear
//!
//! Provides clap-based CLI with subcommands and verbosity control. Flags
//! override the TOML configuration; the config path and bind address also
//! read from the environment.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Config;
use crate::types::{FreeTextQuery, StructuredQuery, DEFAULT_SUGGESTION_COUNT};

/// Pre-Clear - trade compliance document and HS code recommender
#[derive(Parser, Debug)]
#[command(name = "preclear")]
#[command(version)]
#[command(about = "Hybrid rules + semantic recommender for trade compliance documents and HS codes", long_about = None)]
pub struct Args {
    /// Configuration file path (defaults to ~/.preclear/config.toml)
    #[arg(short, long, env = "PRECLEAR_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// HS catalog artifact directory
    #[arg(long, global = true)]
    pub hs_dir: Option<PathBuf>,

    /// Document catalog artifact directory
    #[arg(long, global = true)]
    pub documents_dir: Option<PathBuf>,

    /// Local sentence-transformer directory (skips the Hugging Face Hub)
    #[arg(long, global = true)]
    pub model_dir: Option<PathBuf>,

    /// Rule table (TOML) replacing the built-in rules
    #[arg(long, global = true)]
    pub rules: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Verbosity level: -q (quiet), default (normal), -v (verbose), -vv (very verbose)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Subcommand
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Run the HTTP service
    Serve {
        /// Address to bind (host:port)
        #[arg(long, env = "PRECLEAR_BIND")]
        bind: Option<String>,
    },

    /// Suggest HS codes for a product
    Suggest {
        /// Product name
        #[arg(long, default_value = "")]
        name: String,

        /// Product category
        #[arg(long, default_value = "")]
        category: String,

        /// Product description
        #[arg(long, default_value = "")]
        description: String,

        /// Number of suggestions
        #[arg(short, long, default_value_t = DEFAULT_SUGGESTION_COUNT, allow_negative_numbers = true)]
        k: i64,
    },

    /// Recommend compliance documents for a shipment
    Recommend {
        #[arg(long, default_value = "")]
        origin: String,

        #[arg(long, default_value = "")]
        destination: String,

        #[arg(long, default_value = "")]
        hs_code: String,

        /// Goods are flagged in the harmonized tariff schedule
        #[arg(long)]
        hts: bool,

        #[arg(long, default_value = "")]
        category: String,

        #[arg(long, default_value = "")]
        description: String,

        #[arg(long, default_value = "")]
        package: String,

        /// Mode of transport (sea, air, road, ...)
        #[arg(long, default_value = "")]
        mode: String,
    },

    /// Load artifacts and report readiness
    Check,

    /// Display the effective configuration
    Config {
        /// Write the effective configuration to the config path
        #[arg(long)]
        init: bool,
    },
}

/// Verbosity level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    VeryVerbose,
}

impl Args {
    /// Get verbosity level based on flags
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::VeryVerbose,
            }
        }
    }

    /// Apply command-line overrides on top of the loaded configuration
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(dir) = &self.hs_dir {
            config.catalogs.hs.dir = dir.clone();
        }
        if let Some(dir) = &self.documents_dir {
            config.catalogs.documents.dir = dir.clone();
        }
        if let Some(dir) = &self.model_dir {
            config.model.local_dir = Some(dir.clone());
        }
        if let Some(path) = &self.rules {
            config.rules.path = Some(path.clone());
        }
        if let Commands::Serve { bind: Some(bind) } = &self.command {
            config.server.bind = bind.clone();
        }
    }
}

impl Commands {
    /// Free-text query for `suggest`
    pub fn free_text_query(&self) -> Option<FreeTextQuery> {
        match self {
            Commands::Suggest {
                name,
                category,
                description,
                k,
            } => Some(FreeTextQuery::new(
                name.as_str(),
                category.as_str(),
                description.as_str(),
                *k,
            )),
            _ => None,
        }
    }

    /// Structured query for `recommend`
    pub fn structured_query(&self) -> Option<StructuredQuery> {
        match self {
            Commands::Recommend {
                origin,
                destination,
                hs_code,
                hts,
                category,
                description,
                package,
                mode,
            } => Some(StructuredQuery {
                origin_country: origin.clone(),
                destination_country: destination.clone(),
                hs_code: hs_code.clone(),
                hts_flag: *hts,
                product_category: category.clone(),
                product_description: description.clone(),
                package_type_weight: package.clone(),
                mode_of_transport: mode.clone(),
            }),
            _ => None,
        }
    }
}

impl Verbosity {
    /// Default log level when `PRECLEAR_LOG` is unset
    pub fn log_level(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "error",
            Verbosity::Normal => "info",
            Verbosity::Verbose => "debug",
            Verbosity::VeryVerbose => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(parse(&["preclear", "-q", "check"]).verbosity(), Verbosity::Quiet);
        assert_eq!(parse(&["preclear", "check"]).verbosity(), Verbosity::Normal);
        assert_eq!(parse(&["preclear", "-v", "check"]).verbosity(), Verbosity::Verbose);
        assert_eq!(parse(&["preclear", "check", "-vv"]).verbosity(), Verbosity::VeryVerbose);
    }

    #[test]
    fn test_log_levels() {
        assert_eq!(Verbosity::Quiet.log_level(), "error");
        assert_eq!(Verbosity::Normal.log_level(), "info");
        assert_eq!(Verbosity::VeryVerbose.log_level(), "trace");
    }

    #[test]
    fn test_suggest_defaults_k() {
        let args = parse(&["preclear", "suggest", "--name", "bike"]);
        let query = args.command.free_text_query().unwrap();
        assert_eq!(query.name, "bike");
        assert_eq!(query.k, DEFAULT_SUGGESTION_COUNT);
        assert!(args.command.structured_query().is_none());
    }

    #[test]
    fn test_recommend_builds_structured_query() {
        let args = parse(&[
            "preclear", "recommend", "--origin", "US", "--mode", "sea", "--hts",
        ]);
        let query = args.command.structured_query().unwrap();
        assert_eq!(query.origin_country, "US");
        assert_eq!(query.mode_of_transport, "sea");
        assert!(query.hts_flag);
        assert!(query.product_category.is_empty());
    }

    #[test]
    fn test_overrides_apply_to_config() {
        let args = parse(&[
            "preclear",
            "--hs-dir",
            "/data/hs",
            "--model-dir",
            "/data/minilm",
            "serve",
            "--bind",
            "127.0.0.1:8001",
        ]);
        let mut config = Config::default();
        args.apply_overrides(&mut config);

        assert_eq!(config.catalogs.hs.dir, PathBuf::from("/data/hs"));
        assert_eq!(config.model.local_dir, Some(PathBuf::from("/data/minilm")));
        assert_eq!(config.server.bind, "127.0.0.1:8001");
        assert_eq!(config.catalogs.documents.dir, PathBuf::from("models/documents"));
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Args::try_parse_from(["preclear"]).is_err());
    }
}
