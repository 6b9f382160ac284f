//! Pre-Clear - Main CLI Entry Point

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use preclear::{
    bootstrap::AppResources,
    cli::{Args, Commands},
    config::Config,
    doctor::Doctor,
    scoring::HybridScorer,
    server::{self, AppState},
    telemetry::{self, LogFormat},
    types::SuggestResponse,
};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    telemetry::init_tracing(
        LogFormat::from_flag(args.log_json),
        args.verbosity().log_level(),
    );

    let mut config = match (&args.command, args.config.as_deref()) {
        (Commands::Config { init: true }, Some(path)) if !path.exists() => Config::default(),
        (_, path) => Config::load(path)?,
    };
    args.apply_overrides(&mut config);

    match &args.command {
        Commands::Serve { .. } => {
            run_server(config).await?;
        }
        Commands::Suggest { .. } => {
            run_suggest(&args, config).await?;
        }
        Commands::Recommend { .. } => {
            run_recommend(&args, config).await?;
        }
        Commands::Check => {
            run_check(config).await?;
        }
        Commands::Config { init } => {
            show_config(&args, &config, *init)?;
        }
    }

    Ok(())
}

/// Load rules and catalogs off the async runtime
async fn load_resources(config: &Config) -> Result<AppResources> {
    let config = config.clone();
    let resources = tokio::task::spawn_blocking(move || AppResources::load(&config))
        .await
        .context("resource loading task failed")??;
    Ok(resources)
}

async fn run_server(config: Config) -> Result<()> {
    let resources = load_resources(&config).await?;
    let state = AppState::new(&resources, &config);
    server::serve(&config.server.bind, state).await
}

async fn run_suggest(args: &Args, config: Config) -> Result<()> {
    let query = args
        .command
        .free_text_query()
        .context("suggest requires a free-text query")?;

    let resources = load_resources(&config).await?;
    let retriever = resources.hs_retriever();
    if !retriever.is_ready() {
        eprintln!(
            "{} HS catalog is {}; no suggestions available",
            "warning:".yellow(),
            retriever.handle().state().label()
        );
    }

    let k = query.limit();
    let fields = vec![query.name, query.category, query.description];
    let matches = retriever.search_blocking(fields, k).await;
    let response = SuggestResponse::from(matches);
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

async fn run_recommend(args: &Args, config: Config) -> Result<()> {
    let query = args
        .command
        .structured_query()
        .context("recommend requires a structured query")?;

    // Fail fast without loading the model
    HybridScorer::validate(&query)?;

    let resources = load_resources(&config).await?;
    let scorer = resources.scorer(&config);
    let recommendation = scorer.recommend_blocking(query).await?;
    println!("{}", serde_json::to_string_pretty(&recommendation)?);
    Ok(())
}

async fn run_check(config: Config) -> Result<()> {
    let doctor = Doctor::new(config.clone());
    let mut checks = doctor.run_diagnostics();

    let resources = load_resources(&config).await?;
    checks.extend(Doctor::check_readiness(&resources));

    Doctor::display_results(&checks);

    std::process::exit(if Doctor::overall_status(&checks) { 0 } else { 1 });
}

fn show_config(args: &Args, config: &Config, init: bool) -> Result<()> {
    let path = match &args.config {
        Some(path) => path.clone(),
        None => Config::config_path()?,
    };

    if init {
        if path.exists() {
            anyhow::bail!("{} already exists", path.display());
        }
        config.save(&path)?;
        println!("{} {}", "Wrote".green(), path.display());
        return Ok(());
    }

    println!("# {}", path.display());
    println!("{}", toml::to_string_pretty(config).context("Failed to serialize config")?);
    Ok(())
}
