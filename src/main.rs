// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 SpyEdge contributors

//! SpyEdge: AI-assisted ad intelligence
//!
//! Mines mock advertisement listings from a generative-AI collaborator,
//! filters and aggregates them locally, and produces per-ad marketing
//! analyses. Ships a web dashboard plus one-shot CLI commands.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use spyedge::catalog::{Ad, CategoryFilter, PlatformFilter, Region};
use spyedge::config::AppConfig;
use spyedge::export::{project_snapshot, write_snapshot};
use spyedge::gemini::GeminiClient;
use spyedge::intel::{GeminiIntel, IntelSource};
use spyedge::store::{AdStore, FetchStatus, Selection};
use spyedge::{Result, SpyEdgeError};

/// SpyEdge CLI - AI-assisted ad intelligence
#[derive(Parser, Debug)]
#[command(name = "spyedge")]
#[command(version = "0.1.0")]
#[command(about = "Mine, filter and analyze winning ads with AI", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (JSON format)
    #[arg(short, long, default_value = "config.json", global = true)]
    config: PathBuf,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable trace logging (most verbose)
    #[arg(long, global = true)]
    trace: bool,

    /// Output format for results
    #[arg(long, global = true, default_value = "text", value_parser = ["text", "json"])]
    format: String,

    /// Suppress non-essential output (quiet mode)
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the web dashboard
    Serve {
        /// Bind host (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Bind port (overrides config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Skip collaborator health check on startup
        #[arg(long)]
        skip_health_check: bool,
    },

    /// Mine a batch of ads and print them
    Mine {
        /// Search keyword (empty for discovery mode)
        query: Option<String>,

        /// Market scope
        #[arg(short, long, default_value = "nacional", value_parser = ["nacional", "internacional"])]
        region: String,

        /// Platform filter (ALL or a substring, e.g. TIKTOK)
        #[arg(long, default_value = "ALL")]
        platform: String,

        /// Category filter (ALL or an exact category)
        #[arg(long, default_value = "ALL")]
        category: String,
    },

    /// Mine ads, analyze one of them and optionally export the project
    Analyze {
        /// Search keyword (empty for discovery mode)
        query: Option<String>,

        /// Market scope
        #[arg(short, long, default_value = "nacional", value_parser = ["nacional", "internacional"])]
        region: String,

        /// Index of the mined ad to analyze
        #[arg(short, long, default_value = "0")]
        index: usize,

        /// Write the project snapshot to the export directory
        #[arg(long)]
        export: bool,

        /// Export directory override
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show collaborator status
    Status {
        /// Check a specific model instead of the configured one
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Initialize a new SpyEdge project
    Init {
        /// Directory to initialize (default: current)
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Force overwrite existing configuration
        #[arg(long)]
        force: bool,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Generate default configuration file
    Generate {
        /// Output file path
        #[arg(short, long, default_value = "config.json")]
        output: PathBuf,
    },

    /// Validate configuration file
    Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    if !cli.quiet {
        info!("SpyEdge v0.1.0 - AI-assisted ad intelligence");
    }

    // Load configuration
    let config = AppConfig::load(&cli.config)?;

    match cli.command {
        Some(Commands::Serve { host, port, skip_health_check }) => {
            run_serve(config, host, port, skip_health_check).await
        }
        Some(Commands::Mine { query, region, platform, category }) => {
            run_mine(config, query, &region, &platform, &category, &cli.format).await
        }
        Some(Commands::Analyze { query, region, index, export, output }) => {
            run_analyze(config, query, &region, index, export, output, &cli.format).await
        }
        Some(Commands::Status { model }) => {
            run_status(config, model).await
        }
        Some(Commands::Init { dir, force }) => {
            run_init(dir, force)
        }
        Some(Commands::Config { action }) => {
            run_config_command(config, action, &cli.config)
        }
        None => {
            // Default: run the dashboard
            run_serve(config, None, None, false).await
        }
    }
}

/// Build the production intel source, checking collaborator health first.
async fn build_intel(config: &AppConfig, skip_health_check: bool) -> Result<GeminiIntel> {
    let api_key = config.api_key()?;
    let client = GeminiClient::new(&config.collaborator, api_key)?;

    if !skip_health_check {
        info!("Checking collaborator availability...");
        client.health_check().await?;

        let model = &config.collaborator.model;
        if client.model_available(model).await.unwrap_or(false) {
            info!("Model '{}' available", model);
        } else {
            warn!("Model '{}' not listed by the collaborator", model);
        }
    }

    Ok(GeminiIntel::new(client, config))
}

/// Run the web dashboard
async fn run_serve(
    mut config: AppConfig,
    host: Option<String>,
    port: Option<u16>,
    skip_health_check: bool,
) -> Result<()> {
    if let Some(host) = host {
        config.web.host = host;
    }
    if let Some(port) = port {
        config.web.port = port;
    }

    let intel = build_intel(&config, skip_health_check).await?;
    spyedge::web::start_server(config, Arc::new(intel)).await
}

/// One-shot mining run sharing the store's degrade policy with the dashboard.
async fn mine_into_store(intel: &GeminiIntel, query: &str, region: Region) -> AdStore {
    let mut store = AdStore::new(region);
    let ticket = store.begin_search(query, region);
    let outcome = intel.mine_ads(query, region).await;
    store.commit_search(ticket, outcome);
    store
}

async fn run_mine(
    config: AppConfig,
    query: Option<String>,
    region: &str,
    platform: &str,
    category: &str,
    format: &str,
) -> Result<()> {
    let region: Region = region.parse()?;
    let intel = build_intel(&config, true).await?;
    let query = query.unwrap_or_default();

    let mut store = mine_into_store(&intel, &query, region).await;
    store.set_platform_filter(PlatformFilter::parse(platform));
    store.set_category_filter(CategoryFilter::parse(category));

    if store.search_status() == FetchStatus::Failed {
        warn!("Mining failed; showing an empty result set");
    }

    let visible = store.visible_ads();
    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&visible)?),
        _ => print_ads(&visible),
    }
    Ok(())
}

async fn run_analyze(
    config: AppConfig,
    query: Option<String>,
    region: &str,
    index: usize,
    export: bool,
    output: Option<PathBuf>,
    format: &str,
) -> Result<()> {
    let region: Region = region.parse()?;
    let intel = build_intel(&config, true).await?;
    let query = query.unwrap_or_default();

    let mut store = mine_into_store(&intel, &query, region).await;
    if store.ads().is_empty() {
        println!("No ads mined; nothing to analyze.");
        return Ok(());
    }

    let id = store
        .ads()
        .get(index)
        .map(|ad| ad.id.clone())
        .ok_or_else(|| {
            SpyEdgeError::Config(format!(
                "index {} out of range ({} ads mined)",
                index,
                store.ads().len()
            ))
        })?;

    let ticket = store.select(&id).ok_or_else(|| {
        SpyEdgeError::Config(format!("ad '{}' vanished from the store", id))
    })?;
    let outcome = intel.analyze_ad(&ticket.ad).await;
    store.commit_analysis(&ticket, outcome);

    match store.selection() {
        Selection::Ready { ad, analysis } => {
            if format == "json" {
                println!("{}", serde_json::to_string_pretty(&project_snapshot(ad, analysis))?);
            } else {
                print_analysis(ad, analysis);
            }
            if export {
                let dir = output.unwrap_or_else(|| PathBuf::from(&config.export.dir));
                let path = write_snapshot(&dir, ad, analysis)?;
                println!("\nExported: {:?}", path);
            }
        }
        _ => {
            println!("No analysis available for '{}'.", ticket.ad.title);
            if export {
                return Err(SpyEdgeError::ExportUnavailable);
            }
        }
    }
    Ok(())
}

async fn run_status(config: AppConfig, model: Option<String>) -> Result<()> {
    let api_key = config.api_key()?;
    let client = GeminiClient::new(&config.collaborator, api_key)?;

    match client.health_check().await {
        Ok(()) => println!("Collaborator: reachable at {}", config.collaborator.api_url),
        Err(e) => {
            println!("Collaborator: unreachable ({})", e);
            return Ok(());
        }
    }

    let target = model.as_deref().unwrap_or(&config.collaborator.model);
    match client.model_available(target).await {
        Ok(true) => println!("Model '{}': available", target),
        Ok(false) => println!("Model '{}': not listed", target),
        Err(e) => println!("Model '{}': check failed ({})", target, e),
    }
    Ok(())
}

fn run_init(dir: Option<PathBuf>, force: bool) -> Result<()> {
    let target = dir.unwrap_or_else(|| PathBuf::from("."));
    let config_path = target.join("config.json");

    if config_path.exists() && !force {
        return Err(SpyEdgeError::Config(format!(
            "{:?} already exists (use --force to overwrite)",
            config_path
        )));
    }

    std::fs::create_dir_all(&target)?;

    let config = AppConfig::default();
    config.save(&config_path)?;

    println!("SpyEdge initialized in {:?}", target);
    println!("\nCreated:");
    println!("  - config.json");
    println!("\nNext steps:");
    println!("  1. Export your API key: export {}=...", config.collaborator.api_key_env);
    println!("  2. Start the dashboard: spyedge serve");

    Ok(())
}

fn run_config_command(
    config: AppConfig,
    action: ConfigCommands,
    config_path: &std::path::Path,
) -> Result<()> {
    match action {
        ConfigCommands::Show => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
        ConfigCommands::Generate { output } => {
            AppConfig::default().save(&output)?;
            println!("Default configuration written to {:?}", output);
            Ok(())
        }
        ConfigCommands::Validate => {
            if config_path.exists() {
                AppConfig::load(config_path)?;
                println!("Configuration OK: {:?}", config_path);
            } else {
                println!("No config file at {:?}; defaults apply", config_path);
            }
            Ok(())
        }
    }
}

fn print_ads(ads: &[&Ad]) {
    if ads.is_empty() {
        println!("No ads to show.");
        return;
    }

    println!(
        "{:<4} {:<36} {:<14} {:<14} {:<8} {:>8} {:>10}",
        "#", "Title", "Platform", "Category", "Trend", "Likes", "Clicks"
    );
    for (i, ad) in ads.iter().enumerate() {
        println!(
            "{:<4} {:<36} {:<14} {:<14} {:<8} {:>8} {:>10}",
            i,
            truncate(&ad.title, 34),
            truncate(&ad.platform, 12),
            truncate(&ad.category, 12),
            ad.trend_score.as_str(),
            ad.metrics.likes,
            ad.metrics.estimated_clicks,
        );
    }
}

fn print_analysis(ad: &Ad, analysis: &spyedge::catalog::Analysis) {
    println!("=== {} ===", ad.title);
    println!("{}\n", analysis.analysis_text);

    if !analysis.improved_copies.is_empty() {
        println!("Suggested creatives:");
        for (slot, text) in &analysis.improved_copies {
            println!("  [{}] {}", slot, text);
        }
        println!();
    }

    if !analysis.targeting.interests.is_empty() {
        println!("Target interests: {}", analysis.targeting.interests.join(", "));
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}
