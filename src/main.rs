//! Command-line entry point for poker-elo
//!
//! Loads the session table, runs the rating engine over every session in
//! order, writes the history exports and prints the final ranking.

use anyhow::Result;
use clap::Parser;
use poker_elo::config::{validate_config, AppConfig, CsvLayout, KFactorMode};
use poker_elo::io::{
    load_sessions, write_history_csv, write_history_plot, write_report_json, LoaderOptions,
};
use poker_elo::types::RankingEntry;
use poker_elo::{RatingEngine, RatingError};
use std::path::PathBuf;
use tracing::{error, info, warn};

/// Poker ELO - profit-aware ratings for recurring poker sessions
#[derive(Parser)]
#[command(
    name = "poker-elo",
    version,
    about = "Calculate poker ELO ratings from session results",
    long_about = "Reads a CSV of session results (one row per session, one column per player), \
                 turns every session into pairwise virtual matches and updates ELO ratings with \
                 a K-factor that grows with the profit gap. Writes the rating history as CSV, \
                 a JSON summary and an SVG chart."
)]
struct Args {
    /// Session results CSV
    #[arg(short, long, value_name = "FILE", help = "Input CSV file with poker results")]
    input: Option<PathBuf>,

    /// History CSV destination
    #[arg(long, value_name = "FILE", help = "Output CSV file for rating history")]
    output_csv: Option<PathBuf>,

    /// JSON report destination
    #[arg(long, value_name = "FILE", help = "Output JSON file for ratings")]
    output_json: Option<PathBuf>,

    /// Chart destination
    #[arg(long, value_name = "FILE", help = "Output SVG file for the rating chart")]
    output_plot: Option<PathBuf>,

    /// Skip the chart
    #[arg(long, help = "Do not draw the rating chart")]
    no_plot: bool,

    /// History CSV layout
    #[arg(long, value_name = "LAYOUT", help = "History CSV layout (wide, long)")]
    csv_layout: Option<CsvLayout>,

    /// Configuration file path
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Initial rating override
    #[arg(long, value_name = "RATING", help = "Rating assigned on a player's first session")]
    initial_rating: Option<f64>,

    /// K base override
    #[arg(long, value_name = "K", help = "Baseline K-factor")]
    k_base: Option<f64>,

    /// Reference magnitude override
    #[arg(
        long,
        value_name = "AMOUNT",
        help = "Profit gap treated as a typical swing"
    )]
    reference_magnitude: Option<f64>,

    /// K-factor mode override
    #[arg(
        long,
        value_name = "MODE",
        help = "K-factor mode (clamped, session_relative)"
    )]
    k_mode: Option<KFactorMode>,

    /// Drop sessions with fewer than two results
    #[arg(long, help = "Skip rows with fewer than two results instead of failing")]
    skip_sparse_rows: bool,

    /// Disable exports
    #[arg(long, help = "Do not write CSV/JSON/chart output")]
    no_export: bool,

    /// Log level override
    #[arg(
        short,
        long,
        value_name = "LEVEL",
        help = "Override log level (trace, debug, info, warn, error)"
    )]
    log_level: Option<String>,

    /// Enable debug mode
    #[arg(short, long, help = "Enable debug mode with per-match logging")]
    debug: bool,

    /// Dry run mode (validate config and exit)
    #[arg(long, help = "Validate configuration and exit without rating")]
    dry_run: bool,
}

/// Initialize structured logging with the configured level
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_target(false)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Display startup banner with run information
fn display_startup_banner(config: &AppConfig) {
    info!("♠ {} {}", config.service.name, poker_elo::VERSION);
    info!("   Input: {}", config.input.path.display());
    info!(
        "   K: base {} ({} mode), reference gap {}, scale {}..{}",
        config.rating.k_base,
        config.rating.k_mode,
        config.rating.reference_magnitude,
        config.rating.min_k_scale,
        config.rating.max_k_scale
    );
    info!("   Initial rating: {}", config.rating.initial_rating);
    if config.output.enabled {
        info!(
            "   Output: {} ({}), {}",
            config.output.csv_path.display(),
            config.output.csv_layout,
            config.output.json_path.display()
        );
        if config.output.plot {
            info!("   Chart: {}", config.output.plot_path.display());
        }
    } else {
        info!("   Output: disabled");
    }
}

/// Load and merge configuration from environment, file and CLI arguments
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(config_path) => AppConfig::from_file(config_path)?,
        None => AppConfig::from_env()?,
    };

    // Apply CLI overrides
    if let Some(input) = &args.input {
        config.input.path = input.clone();
    }
    if let Some(path) = &args.output_csv {
        config.output.csv_path = path.clone();
    }
    if let Some(path) = &args.output_json {
        config.output.json_path = path.clone();
    }
    if let Some(path) = &args.output_plot {
        config.output.plot_path = path.clone();
    }
    if args.no_plot {
        config.output.plot = false;
    }
    if let Some(layout) = args.csv_layout {
        config.output.csv_layout = layout;
    }
    if let Some(initial_rating) = args.initial_rating {
        config.rating.initial_rating = initial_rating;
    }
    if let Some(k_base) = args.k_base {
        config.rating.k_base = k_base;
    }
    if let Some(reference_magnitude) = args.reference_magnitude {
        config.rating.reference_magnitude = reference_magnitude;
    }
    if let Some(k_mode) = args.k_mode {
        config.rating.k_mode = k_mode;
    }
    if args.skip_sparse_rows {
        config.input.skip_sparse_rows = true;
    }
    if args.no_export {
        config.output.enabled = false;
    }
    if let Some(log_level) = &args.log_level {
        config.service.log_level = log_level.clone();
    }
    if args.debug {
        config.service.log_level = "debug".to_string();
    }

    validate_config(&config)?;
    Ok(config)
}

fn print_rankings(title: &str, rankings: &[RankingEntry]) {
    println!("\n{}:", title);
    for entry in rankings {
        println!(
            "{}. {}: {:.2} ({} sessions)",
            entry.rank, entry.player, entry.rating, entry.sessions_played
        );
    }
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load configuration (CLI args can override environment/config file)
    let config = load_config(&args).unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    });

    // Initialize logging early (before any other operations)
    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    if args.dry_run {
        info!("Configuration validation successful");
        display_startup_banner(&config);
        info!("Dry run completed - exiting without rating");
        return Ok(());
    }

    display_startup_banner(&config);

    let table = load_sessions(
        &config.input.path,
        &LoaderOptions {
            skip_sparse_rows: config.input.skip_sparse_rows,
        },
    )?;
    if table.sessions.is_empty() {
        warn!("No sessions found in {}", config.input.path.display());
    }

    let mut engine = RatingEngine::with_config(config.rating.clone())?;
    if let Err(e) = engine.run(&table.sessions) {
        error!("Rating run failed: {}", e);
        if let Some(index) = e
            .downcast_ref::<RatingError>()
            .and_then(RatingError::session_index)
        {
            error!(
                "Fix session {} (row {} after the header) and re-run; nothing was exported",
                index,
                index + 1
            );
        }
        print_rankings(
            &format!(
                "Partial ratings before the failure ({} sessions, not final)",
                engine.sessions_processed()
            ),
            &engine.ranking(),
        );
        std::process::exit(1);
    }

    if config.output.enabled {
        let view = engine.view();
        write_history_csv(&view, config.output.csv_layout, &config.output.csv_path)?;
        write_report_json(&view.report(), &config.output.json_path)?;
        if config.output.plot {
            write_history_plot(&view, &config.output.plot_path)?;
        }
    }

    print_rankings("Final Poker ELO Rankings", &engine.ranking());
    Ok(())
}
