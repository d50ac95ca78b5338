//! return-predictor CLI - rank forecast stock returns from a CSV of daily bars
//!
//! ## Example Usage
//!
//! ```bash
//! # Rank predicted returns
//! return-predictor predict prices.csv --model model.json --scaler scaler.json -o ranked.csv
//!
//! # Dump engineered features
//! return-predictor features prices.csv -o features.csv
//!
//! # Show configuration and feature layout
//! return-predictor info
//! ```

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use return_predictor::config::PipelineConfig;
use return_predictor::data::{write_features, write_results_path, CsvBarReader};
use return_predictor::error::PredictorError;
use return_predictor::pipeline::{
    engineer_features, format_results, predict_windows, FeatureEngineer, InferenceContext,
    LinearSequenceModel, ResultSet, StandardScaler,
};
use return_predictor::types::{Feature, ROLLING_HORIZONS};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process;
use std::time::{Duration, Instant};

/// return-predictor: rank forecast stock returns
#[derive(Parser)]
#[command(name = "return-predictor")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Rank forecast stock returns from daily price bars", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Predict and rank returns for every stock/date with enough history
    Predict {
        /// CSV with columns Date, Stock, Open, High, Low, Close, Volume
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Model artifact (JSON), required; overrides the config file
        #[arg(short = 'm', long)]
        model: Option<PathBuf>,

        /// Fitted scaler artifact (JSON), required; overrides the config file
        #[arg(short = 's', long)]
        scaler: Option<PathBuf>,

        /// Output CSV for ranked predictions
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Include close, log return and simple return columns in the output
        #[arg(long)]
        detailed: bool,

        /// Number of top-ranked rows to print
        #[arg(short = 'n', long)]
        top: Option<usize>,
    },

    /// Write engineered features to CSV
    Features {
        /// CSV with columns Date, Stock, Open, High, Low, Close, Volume
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output CSV (stdout when omitted)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },

    /// Show configuration and feature layout
    Info,
}

/// Load configuration from a TOML file, falling back to defaults
fn load_config(path: Option<&Path>) -> PipelineConfig {
    let candidate = match path {
        Some(p) => Some(p.to_path_buf()),
        None => dirs::home_dir().map(|home| home.join(".return-predictor").join("config.toml")),
    };

    if let Some(config_path) = candidate {
        if config_path.exists() {
            match fs::read_to_string(&config_path) {
                Ok(contents) => match toml::from_str(&contents) {
                    Ok(config) => return config,
                    Err(e) => {
                        eprintln!("{} Failed to parse config: {}", "Warning:".yellow(), e);
                    }
                },
                Err(e) => {
                    eprintln!("{} Failed to read config: {}", "Warning:".yellow(), e);
                }
            }
        } else if path.is_some() {
            eprintln!(
                "{} Config file not found: {}",
                "Warning:".yellow(),
                config_path.display()
            );
        }
    }

    PipelineConfig::default()
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref());
    if let Err(e) = config.validate() {
        eprintln!("{} {}", "Error:".red().bold(), e);
        process::exit(1);
    }

    if cli.verbose {
        println!(
            "{} v{}",
            "return-predictor".cyan().bold(),
            env!("CARGO_PKG_VERSION")
        );
    }

    let min_rows = FeatureEngineer::new().min_raw_rows() + config.window_size;

    let result = match cli.command {
        Commands::Predict {
            input,
            model,
            scaler,
            output,
            detailed,
            top,
        } => run_predict(PredictConfig {
            input,
            model,
            scaler,
            output,
            detailed,
            top,
            verbose: cli.verbose,
            config,
        }),

        Commands::Features { input, output } => run_features(&input, output.as_deref(), &config),

        Commands::Info => show_info(&config),
    };

    if let Err(e) = result {
        if let Some(PredictorError::InsufficientData { .. }) = e.downcast_ref::<PredictorError>() {
            eprintln!("{} {}", "Warning:".yellow().bold(), e);
            eprintln!(
                "{}",
                format!("  Each stock needs at least {} daily rows to be predicted.", min_rows)
                    .dimmed()
            );
            process::exit(2);
        }
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

struct PredictConfig {
    input: PathBuf,
    model: Option<PathBuf>,
    scaler: Option<PathBuf>,
    output: Option<PathBuf>,
    detailed: bool,
    top: Option<usize>,
    verbose: bool,
    config: PipelineConfig,
}

fn spinner(message: &str) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(message.to_string());
    Ok(pb)
}

fn run_predict(cfg: PredictConfig) -> Result<()> {
    let started = Instant::now();

    let model_path = cfg
        .model
        .or(cfg.config.model_path.clone())
        .context("No model artifact given (use --model or set model_path in the config)")?;
    let scaler_path = cfg
        .scaler
        .or(cfg.config.scaler_path.clone())
        .context("No scaler artifact given (use --scaler or set scaler_path in the config)")?;
    let scaler = StandardScaler::load(&scaler_path)
        .with_context(|| format!("Failed to load scaler {}", scaler_path.display()))?;
    let model = LinearSequenceModel::load(&model_path)
        .with_context(|| format!("Failed to load model {}", model_path.display()))?;

    let context = InferenceContext::new(&scaler, &model);
    if context.window_size() != cfg.config.window_size {
        bail!(
            "Model expects windows of {} steps but the configured window size is {}",
            context.window_size(),
            cfg.config.window_size
        );
    }

    let pb = spinner("Reading input...")?;
    let rows = CsvBarReader::with_format(cfg.config.csv.clone())
        .read_path(&cfg.input)
        .with_context(|| format!("Failed to read {}", cfg.input.display()))?;

    pb.set_message("Engineering features...");
    let frame = engineer_features(&rows)?;

    pb.set_message("Predicting...");
    let forecast = predict_windows(&frame, &context);
    pb.finish_and_clear();
    let forecast = forecast?;

    let ranked = format_results(
        &frame.encoding,
        &forecast.targets,
        &forecast.predicted_log_returns,
    )?;

    if cfg.verbose {
        println!("  {} {}", "Input rows:".bold(), rows.len());
        println!("  {} {}", "Stocks:".bold(), frame.encoding.len());
        println!("  {} {}", "Feature rows:".bold(), frame.len());
        println!("  {} {}", "Model:".bold(), model.name);
        println!();
    }

    print_ranking(&ranked, cfg.top.unwrap_or(cfg.config.top_n));

    if let Some(output) = cfg.output {
        write_results_path(&ranked, &output, cfg.detailed)?;
        println!(
            "{} Predictions saved to: {}",
            "✓".green().bold(),
            output.display()
        );
    }

    if cfg.verbose {
        println!(
            "{}",
            format!("Finished in {:.2?}", started.elapsed()).dimmed()
        );
    }

    Ok(())
}

fn print_ranking(ranked: &ResultSet, top: usize) {
    println!("{}", "Predicted Returns".green().bold());
    println!("{}", "=================".green());

    for (i, r) in ranked.top(top).iter().enumerate() {
        let percent = format!("{:+.3}%", r.predicted_return_percent);
        let percent = if r.predicted_return >= 0.0 {
            percent.bright_green()
        } else {
            percent.red()
        };
        println!("  {:>3}. {}  {:<10} {}", i + 1, r.date, r.stock, percent);
    }
    if ranked.len() > top {
        println!(
            "{}",
            format!("  ... {} more", ranked.len() - top).dimmed()
        );
    }
    println!();

    if let Some(summary) = ranked.summary() {
        println!(
            "  {} {}",
            "Max Return (%):".bold(),
            format!("{:.2}", summary.max_return_percent).bright_green()
        );
        println!(
            "  {} {}",
            "Min Return (%):".bold(),
            format!("{:.2}", summary.min_return_percent).red()
        );
        println!("  {} {}", "Predictions:".bold(), summary.count);
        println!();
    }
}

fn run_features(input: &Path, output: Option<&Path>, config: &PipelineConfig) -> Result<()> {
    let rows = CsvBarReader::with_format(config.csv.clone())
        .read_path(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let frame = engineer_features(&rows)?;

    match output {
        Some(path) => {
            write_features(&frame, File::create(path)?)?;
            println!(
                "{} {} feature rows saved to: {}",
                "✓".green().bold(),
                frame.len(),
                path.display()
            );
        }
        None => write_features(&frame, std::io::stdout().lock())?,
    }

    Ok(())
}

fn show_info(config: &PipelineConfig) -> Result<()> {
    println!(
        "{} {}",
        "return-predictor".cyan().bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("{}", env!("CARGO_PKG_DESCRIPTION"));
    println!();

    println!("{}", "Configuration".bold());
    println!("{}", "=============".dimmed());
    println!("  {} {}", "Window size:".bold(), config.window_size);
    println!("  {} {}", "Top N:".bold(), config.top_n);
    println!(
        "  {} {}",
        "Model:".bold(),
        path_or_unset(config.model_path.as_deref())
    );
    println!(
        "  {} {}",
        "Scaler:".bold(),
        path_or_unset(config.scaler_path.as_deref())
    );
    println!(
        "  {} {}",
        "Input columns:".bold(),
        config.csv.columns().join(", ")
    );
    println!("  {} {}", "Date format:".bold(), config.csv.date_format);
    println!();

    println!("{}", "Features".bold());
    println!("{}", "========".dimmed());
    let names: Vec<&str> = Feature::ALL.iter().map(|f| f.name()).collect();
    println!("  {} {}", "Columns:".bold(), names.join(", "));
    println!("  {} {:?}", "Rolling horizons:".bold(), ROLLING_HORIZONS);
    println!(
        "  {} {}",
        "Min rows per stock:".bold(),
        FeatureEngineer::new().min_raw_rows() + config.window_size
    );
    println!();

    Ok(())
}

fn path_or_unset(path: Option<&Path>) -> String {
    path.map(|p| p.display().to_string())
        .unwrap_or_else(|| "(not set)".to_string())
}
