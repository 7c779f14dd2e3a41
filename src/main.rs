use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use copytune::agents::{CopyWriter, RandomEvaluator, Refiner};
use copytune::llm::{OpenAiClient, TextGenerator};
use copytune::optimizer::{OptimizationRun, Optimizer, OptimizerConfig};
use copytune::prompt::Template;

mod cli;
mod config;

use cli::Cli;
use cli::commands::Commands;
use config::Config;

/// `RUST_LOG` wins over the configured level when both are present
fn logger_builder(rust_log: Option<&str>, log_level: Option<&str>) -> env_logger::Builder {
    let mut builder = env_logger::Builder::new();
    if let Some(filters) = rust_log.filter(|f| !f.trim().is_empty()).or(log_level) {
        builder.parse_filters(filters);
    }
    builder
}

fn setup_logging(log_level: Option<&str>) -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("copytune")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("copytune.log");

    // Setup env_logger with file output
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    let rust_log = std::env::var("RUST_LOG").ok();
    logger_builder(rust_log.as_deref(), log_level)
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

/// Settings for one invocation after CLI overrides are applied to config
struct RunSettings {
    product: String,
    rounds: u32,
    count: usize,
    template: Template,
}

impl RunSettings {
    fn resolve(
        config: &Config,
        product: Option<&String>,
        rounds: Option<u32>,
        count: Option<usize>,
        template: Option<&String>,
    ) -> Self {
        let defaults = &config.optimizer;
        Self {
            product: product.unwrap_or(&defaults.product).clone(),
            rounds: rounds.unwrap_or(defaults.rounds),
            count: count.unwrap_or(defaults.copies_per_round),
            template: Template::new(template.unwrap_or(&defaults.template).as_str()),
        }
    }
}

async fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    info!("Starting application");

    if cli.is_verbose() {
        println!("{}", "Verbose mode enabled".yellow());
    }

    match &cli.command {
        None => {
            let settings = RunSettings::resolve(config, None, None, None, None);
            handle_optimize_command(settings, false, cli.is_verbose(), config).await
        }
        Some(Commands::Optimize {
            product,
            rounds,
            count,
            template,
            json,
        }) => {
            let settings = RunSettings::resolve(config, product.as_ref(), *rounds, *count, template.as_ref());
            handle_optimize_command(settings, *json, cli.is_verbose(), config).await
        }
        Some(Commands::Generate {
            product,
            count,
            template,
        }) => {
            let settings = RunSettings::resolve(config, product.as_ref(), None, *count, template.as_ref());
            handle_generate_command(settings, config).await
        }
    }
}

fn build_client(config: &Config) -> Result<Arc<OpenAiClient>> {
    let client = OpenAiClient::from_env(&config.llm.api_key_env, config.llm.to_client_config())
        .context("Failed to create text-generation client")?;
    ready_client(client, &config.llm.api_key_env)
}

fn ready_client<C: TextGenerator>(client: C, api_key_env: &str) -> Result<Arc<C>> {
    if !client.is_ready() {
        eyre::bail!("Text-generation client is not ready; check {}", api_key_env);
    }
    info!("Using model {}", client.model());
    Ok(Arc::new(client))
}

fn build_writer<C: TextGenerator>(client: Arc<C>, config: &Config) -> CopyWriter<C> {
    let writer = CopyWriter::new(client);
    match &config.writer.model {
        Some(model) => writer.with_model(model.clone()),
        None => writer,
    }
}

fn build_refiner<C: TextGenerator>(client: Arc<C>, config: &Config) -> Result<Refiner<C>> {
    let refiner = match &config.refiner.feedback_prompt {
        Some(prompt) => Refiner::with_feedback_prompt(client, prompt),
        None => Refiner::new(client),
    }
    .context("Invalid feedback prompt")?;

    Ok(match &config.refiner.model {
        Some(model) => refiner.with_model(model.clone()),
        None => refiner,
    })
}

async fn handle_optimize_command(settings: RunSettings, json: bool, verbose: bool, config: &Config) -> Result<()> {
    info!(
        "Optimizing template for {} over {} rounds ({} copies per round)",
        settings.product, settings.rounds, settings.count
    );

    let client = build_client(config)?;

    let evaluator = Arc::new(match config.evaluator.seed {
        Some(seed) => RandomEvaluator::with_seed(seed),
        None => RandomEvaluator::new(),
    });

    let optimizer = Optimizer::with_config(
        build_writer(client.clone(), config),
        evaluator,
        build_refiner(client.clone(), config)?,
        OptimizerConfig {
            copies_per_round: settings.count,
        },
    );

    let run = optimizer
        .run(&settings.product, settings.template, settings.rounds)
        .await
        .context("Optimization failed")?;

    let usage = client.total_usage();
    info!(
        "Token usage: {} total ({} input, {} output)",
        usage.total(),
        usage.input_tokens,
        usage.output_tokens
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&run)?);
        return Ok(());
    }

    if verbose {
        print_rounds(&run);
    }

    println!("{}", "Final optimized prompt:".green());
    println!("{}", run.final_template);
    Ok(())
}

fn print_rounds(run: &OptimizationRun) {
    for record in &run.rounds {
        println!(
            "{} {} ({}ms)",
            "Round".cyan(),
            record.round.to_string().cyan(),
            record.elapsed_ms
        );
        for candidate in &record.candidates {
            let score = record.scores.get(candidate).copied().unwrap_or_default();
            println!("  {:.3}  {}", score, candidate);
        }
        println!("  {} {}", "Best:".green(), record.best_copy);
        println!("  {} {}", "Refined:".yellow(), record.refined);
    }

    println!("{} candidates scored", run.total_candidates());
    if let Some((copy, score)) = run.best_overall() {
        println!("{} {:.3}  {}", "Best overall:".green(), score, copy);
    }
}

async fn handle_generate_command(settings: RunSettings, config: &Config) -> Result<()> {
    info!("Generating {} copies for {}", settings.count, settings.product);

    let writer = build_writer(build_client(config)?, config);
    let copies = writer
        .generate(&settings.product, &settings.template, settings.count)
        .await
        .context("Generation failed")?;

    for copy in copies {
        println!("- {}", copy);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration; it carries the log level
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    setup_logging(config.log_level.as_deref()).context("Failed to setup logging")?;

    info!("Starting with config from: {:?}", cli.config);

    // Run the main application logic
    run_application(&cli, &config).await.context("Application failed")?;

    Ok(())
}
