//! Leverage Loop Simulator - Main Entry Point
//!
//! Runs single scenarios, the scenario battery, or an interactive prompt.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use leverage_loop_sim::config::Config;
use leverage_loop_sim::report::{build_sinks, render_summary, ReportSink};
use leverage_loop_sim::simulation::{
    builtin_scenarios, load_scenarios, parse_amount, Scenario, ScenarioRunner, SimulationEngine,
};
use leverage_loop_sim::utils::decimal::to_percent;
use rust_decimal::Decimal;
use std::io::{BufRead, Write};
use tracing::{info, Level};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

/// Leverage Loop Simulator CLI
#[derive(Parser)]
#[command(name = "leverage-loop-sim")]
#[command(version, about = "Iterative collateralized-lending leverage simulator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate a single position
    Run {
        /// Initial deposited collateral
        #[arg(long)]
        collateral: Decimal,

        /// Initial borrowed debt
        #[arg(long, default_value = "0")]
        debt: Decimal,

        /// Initial free cash in the wallet
        #[arg(long, default_value = "0")]
        cash: Decimal,

        /// Collateral goal
        #[arg(long)]
        target_collateral: Decimal,

        /// Cash goal (omit for no cash goal)
        #[arg(long)]
        target_cash: Option<Decimal>,

        /// Output directory for report files
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Run a scenario battery (built-in battery by default)
    Batch {
        /// JSON file with an array of scenarios
        #[arg(short, long)]
        scenarios: Option<String>,

        /// Number of scenarios simulated concurrently
        #[arg(short, long, default_value = "4")]
        parallelism: usize,

        /// Output directory for report files
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Enter a scenario interactively
    Prompt {
        /// Output directory for report files
        #[arg(short, long)]
        output: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging()?;

    let mut config = Config::load()?;
    config.validate()?;
    log_config(&config);

    match cli.command {
        Commands::Run {
            collateral,
            debt,
            cash,
            target_collateral,
            target_cash,
            output,
        } => {
            let scenario = Scenario {
                name: "command line".to_string(),
                initial_collateral: collateral,
                initial_debt: debt,
                initial_cash: cash,
                target_collateral,
                target_cash,
            };
            if output.is_some() {
                config.report.output_dir = output;
            }
            run_single(&config, &scenario)
        }
        Commands::Batch {
            scenarios,
            parallelism,
            output,
        } => {
            if output.is_some() {
                config.report.output_dir = output;
            }
            run_batch(&config, scenarios.as_deref(), parallelism).await
        }
        Commands::Prompt { output } => {
            let scenario = prompt_scenario()?;
            if output.is_some() {
                config.report.output_dir = output;
            }
            run_single(&config, &scenario)
        }
    }
}

/// Initialize logging to stdout and a rolling file.
fn init_logging() -> Result<()> {
    use tracing_subscriber::fmt::writer::MakeWriterExt;

    std::fs::create_dir_all("logs")?;

    let file_appender = tracing_appender::rolling::daily("logs", "leverage-loop-sim.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    // Keep the writer alive for the program duration
    Box::leak(Box::new(guard));

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("leverage_loop_sim=debug".parse()?)
                .add_directive(Level::INFO.into()),
        )
        .with_writer(std::io::stdout.and(file_writer))
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
        .init();

    Ok(())
}

/// Log configuration on startup.
fn log_config(config: &Config) {
    info!("📋 Configuration:");
    info!("   Target LTV: {:.2}%", to_percent(config.strategy.target_ltv));
    info!("   Max LTV (risk): {:.2}%", to_percent(config.strategy.max_ltv_risk));
    info!("   Fee Rate: {:.4}%", to_percent(config.strategy.fee_rate));
    match &config.report.output_dir {
        Some(dir) => info!("   Report Directory: {}", dir),
        None => info!("   Report Directory: (log only)"),
    }
}

/// Simulate one scenario and report it.
fn run_single(config: &Config, scenario: &Scenario) -> Result<()> {
    let (position, targets) = scenario
        .validate()
        .with_context(|| format!("Invalid scenario '{}'", scenario.name))?;

    let engine = SimulationEngine::new(config.strategy.clone());
    let report = engine.run(position, targets);

    let mut sinks = build_sinks(&config.report)?;
    sinks.record(&scenario.name, &report)?;
    sinks.finish()?;

    println!("{}", render_summary(&report.summary));
    Ok(())
}

/// Simulate a scenario battery and report every run.
async fn run_batch(config: &Config, scenario_file: Option<&str>, parallelism: usize) -> Result<()> {
    let scenarios = match scenario_file {
        Some(path) => {
            info!("📊 Loading scenarios from: {}", path);
            load_scenarios(path)?
        }
        None => builtin_scenarios(),
    };

    info!("--- Starting battery of {} scenarios ---", scenarios.len());

    let runner = ScenarioRunner::new(config.strategy.clone(), parallelism);
    let batch = runner.run(scenarios).await?;

    let mut sinks = build_sinks(&config.report)?;
    batch.publish(&mut sinks)?;

    println!("\n{}", batch.summary());
    Ok(())
}

/// Read the five scenario fields from stdin.
fn prompt_scenario() -> Result<Scenario> {
    println!("{}", "=".repeat(60));
    println!("LEVERAGE LOOP SIMULATOR");
    println!("{}\n", "=".repeat(60));

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    let mut ask = |label: &str| -> Result<String> {
        print!("{}", label);
        std::io::stdout().flush()?;
        let line = lines.next().context("Unexpected end of input")??;
        Ok(line)
    };

    let collateral = parse_amount("initial_collateral", &ask("Initial collateral: ")?)?;
    let debt = parse_amount("initial_debt", &ask("Initial debt: ")?)?;
    let cash = parse_amount("initial_cash", &ask("Wallet cash available: ")?)?;
    let target_collateral = parse_amount("target_collateral", &ask("Target collateral: ")?)?;

    let raw_target_cash = ask("Target wallet cash (optional, Enter for none): ")?;
    let target_cash = if raw_target_cash.trim().is_empty() {
        None
    } else {
        Some(parse_amount("target_cash", &raw_target_cash)?)
    };

    Ok(Scenario {
        name: "interactive".to_string(),
        initial_collateral: collateral,
        initial_debt: debt,
        initial_cash: cash,
        target_collateral,
        target_cash,
    })
}
