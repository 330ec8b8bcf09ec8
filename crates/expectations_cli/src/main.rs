mod commands;
mod loader;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "expectations")]
#[command(version, about = "Tabular data validation for the housing pipeline", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a CSV file with a pipeline stage suite
    Validate {
        /// Path to the CSV file
        data: String,

        /// Stage: raw, engineered, test, preprocessed, monitor
        #[arg(short, long, default_value = "raw")]
        stage: String,

        /// Do not expect the target column
        #[arg(long)]
        no_target: bool,

        /// Expected number of columns (preprocessed stage)
        #[arg(long)]
        expected_features: Option<usize>,

        /// Settings file overriding the default bounds (YAML or TOML)
        #[arg(long)]
        settings: Option<String>,

        /// Only validate the first N rows
        #[arg(long)]
        sample: Option<usize>,

        /// Output format: text, json
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Validate a CSV file with a suite loaded from a file
    Run {
        /// Path to the suite file (YAML or TOML)
        suite: String,

        /// Path to the CSV file
        data: String,

        /// Settings file (only `parallelism` applies to custom suites)
        #[arg(long)]
        settings: Option<String>,

        /// Output format: text, json
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Print the rules a stage suite evaluates
    Suite {
        /// Stage: raw, engineered, test, preprocessed, monitor
        stage: String,

        /// Do not expect the target column
        #[arg(long)]
        no_target: bool,

        /// Expected number of columns (preprocessed stage)
        #[arg(long)]
        expected_features: Option<usize>,

        /// Settings file overriding the default bounds (YAML or TOML)
        #[arg(long)]
        settings: Option<String>,

        /// Output format: text, json
        #[arg(short, long, default_value = "text")]
        format: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    // Reports go to stdout; logs to stderr.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(true)
                .compact(),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    match cli.command {
        Commands::Validate {
            data,
            stage,
            no_target,
            expected_features,
            settings,
            sample,
            format,
        } => commands::validate::execute(
            &data,
            &stage,
            !no_target,
            expected_features,
            settings.as_deref(),
            sample,
            &format,
        ),

        Commands::Run {
            suite,
            data,
            settings,
            format,
        } => commands::run::execute(&suite, &data, settings.as_deref(), &format),

        Commands::Suite {
            stage,
            no_target,
            expected_features,
            settings,
            format,
        } => commands::suite::execute(
            &stage,
            !no_target,
            expected_features,
            settings.as_deref(),
            &format,
        ),
    }
}
