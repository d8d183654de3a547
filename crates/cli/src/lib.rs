pub mod commands;

use clap::{Parser, Subcommand};
use haggle_core::config::{ClassifierProvider, LoadOptions};
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "haggle",
    about = "Haggle operator CLI",
    long_about = "Inspect configuration, check readiness, and run one-off negotiations against the configured models.",
    after_help = "Examples:\n  haggle doctor --json\n  haggle config\n  haggle negotiate --price 100 --message \"I can offer 80, seems fair\""
)]
pub struct Cli {
    #[arg(long, global = true, help = "Read this TOML file instead of haggle.toml (must exist)")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, model credentials, and classifier backend readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Run a single negotiation exchange and print the JSON reply")]
    Negotiate {
        #[arg(long, help = "Base price of the product")]
        price: Decimal,
        #[arg(long, help = "Free-text message containing the user's offer")]
        message: String,
        #[arg(long, help = "Sentiment backend for this run (hosted|lexicon)")]
        classifier: Option<ClassifierProvider>,
        #[arg(long, help = "Gemini model for this run")]
        model: Option<String>,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    // A missing .env file is normal outside local development.
    let _ = dotenvy::dotenv();

    let options = LoadOptions {
        require_file: cli.config.is_some(),
        config_path: cli.config,
        ..LoadOptions::default()
    };

    let result = match cli.command {
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run(&options) }
        }
        Command::Doctor { json } => commands::doctor::run(&options, json),
        Command::Negotiate { price, message, classifier, model } => {
            let mut options = options;
            options.overrides.classifier_provider = classifier;
            options.overrides.llm_model = model;
            commands::negotiate::run(options, price, &message)
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
