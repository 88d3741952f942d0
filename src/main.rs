// src/main.rs
// fixtrail - commit feature extraction and bug-fix labeling for git histories

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands, extract, tables};
use fixtrail::config::EnvConfig;
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Load .env files (global first, then project - project overrides)
    if let Some(home) = dirs::home_dir() {
        let _ = dotenvy::from_path(home.join(".fixtrail/.env"));
    }
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let env = EnvConfig::from_env();

    // Logs go to stderr so CSV and reports on stdout stay clean
    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level(&env))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = cli::load_config(cli.config.as_ref(), &env)?;

    match cli.command {
        Commands::Export {
            repo,
            out,
            range,
            with_message,
            strict,
            label,
        } => {
            if strict {
                config.extract.strict = true;
            }
            let range = cli::resolve_range(range.as_deref(), &env, &config)?;
            extract::run_export(&repo, &out, &range, with_message, label, &config)?;
        }
        Commands::Ortho {
            repo,
            out,
            range,
            policy,
        } => {
            let range = cli::resolve_range(range.as_deref(), &env, &config)?;
            extract::run_ortho(&repo, &out, &range, policy, &config)?;
        }
        Commands::Lifetimes { repo, out, range } => {
            let range = cli::resolve_range(range.as_deref(), &env, &config)?;
            extract::run_lifetimes(&repo, &out, &range, &config)?;
        }
        Commands::Volume { repo, out, tags } => {
            extract::run_volume(&repo, &out, &tags, &config)?;
        }
        Commands::Inspect { repo, range, json } => {
            let range = cli::resolve_range(range.as_deref(), &env, &config)?;
            extract::run_inspect(&repo, &range, json, &config)?;
        }
        Commands::MergeMessages {
            features,
            predictions,
            out,
        } => {
            tables::run_merge_messages(&features, &predictions, &out)?;
        }
        Commands::MergeLabels {
            predictions,
            labels,
            out,
        } => {
            tables::run_merge_labels(&predictions, &labels, &out)?;
        }
        Commands::Evaluate {
            labels,
            predictions,
            threshold,
        } => {
            tables::run_evaluate(&labels, &predictions, threshold)?;
        }
        Commands::Summary { features } => {
            tables::run_summary(&features)?;
        }
        Commands::Predictions { predictions, top } => {
            tables::run_predictions(&predictions, top)?;
        }
        Commands::ToolMentions {
            table,
            samples,
            high,
            low,
            seed,
        } => {
            tables::run_tool_mentions(&table, samples, high, low, seed, &config)?;
        }
    }

    Ok(())
}
