// src/cli/mod.rs
// CLI module for fixtrail commands

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fixtrail::config::{EnvConfig, FixtrailConfig};
use fixtrail::git::RevisionRange;
use fixtrail::labels::{LabelMode, ToolPolicy};
use fixtrail::table::evaluate::DEFAULT_THRESHOLD;
use fixtrail::table::tools::{DEFAULT_HIGH, DEFAULT_LOW, DEFAULT_SAMPLES, DEFAULT_SEED};
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{Level, debug};

pub mod extract;
pub mod tables;

#[derive(Parser)]
#[command(name = "fixtrail")]
#[command(about = "Commit feature extraction and bug-fix labeling for git histories")]
#[command(version)]
pub struct Cli {
    /// Config file (default: ~/.fixtrail/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Export the feature table of a revision range
    Export {
        /// Repository path
        repo: PathBuf,
        /// Output CSV
        out: PathBuf,
        /// Revision range (a, a..b or a...b)
        #[arg(short, long)]
        range: Option<String>,
        /// Append the stripped commit message as a column
        #[arg(long)]
        with_message: bool,
        /// Parse each diff and drop commits with few changed lines
        #[arg(long)]
        strict: bool,
        /// How commits are labeled
        #[arg(long, value_enum, default_value_t = LabelMode::Heuristic)]
        label: LabelMode,
    },

    /// Export commit_hash, label and tool_found from Fixes: cross-references
    Ortho {
        repo: PathBuf,
        out: PathBuf,
        #[arg(short, long)]
        range: Option<String>,
        /// Which fixer decides tool_found for a commit fixed more than once
        #[arg(long, value_enum, default_value_t = ToolPolicy::Last)]
        policy: ToolPolicy,
    },

    /// Export the days between each buggy commit and its fix
    Lifetimes {
        repo: PathBuf,
        out: PathBuf,
        #[arg(short, long)]
        range: Option<String>,
    },

    /// Export commit counts between consecutive release tags
    Volume {
        repo: PathBuf,
        out: PathBuf,
        /// Tags in release order (e.g. v6.0,v6.1,v6.2)
        #[arg(long, value_delimiter = ',', required = true, num_args = 1..)]
        tags: Vec<String>,
    },

    /// Print the features of the first informative commit
    Inspect {
        repo: PathBuf,
        #[arg(short, long)]
        range: Option<String>,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Left-join commit messages from a feature table onto predictions
    MergeMessages {
        /// Feature table exported with --with-message
        features: PathBuf,
        predictions: PathBuf,
        out: PathBuf,
    },

    /// Inner-join predictions with a label table
    MergeLabels {
        predictions: PathBuf,
        labels: PathBuf,
        out: PathBuf,
    },

    /// Score predictions against labels
    Evaluate {
        /// Table with commit_hash and label
        labels: PathBuf,
        /// Table with commit_hash and bugfix_probability
        predictions: PathBuf,
        /// Probability at which a commit counts as a predicted bug fix
        #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
        threshold: f64,
    },

    /// Summarize a feature table
    Summary { features: PathBuf },

    /// Summarize a prediction table
    Predictions {
        predictions: PathBuf,
        /// Number of top scoring commits to list
        #[arg(long, default_value_t = 20)]
        top: usize,
    },

    /// Count tool mentions among high and low scoring predictions
    ToolMentions {
        /// Predictions merged with messages
        table: PathBuf,
        #[arg(long, default_value_t = DEFAULT_SAMPLES)]
        samples: usize,
        #[arg(long, default_value_t = DEFAULT_HIGH)]
        high: f64,
        #[arg(long, default_value_t = DEFAULT_LOW)]
        low: f64,
        #[arg(long, default_value_t = DEFAULT_SEED)]
        seed: u64,
    },
}

impl Cli {
    /// Log level from -v/-q, then FIXTRAIL_LOG, then info
    pub fn log_level(&self, env: &EnvConfig) -> Level {
        if self.quiet {
            return Level::WARN;
        }
        match self.verbose {
            0 => env
                .log_level
                .as_deref()
                .and_then(|level| Level::from_str(level).ok())
                .unwrap_or(Level::INFO),
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }
}

/// Load config from --config, then FIXTRAIL_CONFIG, then the default location
pub fn load_config(cli_path: Option<&PathBuf>, env: &EnvConfig) -> Result<FixtrailConfig> {
    let path = cli_path.or(env.config_path.as_ref());
    let mut config = FixtrailConfig::load(path.map(PathBuf::as_path))
        .with_context(|| match path {
            Some(p) => format!("Failed to load config from {}", p.display()),
            None => "Failed to load default config".to_string(),
        })?;

    if let Some(strict) = env.strict {
        config.extract.strict = strict;
    }
    debug!(extract = ?config.extract, "Effective extraction config");
    Ok(config)
}

/// Range from the command line, then FIXTRAIL_RANGE, then the config file
pub fn resolve_range(arg: Option<&str>, env: &EnvConfig, config: &FixtrailConfig) -> Result<RevisionRange> {
    let spec = arg
        .or(env.range.as_deref())
        .unwrap_or(config.extract.range.as_str());
    RevisionRange::parse(spec).with_context(|| format!("Invalid revision range '{spec}'"))
}
