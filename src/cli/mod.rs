//! Command-line interface.

pub mod completions;
pub mod destroy;
pub mod output;
pub mod refresh;
pub mod seal;
pub mod sync;
pub mod validate;

use std::future::Future;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::warn;

use crate::core::config::Settings;
use crate::core::constants::{DECLARATIONS_FILE, DEFAULT_API_URL, STATE_FILE};
use crate::core::reconciler::Reconciler;
use crate::core::store::GitHubStore;
use crate::core::sync::Mode;
use crate::error::Result;

/// gh-secrets - Declarative GitHub Actions repository secrets.
#[derive(Parser)]
#[command(
    name = "gh-secrets",
    about = "Declarative GitHub Actions repository secrets",
    version
)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log output format
    #[arg(long, value_enum, global = true, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// API token (anonymous requests when unset)
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true, global = true)]
    pub token: Option<String>,

    /// Base URL of the GitHub REST API
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL, global = true)]
    pub api_url: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output formats.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Command {
    /// Check declarations without contacting GitHub
    Validate {
        /// Declarations file
        #[arg(short, long, default_value = DECLARATIONS_FILE)]
        file: PathBuf,
    },

    /// Show what apply would change
    Plan {
        /// Declarations file
        #[arg(short, long, default_value = DECLARATIONS_FILE)]
        file: PathBuf,
        /// State file
        #[arg(short, long, default_value = STATE_FILE)]
        state: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create, recreate and delete secrets to match the declarations
    Apply {
        /// Declarations file
        #[arg(short, long, default_value = DECLARATIONS_FILE)]
        file: PathBuf,
        /// State file
        #[arg(short, long, default_value = STATE_FILE)]
        state: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Re-read tracked secrets and forget drifted or deleted ones
    Refresh {
        /// State file
        #[arg(short, long, default_value = STATE_FILE)]
        state: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete every tracked secret
    Destroy {
        /// State file
        #[arg(short, long, default_value = STATE_FILE)]
        state: PathBuf,
        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Seal a value to a repository public key and print the ciphertext
    Seal {
        /// Base64 repository public key
        #[arg(short, long)]
        key: String,
        /// Value to seal (read from stdin when omitted)
        #[arg(long)]
        value: Option<String>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completions.
#[derive(ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

/// Execute a command.
pub fn execute(cli: Cli) -> Result<()> {
    use Command::*;

    let Cli {
        command,
        token,
        api_url,
        ..
    } = cli;

    match command {
        Validate { file } => validate::execute(&file),
        Plan { file, state, json } => {
            let reconciler = reconciler(&api_url, token)?;
            block_on(sync::execute(&reconciler, &file, &state, Mode::Plan, json))
        }
        Apply { file, state, json } => {
            let reconciler = reconciler(&api_url, token)?;
            block_on(sync::execute(&reconciler, &file, &state, Mode::Apply, json))
        }
        Refresh { state, json } => {
            let reconciler = reconciler(&api_url, token)?;
            block_on(refresh::execute(&reconciler, &state, json))
        }
        Destroy { state, yes } => {
            let reconciler = reconciler(&api_url, token)?;
            block_on(destroy::execute(&reconciler, &state, yes))
        }
        Seal { key, value } => seal::execute(&key, value),
        Completions { shell } => completions::execute(shell),
    }
}

fn reconciler(api_url: &str, token: Option<String>) -> Result<Reconciler<GitHubStore>> {
    let settings = Settings::new(api_url, token)?;
    Ok(Reconciler::new(GitHubStore::new(&settings)?))
}

fn block_on<F>(future: F) -> Result<()>
where
    F: Future<Output = Result<()>>,
{
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?
        .block_on(future)
}

/// Run `future` until it completes or Ctrl-C arrives.
///
/// On interrupt the future is dropped, releasing whatever it borrowed, and
/// `None` is returned. Nothing is retried.
pub(crate) async fn until_interrupted<F: Future>(future: F) -> Option<F::Output> {
    tokio::select! {
        output = future => Some(output),
        Ok(()) = tokio::signal::ctrl_c() => {
            warn!("interrupted, saving completed work");
            None
        }
    }
}
