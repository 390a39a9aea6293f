//! gh-secrets - Declarative GitHub Actions repository secrets.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use gh_secrets::cli::output;
use gh_secrets::cli::{execute, Cli, LogFormat};
use gh_secrets::core::constants::LOG_ENV;
use gh_secrets::error::{ConfigError, Error};

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("gh_secrets=debug")
        } else {
            EnvFilter::new("gh_secrets=warn")
        }
    });

    let layer = match cli.log_format {
        LogFormat::Text => fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .without_time()
            .boxed(),
        LogFormat::Json => fmt::layer().json().with_writer(std::io::stderr).boxed(),
    };

    tracing_subscriber::registry().with(filter).with(layer).init();

    if let Err(e) = execute(cli) {
        let suggestion = match &e {
            Error::Config(ConfigError::NotFound(_)) => Some("create gh-secrets.toml or pass --file"),
            Error::Failed(_) => Some("run with --verbose for details"),
            _ => None,
        };

        output::error(&e.to_string());
        if let Some(hint) = suggestion {
            output::hint(hint);
        }
        std::process::exit(1);
    }
}
