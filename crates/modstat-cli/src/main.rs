//! # modstat
//!
//! Measures how much of an npm author's weekly download traffic goes to
//! ESM versions of their packages versus CommonJS ones.
//!
//! This is the main entry point for the modstat CLI tool. It handles command
//! parsing, sets up logging and error handling, and dispatches to the
//! appropriate command handlers.

use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use modstat_core::error::{ModstatError, ModstatResult};
use tracing::{debug, error};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod output;

use commands::{CommandContext, CommandOutcome};
use output::errors::ErrorFormatter;

/// ESM vs CommonJS download share for npm authors
#[derive(Parser, Debug)]
#[command(name = "modstat", version, about = "ESM vs CommonJS download share for npm authors")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Flags accepted by every command
#[derive(clap::Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit log lines as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Configuration file to use instead of the nearest modstat.toml
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<Utf8PathBuf>,

    /// Root directory of the result cache
    #[arg(long, global = true, value_name = "DIR")]
    pub cache_dir: Option<Utf8PathBuf>,

    /// Number of packages analyzed at once
    #[arg(short = 'j', long, global = true, value_name = "N")]
    pub concurrency: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Summarize every package published by an author
    Summarize {
        /// npm username
        author: String,
        /// Also print the ESM and CommonJS rankings
        #[arg(long)]
        top: bool,
        /// Number of packages in each ranking; negative takes the bottom
        #[arg(long, value_name = "N", allow_negative_numbers = true)]
        top_n: Option<isize>,
        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the per-version breakdown of one package
    Package {
        /// Package name, scoped names included
        name: String,
    },
    /// Delete cached results
    Clean {
        /// Only delete cached download statistics
        #[arg(long)]
        stats: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.global.verbose, cli.global.log_json);
    setup_panic_handler();

    debug!("Starting modstat v{}", env!("CARGO_PKG_VERSION"));

    match run_cli(cli) {
        Ok(CommandOutcome::Success) => ExitCode::SUCCESS,
        Ok(CommandOutcome::PartialFailure) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("{}", ErrorFormatter::new().format_error(&err));
            ExitCode::FAILURE
        }
    }
}

fn run_cli(cli: Cli) -> ModstatResult<CommandOutcome> {
    // Create Tokio runtime for async operations
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| ModstatError::io("Failed to create async runtime".to_string(), e))?;

    rt.block_on(async move {
        let top_n = match &cli.command {
            Commands::Summarize { top_n, .. } => *top_n,
            _ => None,
        };
        let ctx = CommandContext::load(&cli.global, top_n).await?;
        commands::dispatch_command(cli.command, &ctx).await
    })
}

fn setup_logging(verbose: bool, json: bool) {
    let level = if verbose { "debug" } else { "info" };

    // RUST_LOG wins over --verbose
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,modstat={level},modstat_analyzer={level},modstat_registry={level},\
             modstat_cache={level},modstat_config={level}"
        ))
    });

    let subscriber = tracing_subscriber::registry().with(filter);
    if json {
        subscriber
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}

fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|panic_info| {
        error!("modstat encountered an unexpected error: {}", panic_info);
        eprintln!("modstat crashed! This is a bug.");
        eprintln!("Please report this at: https://github.com/modstat/modstat/issues");
        eprintln!("Error: {}", panic_info);
    }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_summarize_with_globals() {
        let cli = Cli::try_parse_from([
            "modstat",
            "summarize",
            "sindresorhus",
            "--top",
            "--top-n",
            "-5",
            "--cache-dir",
            "/tmp/modstat",
            "-j",
            "4",
        ])
        .unwrap();

        match cli.command {
            Commands::Summarize { author, top, top_n, json } => {
                assert_eq!(author, "sindresorhus");
                assert!(top);
                assert_eq!(top_n, Some(-5));
                assert!(!json);
            }
            other => panic!("Expected summarize, got {:?}", other),
        }
        assert_eq!(cli.global.cache_dir, Some(Utf8PathBuf::from("/tmp/modstat")));
        assert_eq!(cli.global.concurrency, Some(4));
    }

    #[test]
    fn test_parse_clean_and_package() {
        let cli = Cli::try_parse_from(["modstat", "clean", "--stats", "--verbose"]).unwrap();
        assert!(matches!(cli.command, Commands::Clean { stats: true }));
        assert!(cli.global.verbose);

        let cli = Cli::try_parse_from(["modstat", "package", "@scope/pkg"]).unwrap();
        assert!(matches!(cli.command, Commands::Package { ref name } if name == "@scope/pkg"));
    }

    #[test]
    fn test_summarize_requires_author() {
        assert!(Cli::try_parse_from(["modstat", "summarize"]).is_err());
    }
}
