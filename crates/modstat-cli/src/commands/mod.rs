//! Command implementations and dispatch logic.
//!
//! Each command is an async function taking the shared [`CommandContext`].

use std::sync::Arc;

use modstat_analyzer::{Summarizer, VersionAnalyzer};
use modstat_cache::MemoStore;
use modstat_config::{CliOverrides, Config, ConfigLoader};
use modstat_core::error::ModstatResult;
use modstat_registry::RegistryClient;
use tracing::{debug, info};

pub mod clean;
pub mod package;
pub mod summarize;


use crate::{output::OutputHandler, Commands, GlobalArgs};

/// How a command finished when it did not fail outright
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Success,
    /// Some packages could not be analyzed
    PartialFailure,
}

/// Shared context for all commands
pub struct CommandContext {
    pub config: Config,
    pub output: OutputHandler,
}

impl CommandContext {
    /// Resolve configuration from files, environment and flags
    pub async fn load(global: &GlobalArgs, top_n: Option<isize>) -> ModstatResult<Self> {
        let loader = ConfigLoader::from_current_dir()?;
        let overrides = CliOverrides {
            cache_dir: global.cache_dir.clone(),
            concurrency: global.concurrency,
            top: top_n,
        };
        let (config, source) = loader.load(global.config.as_ref(), &overrides).await?;
        debug!("using {:?} with cache at {}", source, config.cache_dir);

        Ok(Self::new(config))
    }

    /// Context over an already resolved configuration
    pub fn new(config: Config) -> Self {
        Self {
            config,
            output: OutputHandler::new(),
        }
    }

    pub fn store(&self) -> MemoStore {
        MemoStore::new(&self.config.cache_dir)
    }

    pub fn analyzer(&self) -> ModstatResult<VersionAnalyzer> {
        let client = RegistryClient::with_options(self.config.client_options())?;
        Ok(VersionAnalyzer::new(Arc::new(client), Arc::new(self.store())))
    }

    pub fn summarizer(&self) -> ModstatResult<Summarizer> {
        Ok(Summarizer::new(self.analyzer()?)
            .with_concurrency(self.config.concurrency)
            .with_top_n(self.config.top_n))
    }
}

/// Dispatch a command to its handler
pub async fn dispatch_command(command: Commands, ctx: &CommandContext) -> ModstatResult<CommandOutcome> {
    match command {
        Commands::Summarize { author, top, json, .. } => {
            info!("Summarizing packages by {}", author);
            summarize::execute(&author, top, json, ctx).await
        }
        Commands::Package { name } => {
            info!("Analyzing {}", name);
            package::execute(&name, ctx).await
        }
        Commands::Clean { stats } => clean::execute(stats, ctx).await,
    }
}
