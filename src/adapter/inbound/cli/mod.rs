//! Command line surface.
//!
//! [`command`] declares the arguments; the handler modules run one command
//! each against a [`Gateway`](crate::infrastructure::bootstrap::Gateway).

pub mod command;
pub mod output;
pub mod query;
pub mod radian;
pub mod submit;

use std::path::Path;

use command::{Cli, Commands};

use crate::error::Result;
use crate::infrastructure::config::Config;

/// Configuration from `path` (plus environment), or from the environment alone.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the result is invalid.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path),
        None => Config::from_env(),
    }
}

/// Run the parsed command.
///
/// # Errors
///
/// Any batch-level or upstream error of the command.
pub async fn execute(cli: &Cli, config: &Config) -> Result<()> {
    match &cli.command {
        Commands::Submit(args) => submit::execute_submit(config, args).await,
        Commands::Transform(args) => submit::execute_transform(config, args),
        Commands::Token => query::execute_token(config).await,
        Commands::Resolutions(args) => query::execute_resolutions(config, args).await,
        Commands::Info(args) => query::execute_info(config, args).await,
        Commands::Search(args) => query::execute_search(config, args).await,
        Commands::Event(args) => radian::execute_event(config, args).await,
        Commands::Radian(command) => radian::execute(config, command).await,
    }
}
