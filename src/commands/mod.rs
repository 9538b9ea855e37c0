pub mod completions;
pub mod config;
pub mod pay;
pub mod validate;

use anyhow::Result;
use clap::Subcommand;

use crate::state::State;

#[derive(Debug, Subcommand)]
pub enum Commands {
    #[clap(name = "pay", alias = "new")]
    Pay(pay::Options),
    #[clap(name = "validate", alias = "check")]
    Validate(validate::Options),
    Config(config::Options),
    Completions(completions::Options),
}

pub async fn handle_command(command: Commands, state: State) -> Result<()> {
    match command {
        Commands::Pay(options) => pay::handle(options, state).await,
        Commands::Validate(options) => validate::handle(options, state).await,
        Commands::Config(options) => config::handle(options, state).await,
        Commands::Completions(options) => {
            completions::handle(options);
            Ok(())
        }
    }
}
