#![warn(clippy::pedantic)]

use anyhow::Result;
use clap::Parser;
use payform_cli::commands::handle_command;
use payform_cli::state::{State, StateOptions};
use payform_cli::{utils, CLI};

#[tokio::main]
async fn main() -> Result<()> {
    // setup panic hook
    utils::set_hook();

    // create a new CLI instance
    let cli = CLI::parse();

    utils::logs(cli.verbose);

    let state = match State::new(StateOptions {
        override_api_url: cli.api_url,
    })
    .await
    {
        Ok(state) => state,
        Err(error) => {
            log::error!("{:#}", error);
            std::process::exit(1);
        }
    };

    if let Err(error) = handle_command(cli.commands, state).await {
        log::error!("{:#}", error);
        utils::clean_term();
        std::process::exit(1);
    }

    Ok(())
}
