pub mod commands;
pub mod config;
pub mod state;
pub mod store;
pub mod utils;

use clap::Parser;
use commands::Commands;

#[derive(Debug, Parser)]
#[clap(
    name = "payform",
    about = "💳 Collect and submit payments from the command line",
    version,
    author
)]
pub struct CLI {
    #[clap(subcommand)]
    pub commands: Commands,

    #[clap(
        long = "api-url",
        help = "Base URL of the payment API, overrides the environment and stored settings",
        global = true
    )]
    pub api_url: Option<String>,

    #[clap(
        short = 'v',
        long = "verbose",
        help = "Print more information",
        global = true
    )]
    pub verbose: bool,
}
