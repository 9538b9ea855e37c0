mod utils;

use anyhow::{ensure, Result};
use clap::{Parser, Subcommand};

use self::utils::format_context;
use crate::state::State;
use crate::store::context::Context;
use crate::store::Store;

#[derive(Debug, Parser)]
#[clap(about = "Set the URL of the payment API")]
#[group(skip)]
pub struct ApiUrlOptions {
    #[clap(help = "Base URL, `/pay` is appended to it")]
    pub url: String,
}

#[derive(Debug, Parser)]
#[clap(about = "Set the currency used when none is given")]
#[group(skip)]
pub struct CurrencyOptions {
    #[clap(help = "Currency code, e.g. `EUR`")]
    pub currency: String,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    #[clap(name = "show", alias = "ls", about = "Print the stored settings")]
    Show,
    #[clap(name = "set-api-url")]
    SetApiUrl(ApiUrlOptions),
    #[clap(name = "set-currency")]
    SetCurrency(CurrencyOptions),
    #[clap(about = "Forget every stored setting")]
    Reset,
}

#[derive(Debug, Parser)]
#[clap(about = "Manage stored settings")]
#[group(skip)]
pub struct Options {
    #[clap(subcommand)]
    pub commands: Commands,
}

pub async fn handle(options: Options, mut state: State) -> Result<()> {
    match options.commands {
        Commands::Show => {
            println!("{}", format_context(&state.ctx)?.join("\n"));
        }

        Commands::SetApiUrl(options) => {
            let url = reqwest::Url::parse(options.url.trim())?;

            ensure!(
                matches!(url.scheme(), "http" | "https"),
                "API URL must use http or https"
            );

            state.ctx.api_url = Some(url.as_str().trim_end_matches('/').to_string());
            state.ctx.save().await?;

            log::info!("API URL set to `{}`", url);
        }

        Commands::SetCurrency(options) => {
            let currency = options.currency.trim().to_string();

            ensure!(!currency.is_empty(), "Currency is required");

            state.ctx.default_currency = Some(currency.clone());
            state.ctx.save().await?;

            log::info!("Default currency set to `{currency}`");
        }

        Commands::Reset => {
            Context::default().save().await?;

            log::info!("Settings reset");
        }
    }

    Ok(())
}
