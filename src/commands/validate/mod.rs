use anyhow::{bail, Result};
use clap::Parser;

use crate::commands::pay::registry::FieldRegistry;
use crate::commands::pay::rules::validate;
use crate::commands::pay::utils::{render_errors, FieldArgs};
use crate::state::State;

#[derive(Debug, Parser)]
#[clap(about = "Check payment details without sending them")]
#[group(skip)]
pub struct Options {
    #[clap(flatten)]
    pub fields: FieldArgs,
}

pub async fn handle(options: Options, state: State) -> Result<()> {
    let mut registry = FieldRegistry::payment_form(state.ctx.currency());
    options.fields.apply(&mut registry)?;

    match validate(&registry.values()) {
        Ok(request) => {
            log::info!("Payment details are valid, this would be sent:");

            println!("{}", serde_json::to_string_pretty(&request.masked())?);

            Ok(())
        }

        Err(errors) => {
            render_errors(&registry, &errors);

            bail!(
                "Found {} invalid field{}",
                errors.len(),
                if errors.len() == 1 { "" } else { "s" }
            )
        }
    }
}
