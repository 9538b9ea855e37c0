pub mod checkout;
pub mod registry;
pub mod rules;
pub mod types;
pub mod utils;

use anyhow::{bail, Context, Result};
use clap::Parser;

use self::checkout::{
    display_checkout, CheckoutOutcome, CheckoutView, HttpFrameInspector, SystemBrowser,
};
use self::registry::FieldRegistry;
use self::rules::validate;
use self::types::PaymentRequest;
use self::utils::{fill_form, render_errors, submit_payment, FieldArgs};
use crate::config::{API_URL_ENV, EXEC_NAME};
use crate::state::State;
use crate::utils::browser::serve_checkout_frame;
use crate::utils::urlify;

const CHECKOUT_TIMEOUT_MIN: u16 = 30;

#[derive(Debug, Parser)]
#[clap(about = "Fill in a payment and open its checkout")]
#[group(skip)]
pub struct Options {
    #[clap(flatten)]
    pub fields: FieldArgs,

    #[clap(
        long = "no-interactive",
        help = "Do not prompt, fail if the given fields are invalid"
    )]
    pub no_interactive: bool,

    #[clap(long = "no-browser", help = "Print the checkout URL instead of opening it")]
    pub no_browser: bool,
}

pub async fn handle(options: Options, state: State) -> Result<()> {
    let interactive = !options.no_interactive && !state.is_ci;

    let mut registry = FieldRegistry::payment_form(state.ctx.currency());
    options.fields.apply(&mut registry)?;

    let request = collect_request(&mut registry, interactive)?;

    let checkout_url = loop {
        match submit_payment(&state.http, &request).await {
            Ok(url) => break url,

            Err(error) if state.http.base_url.is_none() => {
                bail!(
                    "{error}. Use `--api-url`, set `{API_URL_ENV}` or run `{EXEC_NAME} config set-api-url`"
                );
            }

            Err(error) if !interactive => return Err(error.context("Payment failed")),

            Err(error) => {
                log::error!("Payment failed: {error}");

                let again = dialoguer::Confirm::new()
                    .with_prompt("Submit the payment again?")
                    .default(false)
                    .interact()?;

                if !again {
                    return Ok(());
                }
            }
        }
    };

    // nothing about the payment is kept once it has been sent
    drop(request);
    registry.reset();

    let mut view = CheckoutView::default();
    view.show(checkout_url);

    if options.no_browser {
        if let Some(url) = view.checkout_url() {
            println!("{url}");
        }

        return Ok(());
    }

    let inspector = HttpFrameInspector::new(
        reqwest::Client::builder()
            .user_agent(state.http.ua.clone())
            .build()
            .context("Failed to build HTTP client")?,
    );

    if let CheckoutOutcome::Embed(url) = display_checkout(&mut view, &inspector, &SystemBrowser).await
    {
        log::info!("Checkout ready at {}", urlify(&url));

        serve_checkout_frame(&url, CHECKOUT_TIMEOUT_MIN, &SystemBrowser).await?;
    }

    Ok(())
}

/// Runs the form until it validates, or once when not interactive.
fn collect_request(registry: &mut FieldRegistry, interactive: bool) -> Result<PaymentRequest> {
    loop {
        if interactive {
            fill_form(registry)?;
        }

        match validate(&registry.values()) {
            Ok(request) => {
                registry.clear_errors();

                return Ok(request);
            }

            Err(errors) => {
                registry.apply_errors(&errors);

                if !interactive {
                    render_errors(registry, &errors);

                    bail!("Invalid payment details");
                }

                log::warn!("Please fix the highlighted fields");
            }
        }
    }
}
