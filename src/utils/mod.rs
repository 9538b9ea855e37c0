pub mod browser;

use anyhow::{Context, Result};
use console::style;
use fern::colors::{Color, ColoredLevelConfig};
use log::{Level, LevelFilter};
use serde::Serialize;

pub fn set_hook() {
    // setup a panic hook to easily exit the program on panic
    std::panic::set_hook(Box::new(|panic_info| {
        // print the panic message
        let message = if let Some(message) = panic_info.payload().downcast_ref::<String>() {
            message.clone()
        } else if let Some(message) = panic_info.payload().downcast_ref::<&str>() {
            (*message).to_string()
        } else {
            format!("{panic_info:?}")
        };

        // add some color
        log::error!("{message}");

        #[cfg(debug_assertions)]
        log::debug!("{panic_info}");

        clean_term();

        std::process::exit(1);
    }));
}

pub fn clean_term() {
    let term = console::Term::stdout();

    // dialoguer hides the cursor while prompting, give it back
    if term.is_term() {
        term.show_cursor().ok();
    }
}

pub fn logs(verbose: bool) {
    let colors = ColoredLevelConfig::new()
        .info(Color::BrightCyan)
        .error(Color::BrightRed)
        .warn(Color::BrightYellow)
        .debug(Color::BrightWhite);

    fern::Dispatch::new()
        .format(move |out, message, record| {
            let level = record.level();

            match level {
                Level::Debug => out.finish(format_args!(
                    "{} [{}]: {}",
                    colors.color(Level::Debug).to_string().to_lowercase(),
                    record.target(),
                    message
                )),

                level => out.finish(format_args!(
                    "{}: {}",
                    colors.color(level).to_string().to_lowercase(),
                    message
                )),
            }
        })
        .level(if verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        // hyper is chatty at debug level
        .level_for("hyper", LevelFilter::Info)
        .chain(
            fern::Dispatch::new()
                .filter(|metadata| !matches!(metadata.level(), Level::Error | Level::Warn))
                .chain(std::io::stdout()),
        )
        .chain(
            fern::Dispatch::new()
                .level(log::LevelFilter::Warn)
                .chain(std::io::stderr()),
        )
        .apply()
        .ok();
}

pub fn ask_question_iter<T>(prompt: &str, choices: &[T], override_default: Option<T>) -> Result<T>
where
    T: PartialEq + Clone + Serialize + Default,
{
    let choices_txt = choices
        .iter()
        .map(|c| Ok(serde_json::to_string(c)?.replace('"', "")))
        .collect::<Result<Vec<String>>>()?;

    let to_compare = override_default.unwrap_or_default();

    let choice = dialoguer::Select::new()
        .with_prompt(prompt)
        .default(
            choices
                .iter()
                .position(|x| x == &to_compare)
                .unwrap_or_default(),
        )
        .items(&choices_txt)
        .interact()
        .context("Failed to read selection")?;

    Ok(choices[choice].clone())
}

pub fn urlify(s: &str) -> String {
    style(s).bold().underlined().to_string()
}
