use std::io::Write;

use anyhow::{anyhow, Result};
use tabwriter::TabWriter;

use crate::config::DEFAULT_CURRENCY;
use crate::store::context::Context;

pub fn format_context(ctx: &Context) -> Result<Vec<String>> {
    let mut tw = TabWriter::new(vec![]);

    writeln!(&mut tw, "SETTING\tVALUE")?;

    writeln!(
        &mut tw,
        "api_url\t{}",
        ctx.api_url.as_deref().unwrap_or("-")
    )?;

    writeln!(
        &mut tw,
        "default_currency\t{}",
        ctx.default_currency
            .as_deref()
            .unwrap_or(&format!("- ({DEFAULT_CURRENCY})"))
    )?;

    let out = String::from_utf8(
        tw.into_inner()
            .map_err(|e| anyhow!("Failed to format settings: {e}"))?,
    )?
        .lines()
        .map(std::string::ToString::to_string)
        .collect();

    Ok(out)
}
