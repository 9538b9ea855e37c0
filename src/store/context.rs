use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tokio::fs::{self, File};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use super::utils::home_path;
use super::Storable;
use crate::config::{CONTEXT_STORE_PATH, DEFAULT_CURRENCY};
use crate::impl_store;

/// User level settings that survive between runs.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct Context {
    /// Base URL of the payment API, used when neither the flag nor the env var is set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_currency: Option<String>,
}

impl Storable for Context {
    fn path() -> Result<PathBuf> {
        home_path(CONTEXT_STORE_PATH)
    }
}

impl Context {
    pub fn currency(&self) -> &str {
        self.default_currency.as_deref().unwrap_or(DEFAULT_CURRENCY)
    }
}

impl_store!(Context);

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_currency_falls_back_to_eur() {
        assert_eq!(Context::default().currency(), "EUR");

        let ctx = Context {
            default_currency: Some("USD".to_string()),
            ..Default::default()
        };

        assert_eq!(ctx.currency(), "USD");
    }

    #[test]
    fn test_empty_fields_are_not_written() {
        let json = serde_json::to_string(&Context::default()).unwrap();

        assert_eq!(json, "{}");
    }
}
