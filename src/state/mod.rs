pub mod http;

use anyhow::Result;

use self::http::HttpClient;
use crate::config::API_URL_ENV;
use crate::store::context::Context;
use crate::store::Store;

#[derive(Debug)]
pub struct State {
    pub is_ci: bool,
    pub ctx: Context,
    pub http: HttpClient,
}

pub struct StateOptions {
    pub override_api_url: Option<String>,
}

impl State {
    pub async fn new(options: StateOptions) -> Result<Self> {
        let ctx = Context::new().await?;

        // flag first, then the environment, then whatever is stored
        let api_url = options
            .override_api_url
            .or_else(|| std::env::var(API_URL_ENV).ok())
            .or_else(|| ctx.api_url.clone());

        let http = HttpClient::new(api_url)?;

        Ok(State {
            is_ci: Self::check_if_ci(),
            http,
            ctx,
        })
    }

    /// Checks if the current environment is a CI environment.
    fn check_if_ci() -> bool {
        std::env::vars().any(|(key, _)| {
            matches!(
                key.as_str(),
                "BUILD_NUMBER"
                    | "CONTINUOUS_INTEGRATION"
                    | "GITLAB_CI"
                    | "CIRCLECI"
                    | "APPVEYOR"
                    | "RUN_ID"
                    | "CI"
            )
        })
    }
}
