pub mod types;

use anyhow::{anyhow, Context, Result};
use reqwest::header::HeaderMap;
use reqwest::{Client as AsyncClient, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use self::types::{Base, ErrorResponse};
use crate::config::VERSION;

#[derive(Debug, Clone)]
pub struct HttpClient {
    pub client: AsyncClient,
    /// `None` when no API URL was configured, every request fails before touching the network.
    pub base_url: Option<String>,
    pub ua: String,
}

impl HttpClient {
    pub fn new(api_url: Option<String>) -> Result<Self> {
        let mut headers = HeaderMap::new();

        headers.insert("accept", "application/json".parse()?);

        let ua = format!(
            "payform/{VERSION} on {}",
            sys_info::os_type().unwrap_or_else(|_| "unknown".to_string())
        );

        let base_url = api_url
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty());

        Ok(Self {
            client: AsyncClient::builder()
                .user_agent(ua.clone())
                .default_headers(headers)
                .build()
                .context("Failed to build HTTP client")?,
            base_url,
            ua,
        })
    }

    pub fn base_url(&self) -> Result<&str> {
        self.base_url
            .as_deref()
            .ok_or_else(|| anyhow!("API URL is not defined"))
    }

    pub async fn handle_response<T>(&self, response: reqwest::Response) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let status = response.status();

        if !status.is_success() {
            return self.handle_error(response, status).await;
        }

        let body = response.text().await?;

        log::debug!("response body: {body}");

        serde_json::from_str::<Base<T>>(&body)
            .map(|base| base.data)
            .map_err(|e| anyhow!("Malformed response: {e}"))
    }

    async fn handle_error<T>(&self, response: reqwest::Response, status: StatusCode) -> Result<T> {
        let body = response.json::<ErrorResponse>().await;

        match body {
            Ok(body) => Err(anyhow!("{}", body.error.message)),
            Err(err) => {
                log::debug!("Error deserialize message: {:#?}", err);

                Err(anyhow!("Error: HTTP {}", status))
            }
        }
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url()?, path);

        // bodies can carry card data, callers log a redacted form themselves
        log::debug!("request: POST {}", url);

        let request = self.client.post(url).json(body).build()?;

        #[cfg(debug_assertions)]
        let now = tokio::time::Instant::now();

        let response = self.client.execute(request).await?;

        #[cfg(debug_assertions)]
        log::debug!("response in: {:#?}", now.elapsed());

        self.handle_response(response).await
    }
}
