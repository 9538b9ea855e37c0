use anyhow::Result;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, CONTENT_SECURITY_POLICY, X_FRAME_OPTIONS};

use crate::utils::urlify;

/// What the user is looking at after a submission.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CheckoutView {
    #[default]
    NoCheckout,
    Embedded {
        url: String,
    },
    /// Embedding failed and the checkout was handed to the browser.
    Abandoned {
        url: String,
    },
}

impl CheckoutView {
    pub fn show(&mut self, url: impl Into<String>) {
        *self = CheckoutView::Embedded { url: url.into() };
    }

    /// Drops the embedded checkout, returning the URL to open externally.
    ///
    /// Only an embedded checkout can be abandoned, so a URL is handed out at
    /// most once per `show`.
    pub fn abandon(&mut self) -> Option<String> {
        match std::mem::take(self) {
            CheckoutView::Embedded { url } => {
                *self = CheckoutView::Abandoned { url: url.clone() };

                Some(url)
            }

            other => {
                *self = other;

                None
            }
        }
    }

    pub fn checkout_url(&self) -> Option<&str> {
        match self {
            CheckoutView::Embedded { url } => Some(url),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameStatus {
    Embeddable,
    Inaccessible(String),
}

#[async_trait]
pub trait FrameInspector: Send + Sync {
    async fn inspect(&self, url: &str) -> FrameStatus;
}

pub trait Browser: Send + Sync {
    fn open(&self, url: &str) -> Result<()>;
}

pub struct SystemBrowser;

impl Browser for SystemBrowser {
    fn open(&self, url: &str) -> Result<()> {
        webbrowser::open(url)?;

        Ok(())
    }
}

/// Loads the checkout page and looks at the headers that decide whether it can be framed.
pub struct HttpFrameInspector {
    client: reqwest::Client,
}

impl HttpFrameInspector {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FrameInspector for HttpFrameInspector {
    async fn inspect(&self, url: &str) -> FrameStatus {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(error) => return FrameStatus::Inaccessible(format!("failed to load: {error}")),
        };

        let status = response.status();

        if !status.is_success() {
            return FrameStatus::Inaccessible(format!("failed to load: HTTP {status}"));
        }

        match frame_refusal(response.headers()) {
            Some(reason) => FrameStatus::Inaccessible(reason),
            None => FrameStatus::Embeddable,
        }
    }
}

/// Why the page refuses to be framed by the local checkout page, if it does.
pub fn frame_refusal(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers
        .get(X_FRAME_OPTIONS)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
    {
        return Some(format!("framing denied by X-Frame-Options: {value}"));
    }

    for policy in headers
        .get_all(CONTENT_SECURITY_POLICY)
        .iter()
        .filter_map(|value| value.to_str().ok())
    {
        // directive names are case insensitive
        let Some(ancestors) = policy.split(';').find_map(|directive| {
            let mut tokens = directive.split_whitespace();

            tokens
                .next()
                .filter(|name| name.eq_ignore_ascii_case("frame-ancestors"))
                .map(|_| tokens.collect::<Vec<_>>())
        }) else {
            continue;
        };

        let allowed = ancestors.iter().any(|source| {
            *source == "*"
                || source.starts_with("http://localhost")
                || source.starts_with("http://127.0.0.1")
        });

        if !allowed {
            return Some(format!(
                "framing denied by Content-Security-Policy: frame-ancestors {}",
                ancestors.join(" ")
            ));
        }
    }

    None
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    /// The checkout can be framed, the caller serves the embedding page.
    Embed(String),
    /// Embedding was abandoned and the checkout opened in a new browser tab.
    OpenedExternally(String),
    /// Nothing could be opened, the URL was printed instead.
    Printed(String),
    NothingToShow,
}

/// Decides how the checkout in `view` is shown, falling back to a new tab when
/// the page cannot be embedded.
pub async fn display_checkout(
    view: &mut CheckoutView,
    inspector: &dyn FrameInspector,
    browser: &dyn Browser,
) -> CheckoutOutcome {
    let Some(url) = view.checkout_url().map(ToString::to_string) else {
        return CheckoutOutcome::NothingToShow;
    };

    match inspector.inspect(&url).await {
        FrameStatus::Embeddable => CheckoutOutcome::Embed(url),

        FrameStatus::Inaccessible(reason) => {
            log::warn!("Checkout embedding failed: {reason}");

            let Some(url) = view.abandon() else {
                return CheckoutOutcome::NothingToShow;
            };

            if let Err(why) = browser.open(&url) {
                log::error!("Could not open a browser: {why}");
                log::info!("Please open this URL in your browser: {}", urlify(&url));

                return CheckoutOutcome::Printed(url);
            }

            log::info!("Opened checkout in a new browser tab: {}", urlify(&url));

            CheckoutOutcome::OpenedExternally(url)
        }
    }
}
