use std::convert::Infallible;
use std::sync::Arc;

use anyhow::{Context, Result};
use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Request, Response, Server, StatusCode};
use tokio::sync::mpsc::{channel, Sender};

use super::urlify;
use crate::commands::pay::checkout::Browser;

/// Serves a page framing `checkout_url` on localhost and opens it in the
/// browser. Returns once the user hits Ctrl-C, the page reports the payment
/// as finished, or `timeout_min` minutes pass.
pub async fn serve_checkout_frame(
    checkout_url: &str,
    timeout_min: u16,
    browser: &dyn Browser,
) -> Result<()> {
    let port = portpicker::pick_unused_port().with_context(|| {
        "Could not find an unused port. Please make sure you have at least one port available."
    })?;

    let page = Arc::new(frame_page(checkout_url));
    let (sender, mut receiver) = channel::<&'static str>(1);

    let timeouter = sender.clone();

    let timeout = tokio::spawn(async move {
        let timeout = u64::from(timeout_min) * 60;

        tokio::time::sleep(tokio::time::Duration::from_secs(timeout)).await;
        timeouter.send("timeout").await.ok();
    });

    let interrupter = sender.clone();

    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupter.send("interrupted").await.ok();
        }
    });

    let service = make_service_fn(move |_| {
        let sender = sender.clone();
        let page = page.clone();

        async move {
            Ok::<_, Infallible>(service_fn(move |req: Request<Body>| {
                request_handler(req, page.clone(), sender.clone())
            }))
        }
    });

    let address = ([127, 0, 0, 1], port).into();

    let server = Server::try_bind(&address)
        .with_context(|| format!("Could not listen on port {port}"))?
        .serve(service);

    let runtime = tokio::spawn(async move {
        if let Err(error) = server.await {
            log::error!("Server error: {error}");
        }
    });

    let local_url = format!("http://localhost:{port}/");

    if let Err(why) = browser.open(&local_url) {
        log::error!("Could not open a browser: {why}");
        log::info!("Please open this URL in your browser: {}", urlify(checkout_url));
    } else {
        log::info!(
            "Checkout opened at {}, press Ctrl-C once you are done",
            urlify(&local_url)
        );
    }

    let reason = receiver.recv().await;

    runtime.abort();
    timeout.abort();
    interrupt.abort();

    log::debug!("Checkout page closed: {reason:?}");

    match reason {
        Some("timeout") => log::warn!("Stopped serving the checkout after {timeout_min} minutes"),
        Some("done") => log::info!("Checkout finished"),
        _ => {}
    }

    Ok(())
}

async fn request_handler(
    req: Request<Body>,
    page: Arc<String>,
    sender: Sender<&'static str>,
) -> Result<Response<Body>, Infallible> {
    let response = match req.uri().path() {
        "/" => Response::builder()
            .header("content-type", "text/html; charset=utf-8")
            .body(Body::from(page.as_str().to_owned())),

        "/done" => {
            sender.send("done").await.ok();

            Response::builder().body(Body::from("You can close this tab now"))
        }

        _ => Response::builder()
            .status(StatusCode::NOT_FOUND)
            .body(Body::empty()),
    };

    // builder only fails on invalid header input, which is static here
    Ok(response.unwrap_or_else(|_| Response::new(Body::empty())))
}

fn frame_page(checkout_url: &str) -> String {
    format!(
        r#"<!doctype html>
<html>
  <head>
    <meta charset="utf-8">
    <title>Checkout</title>
    <style>
      body {{ margin: 0; font-family: sans-serif; }}
      iframe {{ width: 100%; height: calc(100vh - 48px); border: none; }}
      footer {{ height: 48px; display: flex; align-items: center; justify-content: center; }}
    </style>
  </head>
  <body>
    <iframe src="{src}" title="Checkout"></iframe>
    <footer><a href="/done">Done</a>&nbsp;&middot;&nbsp;<a href="{src}" target="_blank">Open in a new tab</a></footer>
  </body>
</html>
"#,
        src = escape_attribute(checkout_url)
    )
}

fn escape_attribute(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
