#![allow(dead_code)]

use std::convert::Infallible;
use std::sync::{Arc, Mutex};

use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Request, Response, Server};
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub content_type: Option<String>,
    pub body: Value,
}

/// Payment API stand-in answering every request with the same status and body.
pub struct FakeBackend {
    pub url: String,
    pub requests: Arc<Mutex<Vec<RecordedRequest>>>,
    server: tokio::task::JoinHandle<()>,
}

impl FakeBackend {
    pub async fn start(status: u16, body: &str) -> Self {
        Self::start_with_headers(status, body, &[]).await
    }

    pub async fn start_with_headers(status: u16, body: &str, headers: &[(&str, &str)]) -> Self {
        let headers = headers
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect::<Vec<_>>();
        let port = portpicker::pick_unused_port().expect("no free port");
        let requests = Arc::new(Mutex::new(Vec::new()));
        let body = body.to_string();

        let recorded = requests.clone();

        let service = make_service_fn(move |_| {
            let recorded = recorded.clone();
            let body = body.clone();
            let headers = headers.clone();

            async move {
                Ok::<_, Infallible>(service_fn(move |req: Request<Body>| {
                    handle(req, recorded.clone(), status, body.clone(), headers.clone())
                }))
            }
        });

        let server = Server::bind(&([127, 0, 0, 1], port).into()).serve(service);

        let server = tokio::spawn(async move {
            server.await.ok();
        });

        Self {
            url: format!("http://127.0.0.1:{port}"),
            requests,
            server,
        }
    }

    pub async fn checkout(checkout_url: &str) -> Self {
        Self::start(
            200,
            &serde_json::json!({ "data": { "checkout_url": checkout_url } }).to_string(),
        )
        .await
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Drop for FakeBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn handle(
    req: Request<Body>,
    recorded: Arc<Mutex<Vec<RecordedRequest>>>,
    status: u16,
    body: String,
    headers: Vec<(String, String)>,
) -> Result<Response<Body>, Infallible> {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let content_type = req
        .headers()
        .get("content-type")
        .and_then(|value| value.to_str().ok())
        .map(ToString::to_string);

    let bytes = hyper::body::to_bytes(req.into_body())
        .await
        .unwrap_or_default();

    recorded.lock().unwrap().push(RecordedRequest {
        method,
        path,
        content_type,
        body: serde_json::from_slice(&bytes).unwrap_or(Value::Null),
    });

    let mut response = Response::builder()
        .status(status)
        .header("content-type", "application/json");

    for (name, value) in headers {
        response = response.header(name, value);
    }

    Ok(response.body(Body::from(body)).unwrap())
}
