use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Base<T> {
    pub data: T,
}

#[derive(Debug, Deserialize)]
pub struct ErrorContent {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorContent,
}
