//! JSON envelope for successful responses

use serde::Serialize;

/// `{"status": "success", "message": ..., "results"?: n, "data"?: ...}`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub status: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl ApiResponse<()> {
    /// Success with a message and no payload
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            status: "success",
            message: message.into(),
            results: None,
            data: None,
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn with_data(message: impl Into<String>, data: T) -> Self {
        Self {
            status: "success",
            message: message.into(),
            results: None,
            data: Some(data),
        }
    }
}

impl<T> ApiResponse<Vec<T>> {
    /// Success carrying a list and its length
    pub fn collection(message: impl Into<String>, items: Vec<T>) -> Self {
        Self {
            status: "success",
            message: message.into(),
            results: Some(items.len()),
            data: Some(items),
        }
    }
}
