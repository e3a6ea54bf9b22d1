use gloo_file::File;
use gloo_net::http::Request;
use serde::de::DeserializeOwned;
use shared::{ErrorBody, MboxSummary, PredictEmailRequest, PredictionResponse};
use thiserror::Error;
use web_sys::FormData;

const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";

/// Fallbacks used when a failing response carries no readable `error` field.
const PREDICT_FALLBACK: &str = "Prediction failed";
const MBOX_FALLBACK: &str = "MBOX processing failed";

#[derive(Error, Clone, Debug, PartialEq)]
pub enum ApiError {
    /// Backend-reported failure; the message is the normalized `error` field.
    #[error("{0}")]
    Request(String),
    /// Transport-level failure, no usable response.
    #[error("{0}")]
    Network(String),
    /// 2xx response whose body did not match the expected shape.
    #[error("Failed to parse response: {0}")]
    Decode(String),
}

/// Thin client for the spam-classification service. One instance per
/// controller; cheap to clone into spawned futures.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiClient {
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url }
    }

    /// Base URL from the `API_BASE_URL` compile-time variable, falling back
    /// to the local development address.
    pub fn from_env() -> Self {
        Self::new(option_env!("API_BASE_URL").unwrap_or(DEFAULT_BASE_URL))
    }

    pub async fn predict_email(&self, email_body: &str) -> Result<PredictionResponse, ApiError> {
        let request = Request::post(&format!("{}/predict", self.base_url))
            .json(&PredictEmailRequest {
                email_body: email_body.to_owned(),
            })
            .map_err(|e| ApiError::Network(e.to_string()))?;
        dispatch(request, PREDICT_FALLBACK).await
    }

    pub async fn predict_mbox(&self, file: &File) -> Result<MboxSummary, ApiError> {
        let form = FormData::new()
            .map_err(|_| ApiError::Network("could not build upload form".to_owned()))?;
        form.append_with_blob_and_filename("file", file.as_ref(), &file.name())
            .map_err(|_| ApiError::Network("could not attach file to upload form".to_owned()))?;

        let request = Request::post(&format!("{}/predict-mbox", self.base_url))
            .body(form)
            .map_err(|e| ApiError::Network(e.to_string()))?;
        dispatch(request, MBOX_FALLBACK).await
    }

    /// Opens the generated artifact in a new tab. Fire and forget: the
    /// browser owns the transfer from here.
    pub fn open_download(&self, filename: &str) {
        let url = format!("{}/download/{}", self.base_url, filename);
        match web_sys::window() {
            Some(window) => {
                if window.open_with_url_and_target(&url, "_blank").is_err() {
                    gloo_console::error!("failed to open download tab for", url);
                }
            }
            None => gloo_console::error!("no window available to open download in"),
        }
    }
}

/// Sends a prepared request and applies the uniform response contract:
/// non-2xx bodies are normalized through `error_message`, 2xx bodies are
/// decoded as JSON.
async fn dispatch<T: DeserializeOwned>(request: Request, fallback: &str) -> Result<T, ApiError> {
    let response = request
        .send()
        .await
        .map_err(|e| ApiError::Network(e.to_string()))?;

    if !response.ok() {
        let body = response.text().await.unwrap_or_default();
        return Err(ApiError::Request(error_message(&body, fallback)));
    }

    response
        .json::<T>()
        .await
        .map_err(|e| ApiError::Decode(e.to_string()))
}

/// Extracts the backend's `error` field from a failing response body. The
/// body itself may be garbage (proxy HTML, empty, wrong shape), so the parse
/// is fallible and falls back to the per-operation message.
fn error_message(body: &str, fallback: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.error)
        .unwrap_or_else(|_| fallback.to_owned())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn error_message_prefers_backend_field() {
        assert_eq!(
            error_message(r#"{"error":"model unavailable"}"#, PREDICT_FALLBACK),
            "model unavailable"
        );
    }

    #[test]
    fn error_message_falls_back_on_unparseable_body() {
        assert_eq!(
            error_message("<html>502 Bad Gateway</html>", PREDICT_FALLBACK),
            "Prediction failed"
        );
        assert_eq!(error_message("", MBOX_FALLBACK), "MBOX processing failed");
    }

    #[test]
    fn error_message_falls_back_when_field_is_missing_or_mistyped() {
        assert_eq!(
            error_message(r#"{"detail":"not the field we read"}"#, PREDICT_FALLBACK),
            "Prediction failed"
        );
        assert_eq!(
            error_message(r#"{"error":42}"#, MBOX_FALLBACK),
            "MBOX processing failed"
        );
    }

    #[test]
    fn base_url_trailing_slashes_are_trimmed() {
        let client = ApiClient::new("http://backend.test/api/");
        assert_eq!(client.base_url, "http://backend.test/api");
        let client = ApiClient::new("http://backend.test/api");
        assert_eq!(client.base_url, "http://backend.test/api");
    }

    #[test]
    fn request_error_displays_the_bare_message() {
        assert_eq!(
            ApiError::Request("model unavailable".to_owned()).to_string(),
            "model unavailable"
        );
        assert_eq!(
            ApiError::Decode("missing field `prediction`".to_owned()).to_string(),
            "Failed to parse response: missing field `prediction`"
        );
    }
}
