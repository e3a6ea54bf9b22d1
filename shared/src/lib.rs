use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Request body for the single-email prediction endpoint.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PredictEmailRequest {
    pub email_body: String,
}

/// Classification verdict for a single email.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PredictionResponse {
    /// Label assigned by the classifier, e.g. "Spam" or "Ham".
    pub prediction: String,
    /// Confidence as a percentage; not every model variant reports one.
    #[serde(default)]
    pub confidence: Option<f64>,
    /// Truncated echo of the submitted text, as returned by the service.
    #[serde(default)]
    pub email_body: Option<String>,
}

impl PredictionResponse {
    pub fn is_spam(&self) -> bool {
        self.prediction.eq_ignore_ascii_case("spam")
    }
}

/// Summary produced after batch-classifying an MBOX archive.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct MboxSummary {
    pub total_emails: u64,
    /// Per-label email counts, keyed by the classifier's label strings.
    pub predictions: BTreeMap<String, u64>,
    /// Path to the generated CSV artifact, when the service produced one.
    #[serde(default)]
    pub download_url: Option<String>,
}

impl MboxSummary {
    /// Final path segment of `download_url`, the filename expected by the
    /// download endpoint.
    pub fn download_filename(&self) -> Option<&str> {
        self.download_url
            .as_deref()
            .and_then(|url| url.rsplit('/').next())
            .filter(|name| !name.is_empty())
    }
}

/// Error body shape shared by every failing endpoint.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ErrorBody {
    pub error: String,
}
