use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use crate::util::{read_limited_text, BodyError};

/// Returned when the model answers with nothing usable.
pub const EMPTY_REPLY_BIO: &str = "ERROR_GENERATING_BIO // TRY_AGAIN";
/// Returned when the request fails for any reason.
pub const OFFLINE_BIO: &str = "SYSTEM_OFFLINE // MANUAL_OVERRIDE_REQUIRED";

pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

const MAX_REPLY_SIZE: usize = 256 * 1024;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Error)]
pub enum BioError {
    #[error("Request timed out after 20s")]
    Timeout,
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    #[error("Response too large (exceeds {0} bytes)")]
    ResponseTooLarge(usize),
    #[error("Unexpected response: {0}")]
    Decode(String),
    #[error("Insecure base URL: HTTPS required (except localhost for testing)")]
    InsecureBaseUrl,
}

impl From<BodyError> for BioError {
    fn from(e: BodyError) -> Self {
        match e {
            BodyError::Network(e) => BioError::Network(e),
            BodyError::TooLarge(limit) => BioError::ResponseTooLarge(limit),
            BodyError::NotUtf8 => BioError::Decode("invalid UTF-8".to_string()),
        }
    }
}

/// Writes a short profile bio from a handful of keywords.
///
/// Never fails from the caller's point of view: errors collapse into the
/// sentinel strings above, which are shown (and saved) like any other bio.
pub struct BioGenerator {
    client: reqwest::Client,
    api_key: SecretString,
    model: String,
    base_url: String,
}

impl BioGenerator {
    pub fn new(
        client: reqwest::Client,
        api_key: SecretString,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_key,
            model: model.into(),
            base_url: base_url.into(),
        }
    }

    pub async fn generate(&self, keywords: &str) -> String {
        let keywords = keywords.trim();
        if keywords.is_empty() {
            return String::new();
        }

        match self.request(keywords).await {
            Ok(Some(bio)) => bio,
            Ok(None) => EMPTY_REPLY_BIO.to_string(),
            Err(e) => {
                tracing::error!(error = %e, "Bio generation failed");
                OFFLINE_BIO.to_string()
            }
        }
    }

    async fn request(&self, keywords: &str) -> Result<Option<String>, BioError> {
        let base = self.base_url.trim_end_matches('/');
        if !base.starts_with("https://") {
            let is_localhost =
                base.starts_with("http://127.0.0.1") || base.starts_with("http://localhost");
            if !is_localhost {
                return Err(BioError::InsecureBaseUrl);
            }
        }

        let url = format!("{}/v1beta/models/{}:generateContent", base, self.model);
        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt(keywords) }] }],
            "generationConfig": { "temperature": 0.9 },
        });

        let request = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", self.api_key.expose_secret())
            .body(body.to_string());

        let response = tokio::time::timeout(REQUEST_TIMEOUT, request.send())
            .await
            .map_err(|_| BioError::Timeout)??;

        if !response.status().is_success() {
            return Err(BioError::HttpStatus(response.status().as_u16()));
        }

        let text = read_limited_text(response, MAX_REPLY_SIZE).await?;
        let reply: GenerateReply =
            serde_json::from_str(&text).map_err(|e| BioError::Decode(e.to_string()))?;

        let bio = reply.text();
        let bio = bio.trim();
        Ok((!bio.is_empty()).then(|| bio.to_string()))
    }
}

fn prompt(keywords: &str) -> String {
    format!(
        "Generate a short, punchy, \"Neo-Brutalist\" style bio for a social link profile \
         based on these keywords: \"{keywords}\".\n\n\
         Style guidelines:\n\
         - Use uppercase text often.\n\
         - Use symbols like //, ::, or [].\n\
         - Keep it under 150 characters.\n\
         - Make it sound edgy, confident, and modern.\n\
         - Do not include hashtags.\n\
         - Return ONLY the bio text."
    )
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GenerateReply {
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CandidateContent {
    parts: Vec<Part>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Part {
    text: String,
}

impl GenerateReply {
    /// Text of the first candidate, parts joined.
    fn text(&self) -> String {
        self.candidates
            .first()
            .map(|c| {
                c.content
                    .parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}
