//! Adapter around the hosted Gemini model.
//!
//! Credentials are discovered once at startup and the outcome is captured in
//! [`ModelGateway`]: either a ready handle or an unavailable marker with the
//! reason. Handlers never probe globals; they call `generate` and map the
//! error. In-flight calls are bounded by a semaphore so a slow backend cannot
//! soak up unlimited connections, but no timeout is applied to any single
//! call.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use crate::constants::{GEMINI_API_URL, GEMINI_MODEL, SERVICE_ACCOUNT_FILE};

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("BrandPulse Assistant is not available. Please check authentication setup.")]
    Unavailable,
    #[error("{0}")]
    Generation(String),
}

/// How the gateway authenticates against the Gemini API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMethod {
    ServiceAccount,
    ApiKey,
}

impl AuthMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMethod::ServiceAccount => "service_account",
            AuthMethod::ApiKey => "api_key",
        }
    }
}

/// Credentials located during startup discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    /// A service-account file on disk. Exported via
    /// `GOOGLE_APPLICATION_CREDENTIALS` for ambient-credential consumers.
    ServiceAccount { path: PathBuf, api_key: Option<String> },
    ApiKey(String),
}

impl Credentials {
    pub fn auth_method(&self) -> AuthMethod {
        match self {
            Credentials::ServiceAccount { .. } => AuthMethod::ServiceAccount,
            Credentials::ApiKey(_) => AuthMethod::ApiKey,
        }
    }
}

/// Looks for credentials in priority order: a service-account file in
/// `base_dir`, then an API key. Returns `None` when neither is present.
pub fn discover_credentials(base_dir: &Path, api_key: Option<String>) -> Option<Credentials> {
    let service_account = base_dir.join(SERVICE_ACCOUNT_FILE.as_str());
    if service_account.exists() {
        return Some(Credentials::ServiceAccount {
            path: service_account,
            api_key,
        });
    }
    api_key.map(Credentials::ApiKey)
}

/// Anything that can turn a prompt into text. The production impl is
/// [`GeminiModel`]; tests swap in stubs.
#[async_trait]
pub trait TextModel: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GatewayError>;
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: String,
}

/// REST client for the Gemini `generateContent` endpoint.
pub struct GeminiModel {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl GeminiModel {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            // No request timeout: a hung call holds its request, by contract.
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            model: model.into(),
            api_key,
        }
    }

    fn from_credentials(credentials: &Credentials) -> Self {
        let api_key = match credentials {
            Credentials::ServiceAccount { api_key, .. } => api_key.clone(),
            Credentials::ApiKey(key) => Some(key.clone()),
        };
        Self::new(GEMINI_API_URL.clone(), GEMINI_MODEL.clone(), api_key)
    }
}

#[async_trait]
impl TextModel for GeminiModel {
    async fn generate(&self, prompt: &str) -> Result<String, GatewayError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let mut request = self.http.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.query(&[("key", key)]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| GatewayError::Generation(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Gemini API error ({}): {}", status, error_text);
            return Err(GatewayError::Generation(format!(
                "Gemini API error ({status}): {error_text}"
            )));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Generation(e.to_string()))?;

        parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text.trim().to_string())
            .ok_or_else(|| {
                GatewayError::Generation("Gemini returned no candidates".to_string())
            })
    }
}

/// Startup outcome of gateway initialization. `Unavailable` still lets the
/// process serve the non-model endpoints.
pub enum ModelGateway {
    Ready {
        model: Arc<dyn TextModel>,
        auth: AuthMethod,
        limiter: Arc<Semaphore>,
    },
    Unavailable {
        reason: String,
    },
}

impl ModelGateway {
    /// Discovers credentials under `base_dir` and builds the Gemini handle.
    pub fn initialize(base_dir: &Path, max_inflight: usize) -> Self {
        let api_key = std::env::var("GOOGLE_API_KEY").ok().filter(|k| !k.is_empty());
        match discover_credentials(base_dir, api_key) {
            Some(credentials) => {
                if let Credentials::ServiceAccount { path, .. } = &credentials {
                    std::env::set_var("GOOGLE_APPLICATION_CREDENTIALS", path);
                    info!("Using service account authentication: {}", path.display());
                } else {
                    info!("Using API key authentication");
                }
                let model = GeminiModel::from_credentials(&credentials);
                Self::ready(Arc::new(model), credentials.auth_method(), max_inflight)
            }
            None => {
                warn!(
                    "No authentication found. Please set GOOGLE_API_KEY or provide {}",
                    SERVICE_ACCOUNT_FILE.as_str()
                );
                Self::unavailable("no credentials found at startup")
            }
        }
    }

    pub fn ready(model: Arc<dyn TextModel>, auth: AuthMethod, max_inflight: usize) -> Self {
        ModelGateway::Ready {
            model,
            auth,
            limiter: Arc::new(Semaphore::new(max_inflight)),
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        ModelGateway::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, ModelGateway::Ready { .. })
    }

    /// Auth method reported by `/health`. Mirrors the credential priority:
    /// `api_key` is reported whenever no service-account file was found.
    pub fn auth_method(&self) -> &'static str {
        match self {
            ModelGateway::Ready { auth, .. } => auth.as_str(),
            ModelGateway::Unavailable { .. } => AuthMethod::ApiKey.as_str(),
        }
    }

    /// Runs one generate call through the concurrency limiter. Fails fast
    /// when no handle was initialized at startup; never retries.
    pub async fn generate(&self, prompt: &str) -> Result<String, GatewayError> {
        match self {
            ModelGateway::Unavailable { reason } => {
                warn!("Rejecting model call, gateway unavailable: {}", reason);
                Err(GatewayError::Unavailable)
            }
            ModelGateway::Ready { model, limiter, .. } => {
                let _permit = limiter
                    .acquire()
                    .await
                    .map_err(|e| GatewayError::Generation(e.to_string()))?;
                model.generate(prompt).await
            }
        }
    }
}
