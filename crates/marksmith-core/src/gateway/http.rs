//! HTTP-backed [`Generator`] dispatching on [`ProviderKind`].

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument, warn};

use super::error::GatewayError;
use super::provider::{GatewayConfig, ProviderKind};
use super::trait_def::Generator;
use super::wire;
use crate::prompt::PromptPair;

/// A generator that talks to one provider over HTTP.
///
/// Each call is a single POST with no retry.
pub struct HttpGenerator {
    client: Client,
    kind: ProviderKind,
    model: String,
    api_key: String,
    base_url: String,
    max_tokens: u32,
}

impl HttpGenerator {
    /// Validate `config` and build the HTTP client.
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let (model, api_key) = config.validate()?;
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::Configuration(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            kind: config.kind,
            model,
            api_key,
            base_url: config.effective_base_url(),
            max_tokens: config.max_tokens,
        })
    }

    fn transport(&self, e: reqwest::Error) -> GatewayError {
        GatewayError::Transport {
            provider: self.kind.to_string(),
            message: e.to_string(),
        }
    }
}

#[async_trait]
impl Generator for HttpGenerator {
    fn name(&self) -> &str {
        self.kind.as_str()
    }

    #[instrument(skip(self, prompt), fields(provider = %self.kind, model = %self.model))]
    async fn generate(&self, prompt: &PromptPair) -> Result<String, GatewayError> {
        let url = wire::endpoint(self.kind, &self.base_url, &self.model);
        let body = wire::request_body(self.kind, &self.model, self.max_tokens, prompt);

        let request = self.client.post(&url).json(&body);
        let request = match self.kind {
            ProviderKind::OpenAi => request.bearer_auth(&self.api_key),
            ProviderKind::Anthropic => request
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", wire::ANTHROPIC_VERSION),
            ProviderKind::Gemini => request.header("x-goog-api-key", &self.api_key),
        };

        debug!(%url, "sending generation request");
        let response = request.send().await.map_err(|e| self.transport(e))?;
        let status = response.status();
        let text = response.text().await.map_err(|e| self.transport(e))?;

        if !status.is_success() {
            let err = GatewayError::provider_status(self.kind.as_str(), status.as_u16(), &text);
            warn!(status = status.as_u16(), kind = %err.kind(), "provider returned an error");
            return Err(err);
        }

        let generated =
            wire::extract_text(self.kind, &text).map_err(|message| GatewayError::ResponseShape {
                provider: self.kind.to_string(),
                message,
            })?;
        debug!(chars = generated.chars().count(), "generation complete");
        Ok(generated)
    }
}
