//! Provider selection and gateway configuration.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::GatewayError;
use super::http::HttpGenerator;
use super::trait_def::Generator;

/// The closed set of supported provider wire formats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// OpenAI-compatible Chat Completions.
    #[default]
    OpenAi,
    /// Anthropic Messages API.
    Anthropic,
    /// Google Gemini `generateContent`.
    Gemini,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 3] = [Self::OpenAi, Self::Anthropic, Self::Gemini];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::Gemini => "gemini",
        }
    }

    pub fn default_base_url(self) -> &'static str {
        match self {
            Self::OpenAi => "https://api.openai.com/v1",
            Self::Anthropic => "https://api.anthropic.com",
            Self::Gemini => "https://generativelanguage.googleapis.com",
        }
    }

    /// A reasonable model to suggest when writing a fresh config file.
    pub fn suggested_model(self) -> &'static str {
        match self {
            Self::OpenAi => "gpt-4o-mini",
            Self::Anthropic => "claude-3-5-haiku-latest",
            Self::Gemini => "gemini-2.0-flash",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "anthropic" => Ok(Self::Anthropic),
            "gemini" | "google" => Ok(Self::Gemini),
            other => Err(format!(
                "unknown provider {other:?} (expected openai, anthropic or gemini)"
            )),
        }
    }
}

/// Settings for one generation backend, as resolved from configuration.
#[derive(Clone)]
pub struct GatewayConfig {
    pub kind: ProviderKind,
    pub model: Option<String>,
    pub api_key: Option<String>,
    /// Overrides [`ProviderKind::default_base_url`].
    pub base_url: Option<String>,
    pub timeout: Duration,
    /// Output token cap, sent to providers that require one.
    pub max_tokens: u32,
}

impl GatewayConfig {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
    pub const DEFAULT_MAX_TOKENS: u32 = 1024;

    pub fn new(kind: ProviderKind) -> Self {
        Self {
            kind,
            model: None,
            api_key: None,
            base_url: None,
            timeout: Self::DEFAULT_TIMEOUT,
            max_tokens: Self::DEFAULT_MAX_TOKENS,
        }
    }

    /// The base URL requests are sent to, without a trailing slash.
    pub fn effective_base_url(&self) -> String {
        self.base_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .unwrap_or(self.kind.default_base_url())
            .trim_end_matches('/')
            .to_string()
    }

    /// Check that everything needed for a request is present.
    ///
    /// Returns `(model, api_key)` on success.
    pub fn validate(&self) -> Result<(String, String), GatewayError> {
        let api_key = non_blank(self.api_key.as_deref()).ok_or_else(|| {
            GatewayError::Configuration(format!("no API key configured for {}", self.kind))
        })?;
        let model = non_blank(self.model.as_deref()).ok_or_else(|| {
            GatewayError::Configuration(format!("no model configured for {}", self.kind))
        })?;
        let base = self.effective_base_url();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(GatewayError::Configuration(format!(
                "base URL {base:?} must start with http:// or https://"
            )));
        }
        Ok((model.to_string(), api_key.to_string()))
    }
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("kind", &self.kind)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

/// Build the generator for `config`, failing fast on missing settings.
pub fn build_generator(config: &GatewayConfig) -> Result<Arc<dyn Generator>, GatewayError> {
    Ok(Arc::new(HttpGenerator::new(config)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured(kind: ProviderKind) -> GatewayConfig {
        GatewayConfig {
            model: Some("m".into()),
            api_key: Some("k".into()),
            ..GatewayConfig::new(kind)
        }
    }

    #[test]
    fn parse_and_display_agree() {
        for kind in ProviderKind::ALL {
            assert_eq!(kind.to_string().parse::<ProviderKind>(), Ok(kind));
        }
        assert_eq!("Google".parse::<ProviderKind>(), Ok(ProviderKind::Gemini));
        assert!("cohere".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn missing_api_key_is_configuration_error() {
        let config = GatewayConfig {
            api_key: Some("   ".into()),
            ..configured(ProviderKind::OpenAi)
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, GatewayError::Configuration(_)));
        assert!(err.to_string().contains("API key"));
    }

    #[test]
    fn missing_model_is_configuration_error() {
        let config = GatewayConfig {
            model: None,
            ..configured(ProviderKind::Anthropic)
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("no model configured for anthropic"));
    }

    #[test]
    fn bad_base_url_is_configuration_error() {
        let config = GatewayConfig {
            base_url: Some("localhost:8080".into()),
            ..configured(ProviderKind::OpenAi)
        };
        assert!(matches!(
            config.validate(),
            Err(GatewayError::Configuration(_))
        ));
    }

    #[test]
    fn base_url_defaults_and_trims_slash() {
        let mut config = configured(ProviderKind::Gemini);
        assert_eq!(
            config.effective_base_url(),
            "https://generativelanguage.googleapis.com"
        );
        config.base_url = Some("http://127.0.0.1:9999/v1/".into());
        assert_eq!(config.effective_base_url(), "http://127.0.0.1:9999/v1");
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = GatewayConfig {
            api_key: Some("sk-secret".into()),
            ..configured(ProviderKind::OpenAi)
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn build_generator_fails_fast() {
        let err = build_generator(&GatewayConfig::new(ProviderKind::OpenAi))
            .err()
            .expect("should fail without credentials");
        assert!(matches!(err, GatewayError::Configuration(_)));
    }

    #[test]
    fn build_generator_uses_provider_name() {
        let generator = build_generator(&configured(ProviderKind::Anthropic)).unwrap();
        assert_eq!(generator.name(), "anthropic");
    }
}
