//! Generation failures and their classification.

use std::fmt;

/// Maximum number of characters of a provider response body kept for
/// diagnostics.
pub const BODY_SNIPPET_CHARS: usize = 500;

/// Errors from a generation call. Every variant is terminal: there are no
/// retries.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Missing credential, endpoint or model. Raised before any network
    /// attempt.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The request could not be sent or the response could not be read.
    #[error("{provider}: request failed: {message}")]
    Transport { provider: String, message: String },

    /// The provider answered with a non-success status.
    #[error("{provider}: HTTP {status}: {body}")]
    Provider {
        provider: String,
        status: u16,
        /// Raw response body, truncated to [`BODY_SNIPPET_CHARS`].
        body: String,
    },

    /// Success status, but the expected text field was missing or the body
    /// could not be parsed.
    #[error("{provider}: unexpected response: {message}")]
    ResponseShape { provider: String, message: String },
}

/// User-facing failure categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Auth,
    NotFound,
    RateLimited,
    Server,
    Other,
}

impl ErrorKind {
    /// Classify an HTTP status code.
    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => Self::Auth,
            404 => Self::NotFound,
            429 => Self::RateLimited,
            500..=599 => Self::Server,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Configuration => "configuration",
            Self::Auth => "auth",
            Self::NotFound => "not_found",
            Self::RateLimited => "rate_limited",
            Self::Server => "server",
            Self::Other => "other",
        };
        f.write_str(s)
    }
}

impl GatewayError {
    /// Build a [`GatewayError::Provider`], truncating `body`.
    pub fn provider_status(provider: &str, status: u16, body: &str) -> Self {
        Self::Provider {
            provider: provider.to_string(),
            status,
            body: truncate_chars(body, BODY_SNIPPET_CHARS),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::Provider { status, .. } => ErrorKind::from_status(*status),
            Self::Transport { .. } | Self::ResponseShape { .. } => ErrorKind::Other,
        }
    }

    /// Short message suitable for showing to the author.
    pub fn user_message(&self) -> String {
        match self.kind() {
            ErrorKind::Configuration => format!("Generation is not configured: {self}"),
            ErrorKind::Auth => {
                "Authentication failed: check the API key for the selected provider.".to_string()
            }
            ErrorKind::NotFound => {
                "The endpoint or model was not found: check the base URL and model name."
                    .to_string()
            }
            ErrorKind::RateLimited => {
                "The provider is rate limiting requests: wait a moment and try again.".to_string()
            }
            ErrorKind::Server => "The provider reported a server error.".to_string(),
            ErrorKind::Other => format!("Generation failed: {self}"),
        }
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification() {
        assert_eq!(ErrorKind::from_status(401), ErrorKind::Auth);
        assert_eq!(ErrorKind::from_status(403), ErrorKind::Auth);
        assert_eq!(ErrorKind::from_status(404), ErrorKind::NotFound);
        assert_eq!(ErrorKind::from_status(429), ErrorKind::RateLimited);
        assert_eq!(ErrorKind::from_status(500), ErrorKind::Server);
        assert_eq!(ErrorKind::from_status(503), ErrorKind::Server);
        assert_eq!(ErrorKind::from_status(400), ErrorKind::Other);
        assert_eq!(ErrorKind::from_status(302), ErrorKind::Other);
    }

    #[test]
    fn provider_error_keeps_identity_and_truncates_body() {
        let body = "x".repeat(2 * BODY_SNIPPET_CHARS);
        let err = GatewayError::provider_status("anthropic", 529, &body);
        match &err {
            GatewayError::Provider {
                provider,
                status,
                body,
            } => {
                assert_eq!(provider, "anthropic");
                assert_eq!(*status, 529);
                assert_eq!(body.chars().count(), BODY_SNIPPET_CHARS + 3);
                assert!(body.ends_with("..."));
            }
            other => panic!("unexpected variant: {other:?}"),
        }
        assert_eq!(err.kind(), ErrorKind::Server);
    }

    #[test]
    fn short_body_is_kept_whole() {
        let err = GatewayError::provider_status("openai", 401, "bad key");
        assert_eq!(err.to_string(), "openai: HTTP 401: bad key");
        assert_eq!(err.kind(), ErrorKind::Auth);
        assert!(err.user_message().contains("API key"));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_chars("ééé", 2), "éé...");
        assert_eq!(truncate_chars("ab", 2), "ab");
    }

    #[test]
    fn shape_and_transport_errors_are_generic() {
        let shape = GatewayError::ResponseShape {
            provider: "gemini".into(),
            message: "no candidates".into(),
        };
        assert_eq!(shape.kind(), ErrorKind::Other);
        assert!(shape.user_message().contains("no candidates"));

        let config = GatewayError::Configuration("missing API key".into());
        assert_eq!(config.kind(), ErrorKind::Configuration);
        assert!(config.user_message().contains("missing API key"));
    }
}
