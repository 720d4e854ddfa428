//! Generation gateway: the [`Generator`] trait and its HTTP providers.
//!
//! # Architecture
//!
//! ```text
//! LineProcessor
//!     |
//!     v
//! Arc<dyn Generator> --generate(PromptPair)--> String
//!     |
//!     +-- HttpGenerator { kind: openai | anthropic | gemini }
//!             |
//!             +-- wire::request_body / wire::extract_text
//! ```
//!
//! The core only depends on [`Generator`]; which wire format backs it is
//! chosen once by [`build_generator`] from a [`GatewayConfig`].

pub mod error;
pub mod http;
pub mod provider;
pub mod trait_def;
pub mod wire;

pub use error::{ErrorKind, GatewayError};
pub use http::HttpGenerator;
pub use provider::{GatewayConfig, ProviderKind, build_generator};
pub use trait_def::Generator;
