//! Configuration file management for marksmith.
//!
//! Provides a TOML-based config file at `~/.config/marksmith/config.toml` and
//! a resolution chain: CLI flag > env var > config file > default.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use marksmith_core::engine::EngineSettings;
use marksmith_core::gateway::{GatewayConfig, ProviderKind};
use marksmith_core::replace::MarkdownDelimiters;

pub const ENV_PROVIDER: &str = "MARKSMITH_PROVIDER";
pub const ENV_MODEL: &str = "MARKSMITH_MODEL";
pub const ENV_API_KEY: &str = "MARKSMITH_API_KEY";
pub const ENV_BASE_URL: &str = "MARKSMITH_BASE_URL";

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub provider: ProviderSection,
    #[serde(default)]
    pub editor: EditorSection,
    #[serde(default)]
    pub instructions: InstructionsSection,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ProviderSection {
    #[serde(default)]
    pub kind: ProviderKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Request timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EditorSection {
    #[serde(default = "default_context_lines")]
    pub context_lines: i64,
    #[serde(default)]
    pub insert_original: bool,
    #[serde(default)]
    pub markdown_delimiters: MarkdownDelimiters,
}

impl Default for EditorSection {
    fn default() -> Self {
        Self {
            context_lines: default_context_lines(),
            insert_original: false,
            markdown_delimiters: MarkdownDelimiters::default(),
        }
    }
}

fn default_context_lines() -> i64 {
    EngineSettings::DEFAULT_CONTEXT_LINES
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct InstructionsSection {
    /// Free-text instructions applied to every request, below project
    /// instructions in priority.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the marksmith config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/marksmith` or
/// `~/.config/marksmith`, also on macOS.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("marksmith");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("marksmith")
}

/// Return the path to the marksmith config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file, or `None` if there is none.
///
/// A file that exists but cannot be read or parsed is an error.
pub fn load_config() -> Result<Option<ConfigFile>> {
    let path = config_path();
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents)
        .with_context(|| format!("failed to parse config file at {}", path.display()))?;
    Ok(Some(config))
}

/// Serialize and write the config file, creating parent dirs as needed.
/// Sets file permissions to 0600 on Unix.
pub fn save_config(config: &ConfigFile) -> Result<PathBuf> {
    let path = config_path();
    let dir = config_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create config directory {}", dir.display()))?;

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(&path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    // The file may hold an API key.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(&path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(path)
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Provider settings given on the command line.
#[derive(Debug, Default, Clone)]
pub struct ProviderFlags {
    pub provider: Option<ProviderKind>,
    pub model: Option<String>,
    pub base_url: Option<String>,
}

/// Fully resolved configuration, ready for use.
#[derive(Debug)]
pub struct MarksmithConfig {
    pub gateway: GatewayConfig,
    pub engine: EngineSettings,
    pub user_instructions: Option<String>,
}

impl MarksmithConfig {
    /// Resolve configuration using the chain: CLI flag > env var > config file > default.
    ///
    /// - Provider: `--provider` > `MARKSMITH_PROVIDER` > `provider.kind` > openai
    /// - Model: `--model` > `MARKSMITH_MODEL` > `provider.model` > none
    /// - API key: `MARKSMITH_API_KEY` > `provider.api_key` > none
    /// - Base URL: `--base-url` > `MARKSMITH_BASE_URL` > `provider.base_url` > provider default
    ///
    /// A missing model or API key is not an error here; it surfaces when the
    /// generator is built.
    pub fn resolve(flags: &ProviderFlags) -> Result<Self> {
        let file = load_config()?.unwrap_or_default();
        Self::from_parts(flags, file)
    }

    fn from_parts(flags: &ProviderFlags, file: ConfigFile) -> Result<Self> {
        let ConfigFile {
            provider,
            editor,
            instructions,
        } = file;

        let kind = match flags.provider {
            Some(kind) => kind,
            None => match env_value(ENV_PROVIDER) {
                Some(raw) => raw
                    .parse::<ProviderKind>()
                    .map_err(anyhow::Error::msg)
                    .with_context(|| format!("invalid {ENV_PROVIDER}"))?,
                None => provider.kind,
            },
        };

        let model = flags
            .model
            .clone()
            .or_else(|| env_value(ENV_MODEL))
            .or(provider.model);
        let api_key = env_value(ENV_API_KEY).or(provider.api_key);
        let base_url = flags
            .base_url
            .clone()
            .or_else(|| env_value(ENV_BASE_URL))
            .or(provider.base_url);
        let timeout = provider
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(GatewayConfig::DEFAULT_TIMEOUT);

        Ok(Self {
            gateway: GatewayConfig {
                model,
                api_key,
                base_url,
                timeout,
                ..GatewayConfig::new(kind)
            },
            engine: EngineSettings {
                context_lines: editor.context_lines.max(0),
                insert_original: editor.insert_original,
                markdown_delimiters: editor.markdown_delimiters,
            },
            user_instructions: instructions.user,
        })
    }
}

/// Read an env var, treating unset and blank the same.
fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
