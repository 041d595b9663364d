use crate::error::{KamusError, Result};
use crate::prompt::Direction;
use config::{Config, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KamusConfig {
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub completion: CompletionConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_web_port")]
    pub port: u16,
    #[serde(default = "default_web_host")]
    pub host: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            port: default_web_port(),
            host: default_web_host(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Custom path for the session file. Defaults to `~/.config/kamus/kamus_sessions.json`.
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Sent as `HTTP-Referer`.
    #[serde(default = "default_referer")]
    pub referer: String,
    /// Sent as `X-Title`.
    #[serde(default = "default_title")]
    pub title: String,
    /// Environment variable whose value pre-fills the API key field.
    /// The key itself is never read from or written to a file.
    #[serde(default)]
    pub env_var: Option<String>,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            referer: default_referer(),
            title: default_title(),
            env_var: None,
        }
    }
}

impl CompletionConfig {
    /// API key from the configured environment variable, if set and non-blank.
    pub fn env_api_key(&self) -> Option<String> {
        let name = self.env_var.as_deref()?;
        std::env::var(name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Slug or label of the initially selected translation direction.
    #[serde(default = "default_direction")]
    pub default_direction: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            default_direction: default_direction(),
        }
    }
}

impl UiConfig {
    /// Parsed direction; unknown values fall back to auto-detect.
    pub fn direction(&self) -> Direction {
        self.default_direction.parse().unwrap_or_default()
    }
}

// -- Defaults --

fn default_web_port() -> u16 {
    8501
}
fn default_web_host() -> String {
    "127.0.0.1".to_string()
}
fn default_endpoint() -> String {
    "https://openrouter.ai/api/v1/chat/completions".to_string()
}
fn default_model() -> String {
    "deepseek/deepseek-chat-v3-0324:free".to_string()
}
fn default_referer() -> String {
    "http://localhost".to_string()
}
fn default_title() -> String {
    "Kamus Cirebon Sunda".to_string()
}
fn default_direction() -> String {
    Direction::AutoDetect.slug().to_string()
}

impl KamusConfig {
    /// Load configuration with three-layer TOML merge:
    /// 1. ~/.config/kamus/config.toml (global)
    /// 2. .kamus/config.toml (project)
    /// 3. .kamus/config.local.toml (local, gitignored)
    pub fn load(project_dir: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        // Layer 1: Global config
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                builder = builder.add_source(File::from(global_path).required(false));
            }
        }

        // Layer 2: Project config
        if let Some(dir) = project_dir {
            let project_config = dir.join(".kamus").join("config.toml");
            if project_config.exists() {
                builder = builder.add_source(File::from(project_config).required(false));
            }

            // Layer 3: Local config (gitignored)
            let local_config = dir.join(".kamus").join("config.local.toml");
            if local_config.exists() {
                builder = builder.add_source(File::from(local_config).required(false));
            }
        }

        let config = builder
            .build()
            .map_err(|e| KamusError::Config(e.to_string()))?;

        let mut cfg: Self = config
            .try_deserialize()
            .map_err(|e| KamusError::Config(e.to_string()))?;

        cfg.validate();
        Ok(cfg)
    }

    /// Load with defaults only (no files).
    pub fn default_config() -> Self {
        Self::default()
    }

    /// Validate config values, repairing what can be repaired and logging warnings.
    /// This is lenient: it fixes values rather than rejecting the config.
    pub fn validate(&mut self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.web.port == 0 {
            warnings.push(format!(
                "web.port = 0, setting to {}",
                default_web_port()
            ));
            self.web.port = default_web_port();
        }

        if self.web.host.trim().is_empty() {
            warnings.push(format!(
                "web.host is empty, setting to {}",
                default_web_host()
            ));
            self.web.host = default_web_host();
        }

        let endpoint = self.completion.endpoint.trim();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            warnings.push(format!(
                "completion.endpoint '{}' is not an http(s) URL, using default",
                self.completion.endpoint
            ));
            self.completion.endpoint = default_endpoint();
        }

        if self.completion.model.trim().is_empty() {
            warnings.push("completion.model is empty, using default".to_string());
            self.completion.model = default_model();
        }

        if self.ui.default_direction.parse::<Direction>().is_err() {
            let valid: Vec<&str> = Direction::ALL.iter().map(|d| d.slug()).collect();
            warnings.push(format!(
                "unknown ui.default_direction '{}', valid: {}",
                self.ui.default_direction,
                valid.join(", ")
            ));
            self.ui.default_direction = default_direction();
        }

        for w in &warnings {
            tracing::warn!("config: {}", w);
        }

        warnings
    }
}

fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("kamus").join("config.toml"))
}
