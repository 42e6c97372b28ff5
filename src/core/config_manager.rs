// src/core/config_manager.rs
//! Configuration: optional `config.yaml` with per-environment sections, then
//! environment variable overrides.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::interview::InterviewSettings;

const CONFIG_FILE: &str = "config.yaml";
const DEFAULT_PORT: u16 = 4002;

#[derive(Debug, Clone)]
pub struct ConfigManager {
    pub environment: String,
    pub database_path: PathBuf,
    /// Operator bank replacing the builtin one.
    pub question_bank_path: Option<PathBuf>,
    pub port: u16,
    pub llm: LlmConfig,
    pub auth: AuthConfig,
    pub interview: InterviewSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    Gemini,
    #[serde(alias = "openai-compatible")]
    OpenAi,
}

impl LlmProvider {
    fn default_model(&self) -> &'static str {
        match self {
            LlmProvider::Gemini => "gemini-1.5-flash-latest",
            LlmProvider::OpenAi => "gpt-4o",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "gemini" | "google" => Some(LlmProvider::Gemini),
            "openai" | "openai-compatible" => Some(LlmProvider::OpenAi),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: Option<String>,
    pub timeout_seconds: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::Gemini,
            api_key: None,
            model: LlmProvider::Gemini.default_model().to_string(),
            base_url: None,
            timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub jwt_secret: Option<String>,
    pub issuer: Option<String>,
    pub audience: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct EnvironmentSection {
    database_path: Option<PathBuf>,
    question_bank_path: Option<PathBuf>,
    port: Option<u16>,
    llm: Option<LlmConfig>,
    auth: AuthConfig,
    interview: Option<InterviewSettings>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    local: EnvironmentSection,
    production: EnvironmentSection,
}

impl ConfigManager {
    /// Load configuration for the current environment
    pub fn load() -> Result<Self> {
        let environment = Self::environment_name();
        info!("Loading configuration for environment: {}", environment);

        let section = Self::load_section(Path::new(CONFIG_FILE), &environment)?;
        let mut config = Self::from_section(environment, section)?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    fn environment_name() -> String {
        std::env::var("INTERVIEW_COACH_ENV")
            .or_else(|_| std::env::var("ENVIRONMENT"))
            .unwrap_or_else(|_| "local".to_string())
    }

    fn load_section(path: &Path, environment: &str) -> Result<EnvironmentSection> {
        if !path.exists() {
            info!("{} not found, using defaults", path.display());
            return Ok(EnvironmentSection::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let file: ConfigFile = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        Ok(match environment {
            "production" => file.production,
            _ => file.local,
        })
    }

    fn from_section(environment: String, section: EnvironmentSection) -> Result<Self> {
        let base_dir = if environment == "production" {
            PathBuf::from("/app")
        } else {
            std::env::current_dir().context("Failed to get current directory")?
        };

        let database_path = match section.database_path {
            Some(path) => Self::resolve_path(&path)?,
            None => base_dir.join("interview_coach.db"),
        };
        let question_bank_path = section
            .question_bank_path
            .as_deref()
            .map(Self::resolve_path)
            .transpose()?;

        Ok(Self {
            environment,
            database_path,
            question_bank_path,
            port: section.port.unwrap_or(DEFAULT_PORT),
            llm: section.llm.unwrap_or_default(),
            auth: section.auth,
            interview: section.interview.unwrap_or_default(),
        })
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(path) = std::env::var("DATABASE_PATH") {
            self.database_path = Self::resolve_path(Path::new(&path))?;
        }
        if let Ok(path) = std::env::var("QUESTION_BANK_PATH") {
            self.question_bank_path = Some(Self::resolve_path(Path::new(&path))?);
        }
        if let Ok(port) = std::env::var("ROCKET_PORT") {
            self.port = port
                .parse()
                .with_context(|| format!("Invalid ROCKET_PORT: {}", port))?;
        }
        if let Ok(name) = std::env::var("LLM_PROVIDER") {
            let provider = LlmProvider::from_name(&name)
                .with_context(|| format!("Unknown LLM_PROVIDER: {}", name))?;
            if provider != self.llm.provider {
                self.llm.model = provider.default_model().to_string();
            }
            self.llm.provider = provider;
        }
        if let Ok(key) = std::env::var("LLM_API_KEY") {
            self.llm.api_key = Some(key);
        }
        if let Ok(model) = std::env::var("LLM_MODEL") {
            self.llm.model = model;
        }
        if let Ok(url) = std::env::var("LLM_BASE_URL") {
            self.llm.base_url = Some(url);
        }
        if let Ok(secret) = std::env::var("JWT_SECRET") {
            self.auth.jwt_secret = Some(secret);
        }
        Ok(())
    }

    fn resolve_path(path: &Path) -> Result<PathBuf> {
        if path.is_absolute() {
            Ok(path.to_path_buf())
        } else {
            let current_dir = std::env::current_dir().context("Failed to get current directory")?;
            Ok(current_dir.join(path))
        }
    }

    /// Ensure the database directory exists
    pub async fn ensure_directories(&self) -> Result<()> {
        if let Some(db_parent) = self.database_path.parent() {
            tokio::fs::create_dir_all(db_parent).await.with_context(|| {
                format!(
                    "Failed to create database directory: {}",
                    db_parent.display()
                )
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_uses_defaults() {
        let section = ConfigManager::load_section(Path::new("does-not-exist.yaml"), "local").unwrap();
        let config = ConfigManager::from_section("local".to_string(), section).unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
        assert!(config.database_path.ends_with("interview_coach.db"));
        assert_eq!(config.llm.provider, LlmProvider::Gemini);
        assert!(config.llm.api_key.is_none());
        assert_eq!(config.interview.max_turns, 5);
    }

    #[test]
    fn test_sections_select_by_environment() {
        let yaml = r#"
local:
  port: 9000
  llm:
    provider: openai
    model: gpt-4o-mini
production:
  database_path: /var/lib/coach/coach.db
  interview:
    max_turns: 7
    followup_probability: 0.5
"#;
        let file: ConfigFile = serde_yaml::from_str(yaml).unwrap();

        let local = ConfigManager::from_section("local".into(), file.local).unwrap();
        assert_eq!(local.port, 9000);
        assert_eq!(local.llm.provider, LlmProvider::OpenAi);
        assert_eq!(local.llm.model, "gpt-4o-mini");
        assert_eq!(local.llm.timeout_seconds, 30);

        let production = ConfigManager::from_section("production".into(), file.production).unwrap();
        assert_eq!(production.database_path, PathBuf::from("/var/lib/coach/coach.db"));
        assert_eq!(production.interview.max_turns, 7);
    }

    #[test]
    fn test_provider_names() {
        assert_eq!(LlmProvider::from_name("Google"), Some(LlmProvider::Gemini));
        assert_eq!(LlmProvider::from_name("openai"), Some(LlmProvider::OpenAi));
        assert_eq!(LlmProvider::from_name("claude"), None);
    }
}
