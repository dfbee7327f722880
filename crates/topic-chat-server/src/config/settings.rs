use anyhow::Result;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};

use crate::logging::LoggerConfig;
use crate::services::topic::TopicThresholds;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    #[serde(default)]
    pub topic: TopicThresholds,
    #[serde(default)]
    pub prompts: PromptsConfig,
    #[serde(default)]
    pub logging: LoggerConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    pub base_url: String,
    /// Bearer token; usually supplied through `APP__LLM__API_KEY`
    #[serde(default)]
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: usize,
    pub timeout_seconds: u64,
}

impl LlmConfig {
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|key| !key.is_empty())
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct PromptsConfig {
    pub system_prompt: String,
}

impl Default for PromptsConfig {
    fn default() -> Self {
        Self {
            system_prompt: "You are a helpful AI assistant that provides accurate and concise information."
                .to_string(),
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        Self::from_builder(
            Config::builder().add_source(File::with_name("config/settings").required(true)),
        )
    }

    /// Layer `APP__SECTION__KEY` environment overrides on top of `builder`
    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        let config = builder
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    const MINIMAL: &str = r#"
        [server]
        host = "127.0.0.1"
        port = 8080

        [llm]
        base_url = "http://localhost:9000"
        model = "llama3-70b-8192"
        temperature = 0.7
        max_tokens = 1024
        timeout_seconds = 30
    "#;

    fn parse(toml: &str) -> Settings {
        Settings::from_builder(Config::builder().add_source(File::from_str(toml, FileFormat::Toml)))
            .unwrap()
    }

    #[test]
    fn test_defaults_for_optional_sections() {
        let settings = parse(MINIMAL);
        assert_eq!(settings.server.port, 8080);
        assert!(settings.llm.api_key.is_none());
        assert_eq!(settings.topic, TopicThresholds::default());
        assert!(settings.prompts.system_prompt.starts_with("You are a helpful AI assistant"));
        assert_eq!(settings.logging.worker_count, 1);
    }

    #[test]
    fn test_partial_topic_section_keeps_other_defaults() {
        let toml = format!("{}\n[topic]\nmin_shift_length = 80\n", MINIMAL);
        let settings = parse(&toml);
        assert_eq!(settings.topic.min_shift_length, 80);
        assert_eq!(settings.topic.overlap_threshold, 0.2);
        assert_eq!(settings.topic.recent_window, 4);
    }

    #[test]
    fn test_blank_api_key_is_not_configured() {
        let mut llm = parse(MINIMAL).llm;
        assert!(!llm.has_api_key());
        llm.api_key = Some(String::new());
        assert!(!llm.has_api_key());
        llm.api_key = Some("secret".to_string());
        assert!(llm.has_api_key());
    }
}
