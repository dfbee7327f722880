pub mod settings;

pub use settings::{LlmConfig, PromptsConfig, ServerConfig, Settings};
