pub mod conversation;
pub mod llm_service;
pub mod topic;

pub use llm_service::LlmService;
