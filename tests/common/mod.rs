use feedloop::config::{Config, OpenRouterConfig};
use feedloop::gateway::CompletionGateway;
use feedloop::providers::OpenRouterProvider;
use serde_json::json;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[allow(dead_code)]
pub const FORM_YAML: &str = r#"
project_name: Solar Kiosks
context: Rural schools without reliable power
problem: Students cannot charge tablets used for homework
impact: 300 students gain two extra study hours per day
proposed_solution: Shared solar charging kiosks run by student clubs
project_type: social
user_profile: student
"#;

#[allow(dead_code)]
pub fn temp_file(name: &str, contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let path = temp_dir.path().join(name);
    fs::write(&path, contents).expect("failed to write file");
    (temp_dir, path)
}

/// OpenRouter settings pointing at a mock server
#[allow(dead_code)]
pub fn openrouter_config(uri: &str, api_key: Option<&str>) -> OpenRouterConfig {
    OpenRouterConfig {
        api_base: format!("{}/api/v1", uri),
        model: "test/model".to_string(),
        api_key: api_key.map(str::to_string),
        timeout_seconds: 5,
        ..Default::default()
    }
}

#[allow(dead_code)]
pub fn gateway_for(uri: &str, api_key: Option<&str>) -> CompletionGateway {
    let provider = OpenRouterProvider::new(openrouter_config(uri, api_key))
        .expect("failed to create provider");
    CompletionGateway::new(Box::new(provider), "You are a mentor.")
}

#[allow(dead_code)]
pub fn config_for(uri: &str, api_key: Option<&str>) -> Config {
    let mut config = Config::default();
    config.provider.openrouter = openrouter_config(uri, api_key);
    config
}

/// Minimal successful chat-completions body
#[allow(dead_code)]
pub fn completion_body(content: &str) -> serde_json::Value {
    json!({
        "id": "gen-1",
        "object": "chat.completion",
        "model": "test/model",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 12, "completion_tokens": 8, "total_tokens": 20}
    })
}
