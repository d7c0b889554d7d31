use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualAiConfig {
    pub server_url: String,
    pub project: Option<String>,
    pub request_timeout_secs: u64,
    pub autosave_delay_ms: u64,
}

impl Default for QualAiConfig {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:5001".to_string(),
            project: None,
            request_timeout_secs: 30,
            autosave_delay_ms: 1500,
        }
    }
}
