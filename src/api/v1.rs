//! QualAiApiV1 — reqwest implementation of the `QualAiApi` trait against
//! the Flask backend's REST surface.

use serde::Deserialize;

use super::{ChatMessage, DocumentSummary, QualAiApi, UploadParams};
use crate::config::QualAiConfig;
use crate::error::{AppError, Result};

const USER_AGENT: &str = "QualAI-TUI/0.1.0";

#[derive(Debug, Deserialize)]
struct ContentResponse {
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    response: String,
}

#[derive(Debug, Deserialize)]
struct ChatHistoryResponse {
    history: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct ProjectsResponse {
    projects: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct QualAiApiV1 {
    client: reqwest::Client,
    base_url: String,
}

impl QualAiApiV1 {
    pub fn new(config: &QualAiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: config.server_url.trim_end_matches('/').to_string(),
        })
    }

    /// Join an endpoint path onto the configured base URL.
    /// Separated as pub(crate) for unit testing without network.
    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

impl QualAiApi for QualAiApiV1 {
    async fn health(&self) -> Result<()> {
        self.client
            .get(self.endpoint("health"))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn list_documents(&self) -> Result<Vec<DocumentSummary>> {
        let documents = self
            .client
            .get(self.endpoint("documents"))
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<DocumentSummary>>()
            .await?;
        Ok(documents)
    }

    async fn read_document(&self, key: &str) -> Result<String> {
        let body = self
            .client
            .get(self.endpoint(&format!("documents/{key}")))
            .send()
            .await?
            .error_for_status()?
            .json::<ContentResponse>()
            .await?;
        Ok(body.content)
    }

    async fn save_document(&self, key: &str, content: &str) -> Result<()> {
        self.client
            .patch(self.endpoint(&format!("edit/{key}")))
            .json(&serde_json::json!({ "content": content }))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn rename_document(&self, key: &str, name: &str) -> Result<()> {
        self.client
            .patch(self.endpoint(&format!("edit/{key}")))
            .json(&serde_json::json!({ "name": name }))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn delete_document(&self, key: &str) -> Result<()> {
        self.client
            .delete(self.endpoint(&format!("delete/{key}")))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn upload(&self, params: UploadParams) -> Result<()> {
        let mut form = reqwest::multipart::Form::new();
        for collected in &params.files {
            let data = tokio::fs::read(&collected.file)
                .await
                .map_err(|e| AppError::Io(format!("{}: {e}", collected.file.display())))?;
            let part = reqwest::multipart::Part::bytes(data)
                .file_name(collected.path.clone())
                .mime_str("application/octet-stream")
                .map_err(|e| AppError::Internal(format!("MIME parse error: {e}")))?;
            form = form.part("files[]", part);
        }
        if let Some(project) = &params.project {
            form = form.text("project", project.clone());
        }

        self.client
            .post(self.endpoint("upload"))
            .multipart(form)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn chat(&self, message: &str) -> Result<String> {
        let body = self
            .client
            .post(self.endpoint("chat"))
            .json(&serde_json::json!({ "message": message }))
            .send()
            .await?
            .error_for_status()?
            .json::<ChatResponse>()
            .await?;
        Ok(body.response)
    }

    async fn chat_history(&self) -> Result<Vec<ChatMessage>> {
        let body = self
            .client
            .get(self.endpoint("chathistory"))
            .send()
            .await?
            .error_for_status()?
            .json::<ChatHistoryResponse>()
            .await?;
        Ok(body.history)
    }

    async fn list_projects(&self) -> Result<Vec<String>> {
        let body = self
            .client
            .get(self.endpoint("projects"))
            .send()
            .await?
            .error_for_status()?
            .json::<ProjectsResponse>()
            .await?;
        Ok(body.projects)
    }

    async fn create_project(&self, name: &str) -> Result<()> {
        self.client
            .post(self.endpoint(&format!("project/{name}")))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_for(url: &str) -> QualAiApiV1 {
        let config = QualAiConfig {
            server_url: url.to_string(),
            ..QualAiConfig::default()
        };
        QualAiApiV1::new(&config).unwrap()
    }

    #[test]
    fn test_new_creates_instance_successfully() {
        let api = QualAiApiV1::new(&QualAiConfig::default());
        assert!(api.is_ok());
    }

    #[test]
    fn test_endpoint_joins_base_and_path() {
        let api = api_for("http://localhost:5001");
        assert_eq!(api.endpoint("documents"), "http://localhost:5001/documents");
        assert_eq!(
            api.endpoint("documents/a/b.txt"),
            "http://localhost:5001/documents/a/b.txt"
        );
    }

    #[test]
    fn test_endpoint_normalizes_slashes() {
        let api = api_for("http://localhost:5001/");
        assert_eq!(api.endpoint("/health"), "http://localhost:5001/health");
    }

    #[test]
    fn test_document_listing_parses() {
        let body = r#"[{"key": "a.txt"}, {"key": "folder/b.txt"}]"#;
        let documents: Vec<DocumentSummary> = serde_json::from_str(body).unwrap();
        assert_eq!(documents.len(), 2);
        assert_eq!(documents[0].key, "a.txt");
        assert_eq!(documents[1].key, "folder/b.txt");
    }

    #[test]
    fn test_content_response_parses() {
        let body = r#"{"content": "transcript text"}"#;
        let parsed: ContentResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.content, "transcript text");
    }

    #[test]
    fn test_chat_response_parses() {
        let body = r#"{"response": "Hello there"}"#;
        let parsed: ChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.response, "Hello there");
    }

    #[test]
    fn test_chat_history_uses_camel_case_wire_names() {
        let body = r#"{"history": [
            {"content": "hi", "isUser": true},
            {"content": "hello", "isUser": false}
        ]}"#;
        let parsed: ChatHistoryResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.history.len(), 2);
        assert!(parsed.history[0].is_user);
        assert!(!parsed.history[1].is_user);
    }

    #[test]
    fn test_chat_message_serializes_is_user_as_camel_case() {
        let msg = ChatMessage {
            content: "hi".to_string(),
            is_user: true,
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"isUser\":true"), "got: {json}");
    }

    #[test]
    fn test_projects_response_parses() {
        let body = r#"{"projects": ["Initial Collection", "Study A"]}"#;
        let parsed: ProjectsResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.projects, vec!["Initial Collection", "Study A"]);
    }
}
