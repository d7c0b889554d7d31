use anyhow::{anyhow, Result};

use crate::api::v1::QualAiApiV1;
use crate::api::{ChatMessage, QualAiApi};
use crate::config::QualAiConfig;

#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionStatus {
    Connected,
    Connecting,
    Disconnected,
    Error,
}

/// Holds the connection state and routes every backend operation through the
/// v1 API. Shared between the event loop and background tasks behind an
/// `Arc<Mutex<...>>`.
pub struct QualAiClientManager {
    api: QualAiApiV1,
    connection_status: ConnectionStatus,
    project: Option<String>,
    config: QualAiConfig,
}

impl QualAiClientManager {
    pub fn new(config: QualAiConfig) -> Result<Self> {
        let api = QualAiApiV1::new(&config)?;
        Ok(Self {
            api,
            connection_status: ConnectionStatus::Disconnected,
            project: config.project.clone(),
            config,
        })
    }

    /// Point the manager at `server_url` and verify the backend responds to
    /// a health check before reporting Connected.
    pub async fn connect(&mut self, server_url: &str) -> Result<()> {
        self.connection_status = ConnectionStatus::Connecting;
        self.config.server_url = server_url.to_string();
        self.api = QualAiApiV1::new(&self.config)?;

        match self.api.health().await {
            Ok(()) => {
                log::info!("Connected to QualAI backend at {server_url}");
                self.connection_status = ConnectionStatus::Connected;
                Ok(())
            }
            Err(e) => {
                log::error!("Health check failed for {server_url}: {e}");
                self.connection_status = ConnectionStatus::Error;
                Err(anyhow!("Failed to connect to {server_url}: {e}"))
            }
        }
    }

    pub fn disconnect(&mut self) {
        self.connection_status = ConnectionStatus::Disconnected;
    }

    pub fn get_connection_status(&self) -> ConnectionStatus {
        self.connection_status.clone()
    }

    pub fn project(&self) -> Option<&str> {
        self.project.as_deref()
    }

    pub fn set_project(&mut self, project: Option<String>) {
        self.project = project;
    }

    fn ensure_connected(&self) -> Result<()> {
        if self.connection_status != ConnectionStatus::Connected {
            return Err(anyhow!("Not connected to server"));
        }
        Ok(())
    }

    pub async fn list_documents(&self) -> Result<Vec<String>> {
        self.ensure_connected()?;
        let documents = self.api.list_documents().await?;
        Ok(documents.into_iter().map(|d| d.key).collect())
    }

    pub async fn read_document(&self, key: &str) -> Result<String> {
        self.ensure_connected()?;
        Ok(self.api.read_document(key).await?)
    }

    pub async fn save_document(&self, key: &str, content: &str) -> Result<()> {
        self.ensure_connected()?;
        Ok(self.api.save_document(key, content).await?)
    }

    pub async fn rename_document(&self, key: &str, name: &str) -> Result<()> {
        self.ensure_connected()?;
        Ok(self.api.rename_document(key, name).await?)
    }

    pub async fn delete_document(&self, key: &str) -> Result<()> {
        self.ensure_connected()?;
        Ok(self.api.delete_document(key).await?)
    }

    pub async fn chat(&self, message: &str) -> Result<String> {
        self.ensure_connected()?;
        Ok(self.api.chat(message).await?)
    }

    pub async fn chat_history(&self) -> Result<Vec<ChatMessage>> {
        self.ensure_connected()?;
        Ok(self.api.chat_history().await?)
    }

    pub async fn list_projects(&self) -> Result<Vec<String>> {
        self.ensure_connected()?;
        Ok(self.api.list_projects().await?)
    }

    pub async fn create_project(&self, name: &str) -> Result<()> {
        self.ensure_connected()?;
        self.api.create_project(name).await?;
        Ok(())
    }
}
