//! QualAI backend API abstraction layer.
//!
//! The `QualAiApi` trait is the sole interface for HTTP interactions with
//! the QualAI backend. All network requests live in the `api/` directory;
//! upper layers (the client manager, the upload pipeline) call through this
//! trait and never construct HTTP requests directly, so a backend revision
//! only touches this module.

use std::future::Future;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::files::walker::CollectedFile;

/// One entry of the flat document listing.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentSummary {
    pub key: String,
}

/// A single chat exchange line as the backend stores it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub content: String,
    pub is_user: bool,
}

/// Everything needed for one multipart upload request: the collected files
/// (relative path as the part filename) and the optional target project.
#[derive(Debug)]
pub struct UploadParams {
    pub files: Vec<CollectedFile<PathBuf>>,
    pub project: Option<String>,
}

pub trait QualAiApi: Send + Sync {
    /// Backend connectivity check (`GET /health`).
    fn health(&self) -> impl Future<Output = Result<()>> + Send;

    /// Flat list of document keys (`GET /documents`).
    fn list_documents(&self) -> impl Future<Output = Result<Vec<DocumentSummary>>> + Send;

    /// Transcript content for one document (`GET /documents/{key}`).
    fn read_document(&self, key: &str) -> impl Future<Output = Result<String>> + Send;

    /// Replace a document's content (`PATCH /edit/{key}`).
    fn save_document(&self, key: &str, content: &str) -> impl Future<Output = Result<()>> + Send;

    /// Rename a document (`PATCH /edit/{key}` with a `name` field).
    fn rename_document(&self, key: &str, name: &str) -> impl Future<Output = Result<()>> + Send;

    /// Remove a document (`DELETE /delete/{key}`).
    fn delete_document(&self, key: &str) -> impl Future<Output = Result<()>> + Send;

    /// Multipart upload of collected files (`POST /upload`). Only the
    /// success status of the response is interpreted.
    fn upload(&self, params: UploadParams) -> impl Future<Output = Result<()>> + Send;

    /// Send one chat message, returning the assistant reply (`POST /chat`).
    fn chat(&self, message: &str) -> impl Future<Output = Result<String>> + Send;

    /// Previous chat exchanges, oldest first (`GET /chathistory`).
    fn chat_history(&self) -> impl Future<Output = Result<Vec<ChatMessage>>> + Send;

    /// Names of existing projects (`GET /projects`).
    fn list_projects(&self) -> impl Future<Output = Result<Vec<String>>> + Send;

    /// Create a new project collection (`POST /project/{name}`).
    fn create_project(&self, name: &str) -> impl Future<Output = Result<()>> + Send;
}

pub mod v1;
