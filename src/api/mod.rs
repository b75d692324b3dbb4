/// API module for the document server
///
/// The server accepts a PDF upload, extracts its text, and answers questions
/// about it. Everything the session needs from it goes through the
/// [`DocumentBackend`] trait so handlers can run against a scripted backend.
///
/// # Architecture
///
/// - `client` - `ApiClient`, the reqwest implementation of the three endpoints
/// - `error` - `ChatError` taxonomy shared by every backend
///
/// # Usage
///
/// ```rust,no_run
/// use pdfchat::api::{ApiClient, DocumentBackend};
/// use pdfchat::config::ClientConfig;
/// use pdfchat::types::ChatRequest;
///
/// # async fn example() -> pdfchat::api::ChatResult<()> {
/// let api = ApiClient::new(ClientConfig::default());
/// let answer = api
///     .chat(&ChatRequest {
///         message: "What is the summary?".into(),
///         filename: "report.pdf".into(),
///     })
///     .await?;
/// # Ok(())
/// # }
/// ```
mod client;
mod error;

pub use client::ApiClient;
pub use error::{ChatError, ChatResult};

use crate::types::{ChatRequest, UploadFile, UploadReceipt};
use async_trait::async_trait;

#[async_trait]
pub trait DocumentBackend: Send + Sync {
    /// `POST /upload` with the file as multipart field `file`.
    async fn upload(&self, file: &UploadFile) -> ChatResult<UploadReceipt>;

    /// `POST /chat` with `{message, filename}`; returns the answer text.
    async fn chat(&self, request: &ChatRequest) -> ChatResult<String>;

    /// `GET /files`; names of the documents the server currently holds.
    async fn list_files(&self) -> ChatResult<Vec<String>>;
}
