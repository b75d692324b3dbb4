//! Chat session: the uploaded document, the transcript and the handlers that
//! drive them.
//!
//! Both handlers come in two halves. `begin_*` validates input and updates the
//! UI optimistically, handing back a pending token; `finish_*` consumes that
//! token together with the request outcome and restores the controls. UI
//! runtimes that cannot hold the session across an await call the halves
//! directly, everything else can use [`ChatSession::upload`] and
//! [`ChatSession::send_message`].

use crate::api::{ChatError, ChatResult, DocumentBackend};
use crate::config::ClientConfig;
use crate::render::{Controls, Renderer, UPLOAD_BUSY_LABEL, UPLOAD_IDLE_LABEL};
use crate::transcript::Transcript;
use crate::types::{ChatRequest, MessageId, Role, UploadFile, UploadReceipt};
use std::sync::Arc;

pub const THINKING_TEXT: &str = "💭 Thinking...";
pub const CHAT_UNREACHABLE_TEXT: &str =
    "❌ Failed to get response. Please check if the server is running.";
pub const UPLOAD_UNREACHABLE_TEXT: &str =
    "Failed to upload file. Make sure the server is running.";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    #[error("Please select a PDF file")]
    NotPdf,

    #[error("File is too large (limit {} MB)", .limit / (1024 * 1024))]
    TooLarge { size: usize, limit: usize },

    #[error("Please enter a message")]
    EmptyMessage,

    #[error("Please upload a PDF file first")]
    NoDocument,

    #[error("A request is already in flight")]
    Busy,

    #[error(transparent)]
    Api(#[from] ChatError),
}

/// An upload that passed validation and now waits for the server.
#[must_use = "pass the upload outcome to `ChatSession::finish_upload`"]
#[derive(Debug)]
pub struct PendingUpload {
    file: UploadFile,
}

impl PendingUpload {
    pub fn file(&self) -> &UploadFile {
        &self.file
    }
}

/// A chat request whose placeholder is on screen.
#[must_use = "pass the chat outcome to `ChatSession::finish_send`"]
#[derive(Debug)]
pub struct PendingChat {
    request: ChatRequest,
    placeholder: MessageId,
}

impl PendingChat {
    pub fn request(&self) -> &ChatRequest {
        &self.request
    }

    pub fn placeholder(&self) -> MessageId {
        self.placeholder
    }
}

pub fn upload_success_text(filename: &str) -> String {
    format!(
        "✅ PDF uploaded successfully! I've read \"{filename}\". You can now ask me questions about its content."
    )
}

pub struct ChatSession<B, R> {
    backend: Arc<B>,
    renderer: R,
    transcript: Transcript,
    filename: Option<String>,
    max_upload_bytes: usize,
    chat_in_flight: bool,
    upload_in_flight: bool,
}

impl<B: DocumentBackend, R: Renderer> ChatSession<B, R> {
    pub fn new(backend: B, renderer: R) -> Self {
        Self::with_config(backend, renderer, &ClientConfig::default())
    }

    pub fn with_config(backend: B, renderer: R, config: &ClientConfig) -> Self {
        Self {
            backend: Arc::new(backend),
            renderer,
            transcript: Transcript::new(),
            filename: None,
            max_upload_bytes: config.max_upload_bytes,
            chat_in_flight: false,
            upload_in_flight: false,
        }
    }

    /// Filename the server confirmed for the active document.
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn backend(&self) -> Arc<B> {
        Arc::clone(&self.backend)
    }

    pub fn controls(&self) -> Controls {
        Controls {
            chat_enabled: self.filename.is_some() && !self.chat_in_flight,
            upload_enabled: !self.upload_in_flight,
            upload_label: if self.upload_in_flight {
                UPLOAD_BUSY_LABEL
            } else {
                UPLOAD_IDLE_LABEL
            },
            document_label: self.filename.as_ref().map(|name| format!("📄 {name}")),
        }
    }

    fn sync_controls(&mut self) {
        let controls = self.controls();
        self.renderer.sync_controls(&controls);
    }

    fn reject(&mut self, err: SessionError) -> SessionError {
        tracing::debug!(error = %err, "input rejected");
        if err != SessionError::Busy {
            self.renderer.alert(&err.to_string());
        }
        err
    }

    pub fn begin_upload(&mut self, file: UploadFile) -> Result<PendingUpload, SessionError> {
        if self.upload_in_flight {
            return Err(self.reject(SessionError::Busy));
        }
        if !file.is_pdf() {
            return Err(self.reject(SessionError::NotPdf));
        }
        if file.len() > self.max_upload_bytes {
            return Err(self.reject(SessionError::TooLarge {
                size: file.len(),
                limit: self.max_upload_bytes,
            }));
        }

        tracing::debug!(name = %file.name, bytes = file.len(), "uploading document");
        self.upload_in_flight = true;
        self.sync_controls();
        Ok(PendingUpload { file })
    }

    /// Settles an upload. The upload control is restored whatever the outcome.
    pub fn finish_upload(
        &mut self,
        pending: PendingUpload,
        result: ChatResult<UploadReceipt>,
    ) -> Result<String, SessionError> {
        self.upload_in_flight = false;
        let outcome = match result {
            Ok(receipt) => {
                tracing::info!(
                    filename = %receipt.filename,
                    text_length = ?receipt.text_length,
                    "document uploaded"
                );
                self.transcript.clear(&mut self.renderer);
                self.transcript.push(
                    Role::Bot,
                    upload_success_text(&receipt.filename),
                    false,
                    &mut self.renderer,
                );
                self.filename = Some(receipt.filename.clone());
                Ok(receipt.filename)
            }
            Err(err) => {
                tracing::warn!(name = %pending.file.name, error = %err, "upload failed");
                let text = match err.server_message() {
                    Some(message) => format!("Error: {message}"),
                    None => UPLOAD_UNREACHABLE_TEXT.to_string(),
                };
                self.renderer.alert(&text);
                Err(SessionError::Api(err))
            }
        };
        self.sync_controls();
        outcome
    }

    pub async fn upload(&mut self, file: UploadFile) -> Result<String, SessionError> {
        let pending = self.begin_upload(file)?;
        let result = self.backend.upload(pending.file()).await;
        self.finish_upload(pending, result)
    }

    pub fn begin_send(&mut self, text: &str) -> Result<PendingChat, SessionError> {
        let message = text.trim();
        if message.is_empty() {
            return Err(self.reject(SessionError::EmptyMessage));
        }
        let Some(filename) = self.filename.clone() else {
            return Err(self.reject(SessionError::NoDocument));
        };
        if self.chat_in_flight {
            return Err(self.reject(SessionError::Busy));
        }

        self.transcript
            .push(Role::User, message, false, &mut self.renderer);
        self.renderer.clear_input();
        self.chat_in_flight = true;
        self.sync_controls();
        let placeholder = self
            .transcript
            .push(Role::Bot, THINKING_TEXT, true, &mut self.renderer);

        Ok(PendingChat {
            request: ChatRequest {
                message: message.to_string(),
                filename,
            },
            placeholder,
        })
    }

    /// Settles a chat request: swaps the placeholder for the answer (or an
    /// error message), then re-enables and focuses the input.
    pub fn finish_send(
        &mut self,
        pending: PendingChat,
        result: ChatResult<String>,
    ) -> Result<String, SessionError> {
        self.transcript
            .remove_transient(pending.placeholder, &mut self.renderer);

        let outcome = match result {
            Ok(answer) => {
                tracing::info!(filename = %pending.request.filename, "answer received");
                self.transcript
                    .push(Role::Bot, answer.clone(), false, &mut self.renderer);
                Ok(answer)
            }
            Err(err) => {
                tracing::warn!(filename = %pending.request.filename, error = %err, "chat failed");
                let text = match err.server_message() {
                    Some(message) => format!("❌ Error: {message}"),
                    None => CHAT_UNREACHABLE_TEXT.to_string(),
                };
                self.transcript
                    .push(Role::Bot, text, false, &mut self.renderer);
                Err(SessionError::Api(err))
            }
        };

        self.chat_in_flight = false;
        self.sync_controls();
        self.renderer.focus_input();
        outcome
    }

    pub async fn send_message(&mut self, text: &str) -> Result<String, SessionError> {
        let pending = self.begin_send(text)?;
        let result = self.backend.chat(pending.request()).await;
        self.finish_send(pending, result)
    }
}
