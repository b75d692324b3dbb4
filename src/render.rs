use crate::types::{ChatMessage, MessageId};
use time::{OffsetDateTime, UtcOffset, format_description::FormatItem, macros::format_description};

pub const UPLOAD_IDLE_LABEL: &str = "📁 Choose PDF File";
pub const UPLOAD_BUSY_LABEL: &str = "⏳ Uploading...";

const MESSAGE_TIME_FORMAT: &[FormatItem<'static>] =
    format_description!("[hour repr:12 padding:zero]:[minute padding:zero] [period case:upper]");

/// Enabled/label state of the input controls.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Controls {
    /// Message input and send button.
    pub chat_enabled: bool,
    pub upload_enabled: bool,
    pub upload_label: &'static str,
    /// Shown next to the upload control once a document is loaded.
    pub document_label: Option<String>,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            chat_enabled: false,
            upload_enabled: true,
            upload_label: UPLOAD_IDLE_LABEL,
            document_label: None,
        }
    }
}

/// Surface the chat session draws on.
///
/// Only the message operations and `alert` are required; the remaining hooks
/// default to no-ops for surfaces without those concepts.
pub trait Renderer {
    fn append_message(&mut self, message: &ChatMessage);

    fn remove_message(&mut self, id: MessageId);

    fn clear_messages(&mut self);

    /// Blocking, user-facing notice.
    fn alert(&mut self, text: &str);

    fn scroll_to_latest(&mut self) {}

    fn sync_controls(&mut self, _controls: &Controls) {}

    fn clear_input(&mut self) {}

    fn focus_input(&mut self) {}
}

pub fn format_message_timestamp(timestamp: Option<OffsetDateTime>) -> Option<String> {
    let mut datetime = timestamp?;
    if let Ok(offset) = UtcOffset::current_local_offset() {
        datetime = datetime.to_offset(offset);
    }
    datetime.format(MESSAGE_TIME_FORMAT).ok()
}
