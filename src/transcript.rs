use crate::render::Renderer;
use crate::types::{ChatMessage, MessageId, Role};
use time::OffsetDateTime;

/// Ordered list of the messages shown to the user.
///
/// Messages are append-only. The one exception is a transient placeholder,
/// which can be removed by id once the real answer arrives. Every change is
/// mirrored onto the [`Renderer`] passed in.
#[derive(Debug, Default)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
    // Monotonic; survives `clear` so ids are never reused.
    next_id: u64,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<R: Renderer + ?Sized>(
        &mut self,
        role: Role,
        content: impl Into<String>,
        transient: bool,
        renderer: &mut R,
    ) -> MessageId {
        self.next_id += 1;
        let message = ChatMessage {
            id: MessageId(self.next_id),
            role,
            content: content.into(),
            transient,
            created_at: Some(OffsetDateTime::now_utc()),
        };
        let id = message.id;
        renderer.append_message(&message);
        renderer.scroll_to_latest();
        self.messages.push(message);
        id
    }

    /// Removes a transient message. Returns `false` if `id` is unknown or
    /// names a regular message, which stays untouched.
    pub fn remove_transient<R: Renderer + ?Sized>(&mut self, id: MessageId, renderer: &mut R) -> bool {
        let Some(index) = self
            .messages
            .iter()
            .position(|msg| msg.id == id && msg.transient)
        else {
            return false;
        };
        self.messages.remove(index);
        renderer.remove_message(id);
        true
    }

    pub fn clear<R: Renderer + ?Sized>(&mut self, renderer: &mut R) {
        self.messages.clear();
        renderer.clear_messages();
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn get(&self, id: MessageId) -> Option<&ChatMessage> {
        self.messages.iter().find(|msg| msg.id == id)
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn transient_count(&self) -> usize {
        self.messages.iter().filter(|msg| msg.transient).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct CountingRenderer {
        appended: Vec<MessageId>,
        removed: Vec<MessageId>,
        cleared: usize,
        scrolls: usize,
    }

    impl Renderer for CountingRenderer {
        fn append_message(&mut self, message: &ChatMessage) {
            self.appended.push(message.id);
        }

        fn remove_message(&mut self, id: MessageId) {
            self.removed.push(id);
        }

        fn clear_messages(&mut self) {
            self.cleared += 1;
        }

        fn alert(&mut self, _text: &str) {}

        fn scroll_to_latest(&mut self) {
            self.scrolls += 1;
        }
    }

    #[test]
    fn ids_stay_unique_when_created_back_to_back() {
        let mut renderer = CountingRenderer::default();
        let mut transcript = Transcript::new();
        let ids: Vec<_> = (0..100)
            .map(|i| transcript.push(Role::User, format!("m{i}"), false, &mut renderer))
            .collect();
        let mut deduped = ids.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(deduped.len(), ids.len());
        assert_eq!(renderer.appended, ids);
        assert_eq!(renderer.scrolls, 100);
    }

    #[test]
    fn ids_are_not_reused_after_clear() {
        let mut renderer = CountingRenderer::default();
        let mut transcript = Transcript::new();
        let first = transcript.push(Role::Bot, "hello", false, &mut renderer);
        transcript.clear(&mut renderer);
        let second = transcript.push(Role::Bot, "again", false, &mut renderer);
        assert_ne!(first, second);
        assert_eq!(transcript.len(), 1);
        assert_eq!(renderer.cleared, 1);
    }

    #[test]
    fn removes_only_transient_messages() {
        let mut renderer = CountingRenderer::default();
        let mut transcript = Transcript::new();
        let question = transcript.push(Role::User, "question", false, &mut renderer);
        let thinking = transcript.push(Role::Bot, "💭 Thinking...", true, &mut renderer);
        assert_eq!(transcript.transient_count(), 1);

        assert!(!transcript.remove_transient(question, &mut renderer));
        assert!(transcript.remove_transient(thinking, &mut renderer));
        assert!(!transcript.remove_transient(thinking, &mut renderer));

        assert_eq!(renderer.removed, vec![thinking]);
        assert_eq!(transcript.transient_count(), 0);
        assert_eq!(transcript.last().map(|m| m.id), Some(question));
    }
}
