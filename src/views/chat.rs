use crate::api::{ApiClient, DocumentBackend};
use crate::config::ClientConfig;
use crate::render::{Controls, Renderer, format_message_timestamp};
use crate::session::ChatSession;
use crate::types::{ChatMessage, MessageId, UploadFile};
use dioxus::events::Key;
use dioxus::prelude::*;
use std::path::Path;
use std::rc::Rc;

const CHAT_LIST_ID: &str = "chat-messages";
const WELCOME_TEXT: &str = "👋 Upload a PDF file to start asking questions about it.";
const SCROLL_SCRIPT: &str = r#"
const list = document.getElementById("chat-messages");
if (list) { list.scrollTop = list.scrollHeight; }
"#;

/// Renderer backed by component signals.
///
/// Focus and scroll requests are counters; effects in [`ChatView`] act on
/// them after the DOM has caught up with the latest control state.
#[derive(Clone, Copy)]
struct SignalRenderer {
    messages: Signal<Vec<ChatMessage>>,
    notice: Signal<Option<String>>,
    controls: Signal<Controls>,
    input: Signal<String>,
    focus_requests: Signal<u64>,
    scroll_requests: Signal<u64>,
}

impl Renderer for SignalRenderer {
    fn append_message(&mut self, message: &ChatMessage) {
        let message = message.clone();
        self.messages.with_mut(|msgs| msgs.push(message));
    }

    fn remove_message(&mut self, id: MessageId) {
        self.messages.with_mut(|msgs| msgs.retain(|msg| msg.id != id));
    }

    fn clear_messages(&mut self) {
        self.messages.set(Vec::new());
    }

    fn alert(&mut self, text: &str) {
        self.notice.set(Some(text.to_string()));
    }

    fn scroll_to_latest(&mut self) {
        self.scroll_requests.with_mut(|n| *n += 1);
    }

    fn sync_controls(&mut self, controls: &Controls) {
        self.controls.set(controls.clone());
    }

    fn clear_input(&mut self) {
        self.input.set(String::new());
    }

    fn focus_input(&mut self) {
        self.focus_requests.with_mut(|n| *n += 1);
    }
}

fn message_class(msg: &ChatMessage) -> String {
    let loading = if msg.transient { " loading" } else { "" };
    format!("message {}-message{loading}", msg.role.as_str())
}

fn display_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}

#[component]
pub fn ChatView() -> Element {
    let messages = use_signal(Vec::<ChatMessage>::new);
    let mut notice = use_signal(|| Option::<String>::None);
    let controls = use_signal(Controls::default);
    let mut input = use_signal(String::new);
    let focus_requests = use_signal(|| 0u64);
    let scroll_requests = use_signal(|| 0u64);
    let mut input_node = use_signal(|| Option::<Rc<MountedData>>::None);

    let session = use_signal(|| {
        let renderer = SignalRenderer {
            messages,
            notice,
            controls,
            input,
            focus_requests,
            scroll_requests,
        };
        ChatSession::new(ApiClient::new(ClientConfig::default()), renderer)
    });

    use_effect(move || {
        if focus_requests() == 0 {
            return;
        }
        if let Some(node) = input_node.peek().clone() {
            spawn(async move {
                let _ = node.set_focus(true).await;
            });
        }
    });

    use_effect(move || {
        if scroll_requests() > 0 {
            let _ = document::eval(SCROLL_SCRIPT);
        }
    });

    let send_message = move |text: String| {
        spawn(async move {
            let mut session = session;
            // Rejections are already on screen as notices.
            let started = session.write().begin_send(&text);
            let Ok(pending) = started else {
                return;
            };
            let backend = session.peek().backend();
            let result = backend.chat(pending.request()).await;
            let _ = session.write().finish_send(pending, result);
        });
    };

    let on_file_selected = move |evt: FormEvent| {
        spawn(async move {
            let mut session = session;
            let Some(engine) = evt.files() else {
                return;
            };
            let Some(path) = engine.files().into_iter().next() else {
                return;
            };
            let Some(bytes) = engine.read_file(&path).await else {
                tracing::warn!(%path, "could not read selected file");
                session
                    .write()
                    .renderer_mut()
                    .alert("Could not read the selected file");
                return;
            };
            let started = session
                .write()
                .begin_upload(UploadFile::new(display_name(&path), bytes));
            let Ok(pending) = started else {
                return;
            };
            let backend = session.peek().backend();
            let result = backend.upload(pending.file()).await;
            let _ = session.write().finish_upload(pending, result);
        });
    };

    let controls_now = controls();
    let messages_snapshot = messages();
    let upload_class = if controls_now.upload_enabled {
        "btn btn-upload"
    } else {
        "btn btn-upload disabled"
    };

    rsx! {
        div { class: "main-container",
            div { class: "upload-bar",
                label { class: upload_class,
                    "{controls_now.upload_label}"
                    input {
                        class: "file-input",
                        r#type: "file",
                        accept: ".pdf",
                        disabled: !controls_now.upload_enabled,
                        onchange: on_file_selected,
                    }
                }
                if let Some(label) = controls_now.document_label.clone() {
                    span { class: "file-info", "{label}" }
                }
            }

            if let Some(text) = notice() {
                div { class: "notice", role: "alert",
                    span { "{text}" }
                    button {
                        class: "notice-dismiss", r#type: "button",
                        onclick: move |_| notice.set(None),
                        "✕"
                    }
                }
            }

            div { id: CHAT_LIST_ID, class: "chat-list",
                if messages_snapshot.is_empty() {
                    div { class: "message bot-message", "{WELCOME_TEXT}" }
                }
                for msg in messages_snapshot.iter() {
                    div { key: "{msg.id}", id: "{msg.id}", class: message_class(msg),
                        "{msg.content}"
                        if let Some(ts) = format_message_timestamp(msg.created_at) {
                            span { class: "message-timestamp", "{ts}" }
                        }
                    }
                }
            }

            form { class: "composer", onsubmit: move |ev| ev.prevent_default(),
                input {
                    r#type: "text",
                    placeholder: "Ask a question about your PDF...",
                    value: "{input}",
                    disabled: !controls_now.chat_enabled,
                    oninput: move |ev| input.set(ev.value()),
                    onmounted: move |ev| input_node.set(Some(ev.data())),
                    onkeydown: move |ev| {
                        if ev.key() == Key::Enter && controls.peek().chat_enabled {
                            ev.prevent_default();
                            send_message(input());
                        }
                    },
                }
                button {
                    class: "btn btn-primary", r#type: "button",
                    disabled: !controls_now.chat_enabled,
                    onclick: move |_| send_message(input()),
                    "Send"
                }
            }
        }
    }
}
