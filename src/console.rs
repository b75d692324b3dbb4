//! Line-oriented terminal front end.

use crate::api::{ApiClient, DocumentBackend};
use crate::config::ClientConfig;
use crate::render::{Controls, Renderer, format_message_timestamp};
use crate::session::ChatSession;
use crate::types::{ChatMessage, MessageId, Role, UploadFile};
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};

// Cursor up one line, then erase it.
const ERASE_PREVIOUS_LINE: &str = "\x1b[1A\x1b[2K";

const HELP_TEXT: &str = "\
Commands:
  /upload <path>  upload a PDF to ask questions about
  /files          list documents the server holds
  /help           show this help
  /quit           exit
Anything else is sent as a question about the uploaded document.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Upload(Option<PathBuf>),
    Files,
    Help,
    Quit,
    Unknown(String),
    Send(String),
}

pub fn parse_command(line: &str) -> Command {
    let trimmed = line.trim();
    let Some(rest) = trimmed.strip_prefix('/') else {
        return Command::Send(trimmed.to_string());
    };
    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };
    match name {
        "upload" if arg.is_empty() => Command::Upload(None),
        "upload" => Command::Upload(Some(PathBuf::from(arg))),
        "files" => Command::Files,
        "help" => Command::Help,
        "quit" | "exit" => Command::Quit,
        _ => Command::Unknown(format!("/{name}")),
    }
}

/// Writes the transcript as plain lines.
///
/// A transient message is always the last line written, so removing it only
/// needs to erase that line.
pub struct ConsoleRenderer<W: Write> {
    out: W,
    transient: Option<MessageId>,
    last_controls: Controls,
}

impl<W: Write> ConsoleRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            transient: None,
            last_controls: Controls::default(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: &str) {
        let _ = writeln!(self.out, "{text}");
        let _ = self.out.flush();
    }

    pub fn banner(&mut self, base_url: &str) {
        self.line(&format!("PDF chat, server at {base_url}"));
        self.line("Upload a PDF with /upload <path>, /help lists commands.");
    }

    pub fn print_help(&mut self) {
        self.line(HELP_TEXT);
    }

    pub fn print_files(&mut self, files: &[String]) {
        if files.is_empty() {
            self.line("No documents on the server yet.");
            return;
        }
        self.line("Documents on the server:");
        for file in files {
            self.line(&format!("  📄 {file}"));
        }
    }
}

impl<W: Write> Renderer for ConsoleRenderer<W> {
    fn append_message(&mut self, message: &ChatMessage) {
        let speaker = match message.role {
            Role::User => "you",
            Role::Bot => "bot",
        };
        let text = match format_message_timestamp(message.created_at) {
            Some(ts) => format!("[{ts}] {speaker} › {}", message.content),
            None => format!("{speaker} › {}", message.content),
        };
        self.line(&text);
        self.transient = message.transient.then_some(message.id);
    }

    fn remove_message(&mut self, id: MessageId) {
        if self.transient == Some(id) {
            let _ = write!(self.out, "{ERASE_PREVIOUS_LINE}");
            let _ = self.out.flush();
            self.transient = None;
        }
    }

    fn clear_messages(&mut self) {
        self.transient = None;
        self.line("");
    }

    fn alert(&mut self, text: &str) {
        self.line(&format!("! {text}"));
    }

    fn sync_controls(&mut self, controls: &Controls) {
        if controls.upload_label != self.last_controls.upload_label && !controls.upload_enabled {
            self.line(controls.upload_label);
        }
        if controls.document_label != self.last_controls.document_label
            && let Some(label) = &controls.document_label
        {
            self.line(label);
        }
        self.last_controls = controls.clone();
    }
}

pub async fn read_upload(path: &Path) -> std::io::Result<UploadFile> {
    let bytes = tokio::fs::read(path).await?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(UploadFile::new(name, bytes))
}

/// Reads commands from stdin until `/quit` or end of input.
pub async fn run(config: ClientConfig) -> anyhow::Result<()> {
    let api = ApiClient::new(config.clone());
    let renderer = ConsoleRenderer::new(std::io::stdout());
    let mut session = ChatSession::with_config(api, renderer, &config);
    session.renderer_mut().banner(&config.base_url);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_command(&line) {
            Command::Quit => break,
            Command::Help => session.renderer_mut().print_help(),
            Command::Files => match session.backend().list_files().await {
                Ok(files) => session.renderer_mut().print_files(&files),
                Err(err) => {
                    tracing::warn!(error = %err, "listing files failed");
                    session
                        .renderer_mut()
                        .alert(&format!("Could not list files: {err}"));
                }
            },
            Command::Upload(None) => session.renderer_mut().alert("Usage: /upload <path>"),
            Command::Upload(Some(path)) => match read_upload(&path).await {
                // Outcomes are already shown by the session.
                Ok(file) => {
                    let _ = session.upload(file).await;
                }
                Err(err) => session
                    .renderer_mut()
                    .alert(&format!("Cannot read {}: {err}", path.display())),
            },
            Command::Unknown(name) => session
                .renderer_mut()
                .alert(&format!("Unknown command {name}, try /help")),
            Command::Send(text) => {
                let _ = session.send_message(&text).await;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(renderer: ConsoleRenderer<Vec<u8>>) -> String {
        String::from_utf8(renderer.into_inner()).unwrap()
    }

    fn message(id: u64, role: Role, content: &str, transient: bool) -> ChatMessage {
        ChatMessage {
            id: MessageId(id),
            role,
            content: content.to_string(),
            transient,
            created_at: None,
        }
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            parse_command("/upload ./docs/report.pdf"),
            Command::Upload(Some(PathBuf::from("./docs/report.pdf")))
        );
        assert_eq!(parse_command("/upload"), Command::Upload(None));
        assert_eq!(parse_command("/files"), Command::Files);
        assert_eq!(parse_command(" /quit "), Command::Quit);
        assert_eq!(parse_command("/exit"), Command::Quit);
        assert_eq!(parse_command("/nope"), Command::Unknown("/nope".into()));
        assert_eq!(
            parse_command("  What is the summary?  "),
            Command::Send("What is the summary?".into())
        );
        assert_eq!(parse_command(""), Command::Send(String::new()));
    }

    #[test]
    fn test_messages_are_prefixed_by_speaker() {
        let mut renderer = ConsoleRenderer::new(Vec::new());
        renderer.append_message(&message(1, Role::User, "hello", false));
        renderer.append_message(&message(2, Role::Bot, "hi there", false));
        let text = output(renderer);
        assert!(text.contains("you › hello\n"));
        assert!(text.contains("bot › hi there\n"));
    }

    #[test]
    fn test_only_the_transient_line_is_erased() {
        let mut renderer = ConsoleRenderer::new(Vec::new());
        renderer.append_message(&message(1, Role::User, "q", false));
        renderer.remove_message(MessageId(1));
        renderer.append_message(&message(2, Role::Bot, "💭 Thinking...", true));
        renderer.remove_message(MessageId(2));
        let text = output(renderer);
        assert_eq!(text.matches(ERASE_PREVIOUS_LINE).count(), 1);
        assert!(text.ends_with(ERASE_PREVIOUS_LINE));
    }

    #[test]
    fn test_controls_print_changes_once() {
        let mut renderer = ConsoleRenderer::new(Vec::new());
        let busy = Controls {
            upload_enabled: false,
            upload_label: crate::render::UPLOAD_BUSY_LABEL,
            ..Controls::default()
        };
        renderer.sync_controls(&busy);
        renderer.sync_controls(&busy);
        let loaded = Controls {
            chat_enabled: true,
            document_label: Some("📄 report.pdf".into()),
            ..Controls::default()
        };
        renderer.sync_controls(&loaded);
        let text = output(renderer);
        assert_eq!(text.matches("⏳ Uploading...").count(), 1);
        assert!(text.contains("📄 report.pdf"));
    }

    #[test]
    fn test_print_files() {
        let mut renderer = ConsoleRenderer::new(Vec::new());
        renderer.print_files(&[]);
        renderer.print_files(&["a.pdf".to_string()]);
        let text = output(renderer);
        assert!(text.contains("No documents on the server yet."));
        assert!(text.contains("📄 a.pdf"));
    }
}
