// The Dioxus launcher installs its own tracing subscriber.
#[cfg(feature = "dioxus")]
fn main() {
    dioxus::launch(pdfchat::ui::App);
}

#[cfg(not(feature = "dioxus"))]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Stdout carries the transcript, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
    pdfchat::console::run(pdfchat::config::ClientConfig::default()).await
}
