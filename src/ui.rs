use crate::config::DEFAULT_BASE_URL;
use crate::views::ChatView;
use dioxus::prelude::*;

const PDFCHAT_CSS: Asset = asset!("/assets/pdfchat.css");

#[component]
pub fn App() -> Element {
    rsx! {
        document::Link { rel: "stylesheet", href: PDFCHAT_CSS }
        AppHeader {}
        ChatView {}
    }
}

#[component]
fn AppHeader() -> Element {
    rsx! {
        div { class: "header",
            div { class: "header-content",
                h1 { "📚 PDF Chat" }
                span { class: "header-server", "{DEFAULT_BASE_URL}" }
            }
        }
    }
}
