pub mod api;
pub mod config;
pub mod console;
pub mod render;
pub mod session;
pub mod transcript;
pub mod types;

#[cfg(feature = "dioxus")]
pub mod ui;
#[cfg(feature = "dioxus")]
pub mod views;
