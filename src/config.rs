/// Base URL of the document server, fixed at build time.
///
/// Builds may point elsewhere by setting `PDFCHAT_API_BASE_URL` while compiling.
pub const DEFAULT_BASE_URL: &str = match option_env!("PDFCHAT_API_BASE_URL") {
    Some(url) => url,
    None => "http://localhost:5000",
};

/// Largest upload the server accepts (16 MB).
pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

#[derive(Clone, Debug, PartialEq)]
pub struct ClientConfig {
    pub base_url: String,
    pub max_upload_bytes: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            max_upload_bytes: MAX_UPLOAD_BYTES,
        }
    }
}

impl ClientConfig {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Joins an endpoint path onto the base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
