use super::{ChatError, ChatResult, DocumentBackend};
use crate::config::ClientConfig;
use crate::types::{ChatRequest, UploadFile, UploadReceipt};
use async_trait::async_trait;
use reqwest::{Client, StatusCode, multipart};
use serde::Deserialize;

const PDF_MIME: &str = "application/pdf";

/// HTTP client for the document server.
///
/// No timeout is configured: a request waits until the server answers or the
/// connection fails.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    config: ClientConfig,
}

// Every endpoint answers with a flat JSON object; fields depend on the route.
#[derive(Debug, Default, Deserialize)]
struct ApiReply {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    filename: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    text_length: Option<usize>,
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    files: Option<Vec<String>>,
}

/// Decodes a response body, mapping error payloads and non-2xx statuses to
/// [`ChatError::Server`] and non-JSON bodies to [`ChatError::Malformed`].
fn decode_reply(status: StatusCode, body: &str) -> ChatResult<ApiReply> {
    let mut reply: ApiReply = serde_json::from_str(body)?;
    if let Some(error) = reply.error.take() {
        return Err(ChatError::server(status.as_u16(), error));
    }
    if !status.is_success() {
        return Err(ChatError::server(
            status.as_u16(),
            format!("server returned {status}"),
        ));
    }
    Ok(reply)
}

fn missing_field(field: &str) -> ChatError {
    ChatError::Malformed(format!("response has no `{field}` field"))
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Uses a preconfigured reqwest client, e.g. one with proxies disabled.
    pub fn with_http_client(config: ClientConfig, client: Client) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn read_reply(response: reqwest::Response) -> ChatResult<ApiReply> {
        let status = response.status();
        let body = response.text().await?;
        decode_reply(status, &body)
    }
}

#[async_trait]
impl DocumentBackend for ApiClient {
    async fn upload(&self, file: &UploadFile) -> ChatResult<UploadReceipt> {
        let part = multipart::Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(PDF_MIME)?;
        let form = multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(self.config.endpoint("upload"))
            .multipart(form)
            .send()
            .await?;

        let reply = Self::read_reply(response).await?;
        let filename = reply.filename.ok_or_else(|| missing_field("filename"))?;
        Ok(UploadReceipt {
            filename,
            message: reply.message,
            text_length: reply.text_length,
        })
    }

    async fn chat(&self, request: &ChatRequest) -> ChatResult<String> {
        let response = self
            .client
            .post(self.config.endpoint("chat"))
            .json(request)
            .send()
            .await?;

        let reply = Self::read_reply(response).await?;
        reply.response.ok_or_else(|| missing_field("response"))
    }

    async fn list_files(&self) -> ChatResult<Vec<String>> {
        let response = self
            .client
            .get(self.config.endpoint("files"))
            .send()
            .await?;

        let reply = Self::read_reply(response).await?;
        reply.files.ok_or_else(|| missing_field("files"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_success_payload() {
        let reply = decode_reply(
            StatusCode::OK,
            r#"{"message":"File uploaded successfully","filename":"report.pdf","text_length":1234}"#,
        )
        .unwrap();
        assert_eq!(reply.filename.as_deref(), Some("report.pdf"));
        assert_eq!(reply.text_length, Some(1234));
    }

    #[test]
    fn error_field_wins_over_status() {
        let err = decode_reply(StatusCode::OK, r#"{"error":"file not found"}"#).unwrap_err();
        assert_eq!(err, ChatError::server(200, "file not found"));

        let err =
            decode_reply(StatusCode::BAD_REQUEST, r#"{"error":"No selected file"}"#).unwrap_err();
        assert_eq!(err.server_message(), Some("No selected file"));
    }

    #[test]
    fn non_success_without_error_field() {
        let err = decode_reply(StatusCode::INTERNAL_SERVER_ERROR, "{}").unwrap_err();
        assert_eq!(
            err.server_message(),
            Some("server returned 500 Internal Server Error")
        );
    }

    #[test]
    fn non_json_body_is_malformed() {
        let err = decode_reply(StatusCode::BAD_GATEWAY, "<html>Bad Gateway</html>").unwrap_err();
        assert!(matches!(err, ChatError::Malformed(_)));
    }
}
