use serde::de::DeserializeOwned;

use crate::error::{InvoiceError, Result};

/// What a response body holds, judged by its content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Json,
    Html,
    Text,
    Binary,
}

impl BodyKind {
    pub fn of(content_type: Option<&str>) -> Self {
        let Some(ct) = content_type else {
            return BodyKind::Binary;
        };
        let mime = ct
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase();

        if mime == "application/json" || mime.ends_with("+json") {
            BodyKind::Json
        } else if mime == "text/html" {
            BodyKind::Html
        } else if mime.starts_with("text/") {
            BodyKind::Text
        } else {
            BodyKind::Binary
        }
    }
}

/// A fully read HTTP response.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn kind(&self) -> BodyKind {
        BodyKind::of(self.content_type.as_deref())
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Message to show for a failed request. JSON bodies contribute their
    /// `error` (or `message`) field, anything else its raw text.
    pub fn error_message(&self, action: &str) -> String {
        let is_json = self
            .content_type
            .as_deref()
            .is_some_and(|ct| ct.contains("application/json"));

        let message = if is_json {
            serde_json::from_slice::<serde_json::Value>(&self.body)
                .ok()
                .and_then(|v| {
                    ["error", "message"]
                        .iter()
                        .find_map(|key| v.get(*key).and_then(|m| m.as_str()).map(str::to_string))
                        .or_else(|| {
                            let list = v.get("errors")?.as_array()?;
                            let joined: Vec<&str> =
                                list.iter().filter_map(|m| m.as_str()).collect();
                            Some(joined.join("; "))
                        })
                })
        } else {
            Some(self.text())
        };

        match message {
            Some(m) if !m.trim().is_empty() => m.trim().to_string(),
            _ => format!("{action} failed: {}", self.status),
        }
    }

    /// Pass OK responses through; turn anything else into a backend error.
    pub fn ok_or_backend(self, action: &str) -> Result<Self> {
        if self.is_ok() {
            return Ok(self);
        }
        let message = self.error_message(action);
        tracing::warn!(status = self.status, %message, "{action} rejected by server");
        Err(InvoiceError::Backend {
            status: self.status,
            message,
        })
    }

    /// Decode a JSON success body.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body)
            .map_err(|e| InvoiceError::UnexpectedResponse(e.to_string()))
    }
}

/// Preview document returned by the server
#[derive(Debug, Clone, PartialEq)]
pub enum Preview {
    Html(String),
    Image { content_type: String, bytes: Vec<u8> },
}

impl Preview {
    pub fn from_response(response: RawResponse) -> Result<Self> {
        match response.kind() {
            BodyKind::Html | BodyKind::Text => Ok(Preview::Html(response.text())),
            BodyKind::Binary => Ok(Preview::Image {
                content_type: response
                    .content_type
                    .unwrap_or_else(|| "application/octet-stream".to_string()),
                bytes: response.body,
            }),
            BodyKind::Json => Err(InvoiceError::UnexpectedResponse(
                "preview came back as JSON".to_string(),
            )),
        }
    }

    /// File extension to use when writing the preview to disk.
    pub fn extension(&self) -> &'static str {
        match self {
            Preview::Html(_) => "html",
            Preview::Image { content_type, .. } => match content_type.as_str() {
                ct if ct.starts_with("image/png") => "png",
                ct if ct.starts_with("image/jpeg") => "jpg",
                ct if ct.starts_with("application/pdf") => "pdf",
                _ => "bin",
            },
        }
    }

    pub fn bytes(&self) -> &[u8] {
        match self {
            Preview::Html(html) => html.as_bytes(),
            Preview::Image { bytes, .. } => bytes,
        }
    }
}
