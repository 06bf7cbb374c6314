//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! Requests and responses are plain data. `ApiClient` builds `HttpRequest`
//! values and parses `HttpResponse` values without touching the network; a
//! host-supplied [`Transport`] performs the actual round-trip. Multipart
//! uploads are described as parts and only turned into bytes by
//! [`MultipartForm::encode`], so the host never needs a multipart library.

use std::fmt;

use uuid::Uuid;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body attached to a request.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Serialized JSON document, sent as `application/json`.
    Json(String),
    /// Form-data upload, sent as `multipart/form-data`.
    Multipart(MultipartForm),
}

impl RequestBody {
    /// Value for the `content-type` header.
    pub fn content_type(&self) -> String {
        match self {
            RequestBody::Json(_) => "application/json".to_string(),
            RequestBody::Multipart(form) => form.content_type(),
        }
    }

    /// Bytes to put on the wire.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            RequestBody::Json(json) => json.as_bytes().to_vec(),
            RequestBody::Multipart(form) => form.encode(),
        }
    }

    /// The JSON text, if this is a JSON body.
    pub fn as_json(&self) -> Option<&str> {
        match self {
            RequestBody::Json(json) => Some(json),
            RequestBody::Multipart(_) => None,
        }
    }
}

/// One field of a multipart form.
#[derive(Debug, Clone, PartialEq)]
pub enum FormPart {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        file_name: String,
        content_type: String,
        bytes: Vec<u8>,
    },
}

/// A `multipart/form-data` body described as data.
#[derive(Debug, Clone, PartialEq)]
pub struct MultipartForm {
    boundary: String,
    parts: Vec<FormPart>,
}

impl Default for MultipartForm {
    fn default() -> Self {
        Self::new()
    }
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::with_boundary(format!("clinica-{}", Uuid::new_v4().simple()))
    }

    /// Fixed boundary, used by tests that compare encoded output.
    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
            parts: Vec::new(),
        }
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.parts.push(FormPart::Text {
            name: name.to_string(),
            value: value.to_string(),
        });
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, bytes: Vec<u8>) -> Self {
        self.parts.push(FormPart::File {
            name: name.to_string(),
            file_name: file_name.to_string(),
            content_type: content_type.to_string(),
            bytes,
        });
        self
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    pub fn parts(&self) -> &[FormPart] {
        &self.parts
    }

    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Encode the parts per RFC 7578.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for part in &self.parts {
            out.extend_from_slice(format!("--{}\r\n", self.boundary).as_bytes());
            match part {
                FormPart::Text { name, value } => {
                    out.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                    );
                    out.extend_from_slice(value.as_bytes());
                }
                FormPart::File {
                    name,
                    file_name,
                    content_type,
                    bytes,
                } => {
                    out.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                             Content-Type: {content_type}\r\n\r\n"
                        )
                        .as_bytes(),
                    );
                    out.extend_from_slice(bytes);
                }
            }
            out.extend_from_slice(b"\r\n");
        }
        out.extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        out
    }
}

/// An HTTP request described as plain data.
///
/// Built by `ApiClient::build_*` methods. The host executes it and hands the
/// resulting `HttpResponse` back to the matching `parse_*` method.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<RequestBody>,
}

impl HttpRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Network-level failure: the request never produced a response.
#[derive(Debug, Clone, thiserror::Error)]
#[error("transport failure for {method} {url}: {message}")]
pub struct TransportError {
    pub method: HttpMethod,
    pub url: String,
    pub message: String,
}

impl TransportError {
    pub fn new(request: &HttpRequest, message: impl Into<String>) -> Self {
        Self {
            method: request.method,
            url: request.url.clone(),
            message: message.into(),
        }
    }
}

/// Executes `HttpRequest`s on behalf of the core.
///
/// HTTP error statuses are *responses*, not errors: an implementation must
/// return `Ok` for a 404 or 500 and reserve `Err` for connection, TLS or
/// timeout failures.
pub trait Transport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multipart_encodes_text_and_file_parts() {
        let form = MultipartForm::with_boundary("XYZ")
            .text("nome", "Ana")
            .file("avatar", "a.png", "image/png", vec![1, 2, 3]);
        let bytes = form.encode();
        let mut expected = b"--XYZ\r\nContent-Disposition: form-data; name=\"nome\"\r\n\r\nAna\r\n".to_vec();
        expected.extend_from_slice(
            b"--XYZ\r\nContent-Disposition: form-data; name=\"avatar\"; filename=\"a.png\"\r\nContent-Type: image/png\r\n\r\n",
        );
        expected.extend_from_slice(&[1, 2, 3]);
        expected.extend_from_slice(b"\r\n--XYZ--\r\n");
        assert_eq!(bytes, expected);
        assert_eq!(form.content_type(), "multipart/form-data; boundary=XYZ");
    }

    #[test]
    fn generated_boundaries_differ() {
        assert_ne!(MultipartForm::new().boundary(), MultipartForm::new().boundary());
    }

    #[test]
    fn header_lookup_ignores_case() {
        let req = HttpRequest {
            method: HttpMethod::Get,
            url: "http://x/".to_string(),
            headers: vec![("Authorization".to_string(), "Bearer t".to_string())],
            body: None,
        };
        assert_eq!(req.header("authorization"), Some("Bearer t"));
        assert_eq!(req.header("content-type"), None);
    }

    #[test]
    fn success_covers_2xx_only() {
        assert!(HttpResponse::new(204, "").is_success());
        assert!(!HttpResponse::new(301, "").is_success());
        assert!(!HttpResponse::new(404, "").is_success());
    }
}
