//! Error types for the clinic API client.
//!
//! # Design
//! Every request-issuing call returns `Result<T, ApiError>`. HTTP failure
//! statuses, transport failures and local persistence failures all land in
//! the same enum so callers branch once. `NotFound` and `Unauthorized` get
//! their own variants because screens react to them differently (fallback
//! label, sign-in redirect).

use crate::auth::AuthStoreError;
use crate::http::{HttpResponse, TransportError};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// 401/403: the token is missing, expired or rejected.
    #[error("not authorized: {0}")]
    Unauthorized(String),

    /// 404: the requested record does not exist.
    #[error("resource not found")]
    NotFound,

    /// Any other non-2xx status.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Storage(#[from] AuthStoreError),
}

impl ApiError {
    /// Map a non-success response to the matching variant.
    pub fn from_response(response: &HttpResponse) -> Self {
        let message = detail_message(&response.body);
        match response.status {
            401 | 403 => ApiError::Unauthorized(message),
            404 => ApiError::NotFound,
            status => ApiError::Http { status, message },
        }
    }

    /// Short text suitable for a toast.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Unauthorized(_) => "Sessão expirada. Faça login novamente.".to_string(),
            ApiError::NotFound => "Registro não encontrado.".to_string(),
            ApiError::Http { message, .. } if !message.is_empty() => message.clone(),
            ApiError::Transport(_) => "Falha de comunicação com o servidor.".to_string(),
            _ => "Ocorreu um erro inesperado.".to_string(),
        }
    }
}

/// Pull a human-readable message out of an error body.
///
/// The API answers with `{"detail": "..."}` for most failures and with
/// `{"field": ["msg", ...]}` for validation failures; anything else is
/// returned verbatim.
fn detail_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return body.trim().to_string();
    };
    if let Some(detail) = value.get("detail").and_then(|d| d.as_str()) {
        return detail.to_string();
    }
    if let Some(fields) = value.as_object() {
        let messages: Vec<String> = fields
            .iter()
            .filter_map(|(field, msgs)| {
                let first = msgs.as_array()?.first()?.as_str()?;
                Some(format!("{field}: {first}"))
            })
            .collect();
        if !messages.is_empty() {
            return messages.join("; ");
        }
    }
    body.trim().to_string()
}
