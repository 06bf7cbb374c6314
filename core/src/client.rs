//! Stateless HTTP request builder and response parser for the clinic API.
//!
//! # Design
//! `ApiClient` holds the base URL and the bearer token, nothing else. Each
//! operation is split into a `build_*` method that produces an `HttpRequest`
//! and a `parse_*` method that consumes an `HttpResponse`; the host executes
//! the round-trip in between. CRUD methods are generic over [`Resource`], so
//! adding an entity means one trait impl rather than five functions.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, MultipartForm, RequestBody};
use crate::resource::Resource;
use crate::types::{Credentials, LoginResponse, Page, ProfilePayload, User};

const LOGIN_PATH: &str = "login/";
const USER_DETAIL: &str = "usuario";

/// Field name the API expects for the avatar file.
pub const AVATAR_FIELD: &str = "avatar";

#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: HttpMethod, path: &str, body: Option<RequestBody>, authed: bool) -> HttpRequest {
        let mut headers = Vec::new();
        if let Some(body) = &body {
            headers.push(("content-type".to_string(), body.content_type()));
        }
        if authed {
            if let Some(token) = &self.token {
                headers.push(("authorization".to_string(), format!("Bearer {token}")));
            }
        }
        HttpRequest {
            method,
            url: format!("{}/{path}", self.base_url),
            headers,
            body,
        }
    }

    fn json_request<T: Serialize>(
        &self,
        method: HttpMethod,
        path: &str,
        payload: &T,
        authed: bool,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(payload).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(self.request(method, path, Some(RequestBody::Json(body)), authed))
    }

    // -- generic CRUD ------------------------------------------------------

    pub fn build_list<R: Resource>(&self, page: Option<u32>) -> HttpRequest {
        let path = match page {
            Some(page) => format!("{}/?page={page}", R::COLLECTION),
            None => format!("{}/", R::COLLECTION),
        };
        self.request(HttpMethod::Get, &path, None, true)
    }

    pub fn build_get<R: Resource>(&self, id: i64) -> HttpRequest {
        self.request(HttpMethod::Get, &detail_path::<R>(id), None, true)
    }

    pub fn build_create<R: Resource>(&self, payload: &R::Payload) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, &format!("{}/", R::COLLECTION), payload, true)
    }

    pub fn build_update<R: Resource>(&self, id: i64, payload: &R::Payload) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Put, &detail_path::<R>(id), payload, true)
    }

    pub fn build_delete<R: Resource>(&self, id: i64) -> HttpRequest {
        self.request(HttpMethod::Delete, &detail_path::<R>(id), None, true)
    }

    pub fn parse_list<R: Resource>(&self, response: HttpResponse) -> Result<Page<R>, ApiError> {
        parse_json(response)
    }

    pub fn parse_get<R: Resource>(&self, response: HttpResponse) -> Result<R, ApiError> {
        parse_json(response)
    }

    pub fn parse_create<R: Resource>(&self, response: HttpResponse) -> Result<R, ApiError> {
        parse_json(response)
    }

    pub fn parse_update<R: Resource>(&self, response: HttpResponse) -> Result<R, ApiError> {
        parse_json(response)
    }

    pub fn parse_delete(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }

    // -- account -----------------------------------------------------------

    /// Sign-in never carries a bearer token, even a stale one.
    pub fn build_login(&self, credentials: &Credentials) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, LOGIN_PATH, credentials, false)
    }

    pub fn parse_login(&self, response: HttpResponse) -> Result<LoginResponse, ApiError> {
        parse_json(response)
    }

    pub fn build_update_profile(&self, user_id: i64, payload: &ProfilePayload) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Put, &format!("{USER_DETAIL}/{user_id}/"), payload, true)
    }

    pub fn build_upload_avatar(
        &self,
        user_id: i64,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> HttpRequest {
        let form = MultipartForm::new().file(AVATAR_FIELD, file_name, content_type, bytes);
        self.request(
            HttpMethod::Post,
            &format!("{USER_DETAIL}/{user_id}/avatar/"),
            Some(RequestBody::Multipart(form)),
            true,
        )
    }

    pub fn parse_user(&self, response: HttpResponse) -> Result<User, ApiError> {
        parse_json(response)
    }
}

fn detail_path<R: Resource>(id: i64) -> String {
    format!("{}/{id}/", R::DETAIL)
}

/// Any 2xx is success; everything else becomes a structured `ApiError`.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        Ok(())
    } else {
        Err(ApiError::from_response(response))
    }
}

fn parse_json<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    check_status(&response)?;
    serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
}
