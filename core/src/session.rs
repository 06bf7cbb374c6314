//! Application context tying the request builder, a transport and the auth
//! store together.
//!
//! # Design
//! `Session` is passed explicitly to whatever issues requests; there is no
//! process-wide auth state. It executes `ApiClient` requests through the
//! host's [`Transport`] and folds transport failures into [`ApiError`], so
//! every call below has a single error type.

use crate::auth::AuthStore;
use crate::client::ApiClient;
use crate::config::Config;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse, Transport};
use crate::resource::Resource;
use crate::types::{Credentials, Page, ProfilePayload, User};

pub struct Session<T> {
    client: ApiClient,
    transport: T,
    auth: AuthStore,
}

impl<T: Transport> Session<T> {
    /// The client picks up any token already held by `auth`.
    pub fn new(client: ApiClient, transport: T, auth: AuthStore) -> Self {
        let client = client.with_token(auth.token().map(str::to_string));
        Self {
            client,
            transport,
            auth,
        }
    }

    pub fn from_config(config: &Config, transport: T) -> Result<Self, ApiError> {
        let auth = AuthStore::load(config.auth_file())?;
        Ok(Self::new(ApiClient::new(config.api_url()), transport, auth))
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn auth(&self) -> &AuthStore {
        &self.auth
    }

    pub fn current_user(&self) -> Option<&User> {
        self.auth.current_user()
    }

    pub fn is_signed_in(&self) -> bool {
        self.auth.is_signed_in()
    }

    fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let method = request.method;
        let url = request.url.clone();
        tracing::debug!(%method, %url, "sending request");
        let response = self.transport.execute(request).map_err(|err| {
            tracing::warn!(%method, %url, error = %err, "transport failure");
            ApiError::from(err)
        })?;
        tracing::debug!(%method, %url, status = response.status, "response received");
        Ok(response)
    }

    // -- account -----------------------------------------------------------

    pub fn login(&mut self, credentials: &Credentials) -> Result<User, ApiError> {
        let request = self.client.build_login(credentials)?;
        let response = self.client.parse_login(self.send(request)?)?;
        self.auth.set(response.user.clone(), response.token.clone())?;
        self.client.set_token(Some(response.token));
        tracing::info!(user_id = response.user.id, "signed in");
        Ok(response.user)
    }

    pub fn logout(&mut self) -> Result<(), ApiError> {
        self.auth.clear()?;
        self.client.set_token(None);
        tracing::info!("signed out");
        Ok(())
    }

    fn user_id(&self) -> Result<i64, ApiError> {
        self.auth
            .current_user()
            .map(|user| user.id)
            .ok_or_else(|| ApiError::Unauthorized("no user signed in".to_string()))
    }

    pub fn update_profile(&mut self, payload: &ProfilePayload) -> Result<User, ApiError> {
        let request = self.client.build_update_profile(self.user_id()?, payload)?;
        let user = self.client.parse_user(self.send(request)?)?;
        self.auth.set_user(user.clone())?;
        Ok(user)
    }

    pub fn upload_avatar(&mut self, file_name: &str, content_type: &str, bytes: Vec<u8>) -> Result<User, ApiError> {
        let request = self
            .client
            .build_upload_avatar(self.user_id()?, file_name, content_type, bytes);
        let user = self.client.parse_user(self.send(request)?)?;
        self.auth.set_user(user.clone())?;
        Ok(user)
    }

    // -- CRUD --------------------------------------------------------------

    pub fn list<R: Resource>(&self, page: Option<u32>) -> Result<Page<R>, ApiError> {
        let response = self.send(self.client.build_list::<R>(page))?;
        self.client.parse_list(response)
    }

    pub fn get<R: Resource>(&self, id: i64) -> Result<R, ApiError> {
        let response = self.send(self.client.build_get::<R>(id))?;
        self.client.parse_get(response)
    }

    pub fn create<R: Resource>(&self, payload: &R::Payload) -> Result<R, ApiError> {
        let response = self.send(self.client.build_create::<R>(payload)?)?;
        let created: R = self.client.parse_create(response)?;
        tracing::info!(resource = R::COLLECTION, id = created.id(), "created");
        Ok(created)
    }

    pub fn update<R: Resource>(&self, id: i64, payload: &R::Payload) -> Result<R, ApiError> {
        let response = self.send(self.client.build_update::<R>(id, payload)?)?;
        let updated = self.client.parse_update(response)?;
        tracing::info!(resource = R::COLLECTION, id, "updated");
        Ok(updated)
    }

    pub fn delete<R: Resource>(&self, id: i64) -> Result<(), ApiError> {
        let response = self.send(self.client.build_delete::<R>(id))?;
        self.client.parse_delete(response)?;
        tracing::info!(resource = R::COLLECTION, id, "deleted");
        Ok(())
    }
}
