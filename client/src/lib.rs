use std::fmt;
use std::io;
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use reqwest::Url;
use reqwest::blocking::{Client as ReqwestClient, RequestBuilder, Response};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::StatusCode;
use tracing::debug;

use common::ErrorBody;

mod api;
mod queue;
mod storage;

pub use api::{AuthApi, GalleryApi, SearchApi, SystemApi, TagsApi, UploadApi};
pub use queue::{
    DEFAULT_CONCURRENCY, QueueError, QueueStats, UploadFailure, UploadFilter, UploadQueue,
    UploadReport, Uploader, collect_files,
};
pub use storage::{LocalStorage, STORAGE_KEY_THEME, STORAGE_KEY_TOKEN};

pub const NAME: &str = "BooruClient";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const TIMEOUT: Duration = Duration::from_secs(30);
const API_PREFIX: &str = "api/";
const USER_AGENT_VALUE: &str = concat!("BooruClient/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, thiserror::Error)]
pub enum BooruError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Unauthorized: login required")]
    Unauthorized,
    #[error("API error:\n  Status: {status}\n  Message: {body}")]
    Api { status: u16, body: ErrorBody },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
    #[error("Invalid file: {0}")]
    InvalidFile(String),
}

impl BooruError {
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

pub struct BooruClientBuilder {
    timeout: Duration,
    token: Option<String>,
}

impl BooruClientBuilder {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            timeout: TIMEOUT,
            token: None,
        }
    }

    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.trim().is_empty());
        self
    }

    pub fn build(self, base_url: &str) -> Result<BooruClient, BooruError> {
        BooruClient::new(base_url, self.timeout, self.token)
    }
}

impl Default for BooruClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub struct BooruClient {
    base_url: Url,
    client: ReqwestClient,
    token: RwLock<Option<String>>,
}

impl fmt::Debug for BooruClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = if self.has_token() { "***" } else { "none" };
        f.debug_struct("BooruClient")
            .field("base_url", &self.base_url.as_str())
            .field("token", &token)
            .finish_non_exhaustive()
    }
}

impl BooruClient {
    fn new(base_url: &str, timeout: Duration, token: Option<String>) -> Result<Self, BooruError> {
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = ReqwestClient::builder()
            .default_headers(Self::default_headers())
            .timeout(timeout)
            .build()?;

        Ok(Self {
            base_url,
            client,
            token: RwLock::new(token),
        })
    }

    #[must_use]
    pub const fn builder() -> BooruClientBuilder {
        BooruClientBuilder::new()
    }

    #[must_use]
    pub const fn info(&self) -> &Url {
        &self.base_url
    }

    pub fn set_token(&self, token: &str) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token.to_string());
    }

    pub fn clear_token(&self) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    #[must_use]
    pub fn has_token(&self) -> bool {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    #[must_use]
    pub const fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(self)
    }

    #[must_use]
    pub const fn gallery(&self) -> GalleryApi<'_> {
        GalleryApi::new(self)
    }

    #[must_use]
    pub const fn search(&self) -> SearchApi<'_> {
        SearchApi::new(self)
    }

    #[must_use]
    pub const fn system(&self) -> SystemApi<'_> {
        SystemApi::new(self)
    }

    #[must_use]
    pub const fn tags(&self) -> TagsApi<'_> {
        TagsApi::new(self)
    }

    #[must_use]
    pub const fn upload(&self) -> UploadApi<'_> {
        UploadApi::new(self)
    }

    fn url(&self, endpoint: &str) -> Result<Url, BooruError> {
        let endpoint = endpoint.trim_start_matches('/');
        Ok(self.base_url.join(API_PREFIX)?.join(endpoint)?)
    }

    fn default_headers() -> HeaderMap {
        let mut headers = HeaderMap::with_capacity(2);
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers
    }

    /// Attaches the bearer token, read at send time so that a login or
    /// logout applies to the very next request.
    fn authorize(&self, req: RequestBuilder) -> Result<RequestBuilder, BooruError> {
        let token = self
            .token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        match token {
            Some(token) => {
                let mut value = HeaderValue::from_str(&format!("Bearer {token}"))?;
                value.set_sensitive(true);
                Ok(req.header(AUTHORIZATION, value))
            }
            None => Ok(req),
        }
    }

    fn send(&self, req: RequestBuilder) -> Result<Response, BooruError> {
        let response = self.authorize(req)?.send()?;
        debug!(
            "{} {}",
            response.status().as_u16(),
            response.url().path()
        );
        Self::check_status(response)
    }

    fn parse_api_error(status: u16, text: &str) -> BooruError {
        let body = serde_json::from_str(text).unwrap_or_else(|_| ErrorBody::from_text(text));
        BooruError::Api { status, body }
    }

    fn check_status(response: Response) -> Result<Response, BooruError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::UNAUTHORIZED {
            return Err(BooruError::Unauthorized);
        }
        let text = response.text()?;
        Err(Self::parse_api_error(status.as_u16(), &text))
    }

    fn handle_response<T: serde::de::DeserializeOwned>(
        response: Response,
    ) -> Result<T, BooruError> {
        let text = response.text()?;
        Ok(serde_json::from_str(&text)?)
    }

    pub(crate) fn get<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
    ) -> Result<T, BooruError> {
        let url = self.url(endpoint)?;
        let response = self.send(self.client.get(url))?;
        Self::handle_response(response)
    }

    pub(crate) fn get_query<T: serde::de::DeserializeOwned, Q: serde::Serialize + ?Sized>(
        &self,
        endpoint: &str,
        query: &Q,
    ) -> Result<T, BooruError> {
        let url = self.url(endpoint)?;
        let response = self.send(self.client.get(url).query(query))?;
        Self::handle_response(response)
    }

    pub(crate) fn get_raw(&self, endpoint: &str) -> Result<Response, BooruError> {
        let url = self.url(endpoint)?;
        self.send(self.client.get(url))
    }

    pub(crate) fn post<T: serde::de::DeserializeOwned, B: serde::Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: Option<&B>,
    ) -> Result<T, BooruError> {
        let url = self.url(endpoint)?;
        let req = self.client.post(url);
        let req = if let Some(b) = body { req.json(b) } else { req };
        let response = self.send(req)?;
        Self::handle_response(response)
    }

    pub(crate) fn post_unit<B: serde::Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: Option<&B>,
    ) -> Result<(), BooruError> {
        let url = self.url(endpoint)?;
        let req = self.client.post(url);
        let req = if let Some(b) = body { req.json(b) } else { req };
        self.send(req)?;
        Ok(())
    }

    pub(crate) fn post_query<Q: serde::Serialize + ?Sized>(
        &self,
        endpoint: &str,
        query: &Q,
    ) -> Result<(), BooruError> {
        let url = self.url(endpoint)?;
        self.send(self.client.post(url).query(query))?;
        Ok(())
    }

    pub(crate) fn post_text(&self, endpoint: &str, body: &str) -> Result<String, BooruError> {
        let url = self.url(endpoint)?;
        let req = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(body.to_string());
        Ok(self.send(req)?.text()?)
    }

    pub(crate) fn post_raw<B: serde::Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<Response, BooruError> {
        let url = self.url(endpoint)?;
        self.send(self.client.post(url).json(body))
    }

    pub(crate) fn post_multipart(
        &self,
        endpoint: &str,
        form: reqwest::blocking::multipart::Form,
    ) -> Result<(), BooruError> {
        let url = self.url(endpoint)?;
        self.send(self.client.post(url).multipart(form))?;
        Ok(())
    }

    pub(crate) fn put<T: serde::de::DeserializeOwned, B: serde::Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: Option<&B>,
    ) -> Result<T, BooruError> {
        let url = self.url(endpoint)?;
        let req = self.client.put(url);
        let req = if let Some(b) = body { req.json(b) } else { req };
        let response = self.send(req)?;
        Self::handle_response(response)
    }

    pub(crate) fn delete(&self, endpoint: &str) -> Result<(), BooruError> {
        let url = self.url(endpoint)?;
        self.send(self.client.delete(url))?;
        Ok(())
    }

    pub(crate) fn delete_with<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
    ) -> Result<T, BooruError> {
        let url = self.url(endpoint)?;
        let response = self.send(self.client.delete(url))?;
        Self::handle_response(response)
    }
}
