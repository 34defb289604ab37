//! Cookie-credentialed HTTP client with lazy CSRF bootstrapping.
//!
//! One [`ApiClient`] owns one cookie store, so the session cookie and the
//! `csrftoken` cookie set by the server are replayed on every request. Mutating
//! requests (anything but GET/HEAD) first make sure a CSRF token exists, priming
//! it once per client with `POST /api/auth/csrf`, then echo it in `X-CSRFToken`.

use super::errors::ApiError;
use reqwest::{
    Client, Method, Response,
    cookie::{CookieStore, Jar},
    header::CONTENT_TYPE,
    multipart::Form,
};
use serde::{Serialize, de::DeserializeOwned};
use std::{fmt, sync::Arc, time::Duration};
use tokio::sync::OnceCell;
use tracing::{Instrument, debug, info_span, instrument};
use url::Url;

pub const CSRF_COOKIE: &str = "csrftoken";
pub const CSRF_HEADER: &str = "X-CSRFToken";
pub const CSRF_PRIME_PATH: &str = "/api/auth/csrf";
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const JSON_CONTENT_TYPE: &str = "application/json";

/// Request body variants. Multipart forms carry their own boundary, so they never
/// get the JSON content type.
#[derive(Debug)]
pub enum Payload {
    Empty,
    Json(Vec<u8>),
    Multipart(Form),
}

impl Payload {
    /// Serializes `body` as JSON.
    ///
    /// # Errors
    /// Returns `ApiError::Serialization` if `body` cannot be encoded.
    pub fn json<B: Serialize + ?Sized>(body: &B) -> Result<Self, ApiError> {
        serde_json::to_vec(body)
            .map(Self::Json)
            .map_err(|err| ApiError::Serialization(format!("Failed to encode request: {err}")))
    }
}

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Option<Duration>,
    pub user_agent: String,
}

impl ClientConfig {
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim().to_string(),
            timeout: Some(DEFAULT_TIMEOUT),
            user_agent: crate::APP_USER_AGENT.to_string(),
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

pub struct ApiClient {
    http: Client,
    base_url: Url,
    cookies: Arc<Jar>,
    csrf_ready: OnceCell<()>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("csrf_ensured", &self.csrf_ensured())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Builds a client bound to `config.base_url`.
    ///
    /// # Errors
    /// Returns `ApiError::Config` if the base URL is not an absolute http(s) URL or
    /// the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|err| ApiError::Config(format!("Invalid base URL {}: {err}", config.base_url)))?;

        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ApiError::Config(format!(
                "Unsupported scheme {} in base URL",
                base_url.scheme()
            )));
        }

        let cookies = Arc::new(Jar::default());

        let mut builder = Client::builder()
            .user_agent(config.user_agent.as_str())
            .cookie_provider(Arc::clone(&cookies));

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        let http = builder
            .build()
            .map_err(|err| ApiError::Config(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self {
            http,
            base_url,
            cookies,
            csrf_ready: OnceCell::new(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Stores a `Set-Cookie` style cookie for the API origin.
    pub fn add_cookie(&self, cookie: &str) {
        self.cookies.add_cookie_str(cookie, &self.base_url);
    }

    /// Current CSRF token from the cookie store, if any.
    #[must_use]
    pub fn csrf_token(&self) -> Option<String> {
        let header = self.cookies.cookies(&self.base_url)?;
        let cookies = header.to_str().ok()?;

        cookies
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == CSRF_COOKIE)
            .map(|(_, value)| value.to_string())
            .filter(|value| !value.is_empty())
    }

    /// Whether the CSRF guard has already been resolved for this client.
    #[must_use]
    pub fn csrf_ensured(&self) -> bool {
        self.csrf_ready.initialized()
    }

    /// Makes sure a CSRF cookie exists, priming it at most once per client.
    ///
    /// # Errors
    /// Returns an error if the priming request fails; the guard stays unresolved so
    /// the next mutating request tries again.
    pub async fn ensure_csrf(&self) -> Result<(), ApiError> {
        self.csrf_ready
            .get_or_try_init(|| self.prime_csrf())
            .await
            .map(|_| ())
    }

    async fn prime_csrf(&self) -> Result<(), ApiError> {
        if self.csrf_token().is_some() {
            return Ok(());
        }

        let url = self.url(CSRF_PRIME_PATH)?;
        debug!("priming csrf cookie");

        let span = info_span!("http.request", http.method = "POST", url = %url);
        let response = self
            .http
            .post(url)
            .send()
            .instrument(span)
            .await
            .map_err(map_request_error)?;

        check_status(response).await.map(|_| ())
    }

    /// Sends a request and returns the successful response.
    ///
    /// # Errors
    /// Returns an error if CSRF priming fails, the request cannot be sent, or the
    /// server answers with a non-2xx status.
    #[instrument(skip(self, payload))]
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        payload: Payload,
    ) -> Result<Response, ApiError> {
        let mutating = is_mutating(&method);
        if mutating {
            self.ensure_csrf().await?;
        }

        let url = self.url(path)?;
        let mut builder = self.http.request(method.clone(), url.clone());

        if mutating {
            if let Some(token) = self.csrf_token() {
                builder = builder.header(CSRF_HEADER, token);
            }
        }

        builder = match payload {
            Payload::Empty => builder.header(CONTENT_TYPE, JSON_CONTENT_TYPE),
            Payload::Json(body) => builder.header(CONTENT_TYPE, JSON_CONTENT_TYPE).body(body),
            Payload::Multipart(form) => builder.multipart(form),
        };

        let span = info_span!("http.request", http.method = %method, url = %url);
        let response = builder
            .send()
            .instrument(span)
            .await
            .map_err(map_request_error)?;

        check_status(response).await
    }

    /// Sends a request and decodes a JSON response.
    ///
    /// # Errors
    /// See [`ApiClient::send`]; also fails with `ApiError::Parse` on an undecodable body.
    pub async fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        payload: Payload,
    ) -> Result<T, ApiError> {
        let response = self.send(method, path, payload).await?;

        response
            .json::<T>()
            .await
            .map_err(|err| ApiError::Parse(format!("Failed to decode response: {err}")))
    }

    /// Sends a request and ignores the response body.
    ///
    /// # Errors
    /// See [`ApiClient::send`].
    pub async fn request_empty(
        &self,
        method: Method,
        path: &str,
        payload: Payload,
    ) -> Result<(), ApiError> {
        self.send(method, path, payload).await.map(|_| ())
    }

    /// # Errors
    /// See [`ApiClient::request_json`].
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request_json(Method::GET, path, Payload::Empty).await
    }

    /// # Errors
    /// See [`ApiClient::request_json`].
    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.request_json(Method::POST, path, Payload::json(body)?)
            .await
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        let joined = build_url_with_base(self.base_url.as_str(), path);
        Url::parse(&joined)
            .map_err(|err| ApiError::Serialization(format!("Invalid request URL {joined}: {err}")))
    }
}

/// GET and HEAD are reads; everything else needs the CSRF token.
#[must_use]
pub fn is_mutating(method: &Method) -> bool {
    !matches!(*method, Method::GET | Method::HEAD)
}

/// Joins a base URL and a path without dropping any path prefix on the base.
fn build_url_with_base(base_url: &str, path: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    let path = path.trim();

    if base.is_empty() {
        path.to_string()
    } else {
        format!("{}/{}", base, path.trim_start_matches('/'))
    }
}

fn map_request_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::Timeout("Request timed out. Please try again.".to_string())
    } else if err.is_builder() {
        ApiError::Serialization(format!("Failed to build request: {err}"))
    } else {
        ApiError::Network(format!("Unable to reach the server: {err}"))
    }
}

async fn check_status(response: Response) -> Result<Response, ApiError> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();

    Err(ApiError::Http { status, body })
}
