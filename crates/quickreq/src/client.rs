//! HTTP client wrapper

use std::sync::Arc;

use once_cell::sync::OnceCell;
use reqwest::Method;
use serde::Serialize;

use crate::config::ClientConfig;
use crate::error::HttpError;
use crate::limiter::{route_key, ConnectionLimiter};
use crate::query::build_url;
use crate::request::RequestBuilder;
use crate::response::{Headers, HttpResult, Response};
use crate::retry::{FailureKind, RetryPolicy};

static GLOBAL: OnceCell<HttpClient> = OnceCell::new();

/// Blocking HTTP client with bounded connections and a retry policy
///
/// Cloning is cheap; clones share the connection pool and ceilings.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: reqwest::blocking::Client,
    limiter: Arc<ConnectionLimiter>,
    retry: RetryPolicy,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    ///
    /// # Panics
    ///
    /// Panics if the TLS backend cannot be initialized, like
    /// `reqwest::blocking::Client::new`.
    pub fn new() -> Self {
        Self::builder()
            .build()
            .expect("Default HTTP client configuration should build")
    }

    /// Create a new HTTP client builder
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Create a client from a loaded configuration
    pub fn from_config(config: &ClientConfig) -> HttpResult<Self> {
        HttpClientBuilder::from_config(config).build()
    }

    /// The process-wide client, built from [`ClientConfig::load`] on first use
    pub fn global() -> HttpResult<&'static Self> {
        GLOBAL.get_or_try_init(|| {
            let config = ClientConfig::load();
            tracing::debug!(?config, "Initializing shared HTTP client");
            Self::from_config(&config)
        })
    }

    // === Simple convenience methods ===

    /// GET `url`; its query string is re-parsed and re-encoded
    pub fn fetch(&self, url: &str) -> HttpResult<Response> {
        self.get(url).send()
    }

    /// GET `url` with extra headers
    pub fn fetch_with_headers(&self, url: &str, headers: &Headers) -> HttpResult<Response> {
        self.get(url).headers(headers).send()
    }

    /// POST form data
    pub fn post_form<F>(&self, url: &str, form: &F) -> HttpResult<Response>
    where
        F: Serialize + ?Sized,
    {
        self.post(url).form(form).send()
    }

    /// POST form data with extra headers
    pub fn post_form_with_headers<F>(
        &self,
        url: &str,
        headers: &Headers,
        form: &F,
    ) -> HttpResult<Response>
    where
        F: Serialize + ?Sized,
    {
        self.post(url).form(form).headers(headers).send()
    }

    /// POST a raw text body
    pub fn post_text(&self, url: &str, text: impl Into<String>) -> HttpResult<Response> {
        self.post(url).text(text).send()
    }

    /// POST a raw text body with extra headers
    pub fn post_text_with_headers(
        &self,
        url: &str,
        headers: &Headers,
        text: impl Into<String>,
    ) -> HttpResult<Response> {
        self.post(url).text(text).headers(headers).send()
    }

    /// POST with JSON body
    pub fn post_json<B>(&self, url: &str, body: &B) -> HttpResult<Response>
    where
        B: Serialize + ?Sized,
    {
        self.post(url).json(body).send()
    }

    // === Request builder methods ===

    /// GET request builder for complex cases (custom headers, etc.)
    pub fn get(&self, url: &str) -> RequestBuilder<'_> {
        RequestBuilder::new(self, Method::GET, build_url(url))
    }

    /// POST request builder for complex cases (custom headers, form data, etc.)
    ///
    /// The URL is used as given.
    pub fn post(&self, url: &str) -> RequestBuilder<'_> {
        let url = url::Url::parse(url).map_err(|e| HttpError::MalformedUrl(format!("{url}: {e}")));
        RequestBuilder::new(self, Method::POST, url)
    }

    /// Connection ceilings shared by this client and its clones
    pub fn limiter(&self) -> &Arc<ConnectionLimiter> {
        &self.limiter
    }

    /// Retry policy applied to transport failures
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    pub(crate) fn execute(&self, request: reqwest::blocking::Request) -> HttpResult<Response> {
        let route = route_key(request.url());
        let method = request.method().clone();
        let mut attempt = 0;

        loop {
            let attempt_request = request
                .try_clone()
                .ok_or_else(|| HttpError::Build("request body cannot be replayed".to_string()))?;

            let permit = self.limiter.acquire(&route);
            let outcome = self.inner.execute(attempt_request).map(Response::read);
            drop(permit);

            match outcome {
                Ok(response) => {
                    let response = response?;
                    tracing::debug!(
                        method = %method,
                        url = %request.url(),
                        status = response.status(),
                        "HTTP exchange completed"
                    );
                    return Ok(response);
                }
                Err(e) => {
                    let kind = FailureKind::of(&e);
                    if self.retry.should_retry(&method, kind, attempt) {
                        attempt += 1;
                        tracing::warn!(
                            attempt,
                            max_retries = self.retry.max_retries(),
                            error = %e,
                            "HTTP exchange failed, retrying"
                        );
                        continue;
                    }
                    return Err(HttpError::from(e));
                }
            }
        }
    }
}

/// HTTP client builder for timeouts, connection ceilings, retries and TLS trust
#[derive(Debug, Clone)]
pub struct HttpClientBuilder {
    config: ClientConfig,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self::from_config(&ClientConfig::default())
    }
}

impl HttpClientBuilder {
    /// Start from an existing configuration
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Socket read and connection establishment timeouts, in milliseconds
    pub fn timeouts(mut self, socket_timeout_ms: u64, connect_timeout_ms: u64) -> Self {
        self.config.socket_timeout_ms = socket_timeout_ms;
        self.config.connect_timeout_ms = connect_timeout_ms;
        self
    }

    /// Ceilings on concurrent connections in total and per route
    pub fn max_connections(mut self, total: usize, per_route: usize) -> Self {
        self.config.connection_max_total = total;
        self.config.connection_max_per_route = per_route;
        self
    }

    /// Additional attempts after a retryable transport failure
    pub fn retry_count(mut self, retries: u32) -> Self {
        self.config.retry_count = retries;
        self
    }

    /// Accept invalid TLS certificates, including self-signed ones
    pub fn danger_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.config.trust_self_signed = accept;
        self
    }

    /// Build the HTTP client
    pub fn build(self) -> HttpResult<HttpClient> {
        let config = self.config;
        let limiter = ConnectionLimiter::new(
            config.connection_max_total,
            config.connection_max_per_route,
        );

        let inner = reqwest::blocking::Client::builder()
            .timeout(config.socket_timeout())
            .connect_timeout(config.connect_timeout())
            .pool_max_idle_per_host(limiter.max_per_route())
            .danger_accept_invalid_certs(config.trust_self_signed)
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;

        Ok(HttpClient {
            inner,
            limiter,
            retry: RetryPolicy::new(config.retry_count),
        })
    }
}
