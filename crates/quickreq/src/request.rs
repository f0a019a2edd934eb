//! HTTP request builder

use reqwest::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::Method;
use serde::Serialize;
use url::Url;

use crate::client::HttpClient;
use crate::error::HttpError;
use crate::response::{Headers, HttpResult, Response};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Debug)]
enum Body {
    Form(String),
    Text(String),
    Json(Vec<u8>),
}

/// Builder for a single exchange on an [`HttpClient`]
///
/// Errors raised while building (bad header, body encoding) are kept and
/// returned by [`RequestBuilder::send`]. Explicit headers are applied after the
/// body, replacing any header of the same name, so a caller-supplied
/// `Content-Type` wins over the one set by [`RequestBuilder::form`] or
/// [`RequestBuilder::json`].
#[derive(Debug)]
pub struct RequestBuilder<'a> {
    client: &'a HttpClient,
    method: Method,
    url: HttpResult<Url>,
    headers: Vec<(HeaderName, HeaderValue)>,
    body: Option<Body>,
    error: Option<HttpError>,
}

impl<'a> RequestBuilder<'a> {
    pub(crate) fn new(client: &'a HttpClient, method: Method, url: HttpResult<Url>) -> Self {
        Self {
            client,
            method,
            url,
            headers: Vec::new(),
            body: None,
            error: None,
        }
    }

    /// Add a header to the request
    pub fn header(mut self, key: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        let (key, value) = (key.as_ref(), value.as_ref());
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|e| HttpError::InvalidHeader(format!("{key}: {e}")));
        let value =
            HeaderValue::from_str(value).map_err(|e| HttpError::InvalidHeader(format!("{key}: {e}")));

        match name.and_then(|name| value.map(|value| (name, value))) {
            Ok(header) => self.headers.push(header),
            Err(e) => self.error = self.error.or(Some(e)),
        }
        self
    }

    /// Add every header in `headers`
    pub fn headers(self, headers: &Headers) -> Self {
        headers
            .iter()
            .fold(self, |builder, (key, value)| builder.header(key, value))
    }

    /// Set the request body as UTF-8 form data
    pub fn form<T: Serialize + ?Sized>(mut self, body: &T) -> Self {
        match serde_urlencoded::to_string(body) {
            Ok(form_str) => self.body = Some(Body::Form(form_str)),
            Err(e) => self.error = self.error.or(Some(HttpError::Encoding(e.to_string()))),
        }
        self
    }

    /// Set the request body as raw UTF-8 text, without a content type
    pub fn text(mut self, body: impl Into<String>) -> Self {
        self.body = Some(Body::Text(body.into()));
        self
    }

    /// Set the request body as JSON
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Self {
        match serde_json::to_vec(body) {
            Ok(bytes) => self.body = Some(Body::Json(bytes)),
            Err(e) => self.error = self.error.or(Some(HttpError::Encoding(e.to_string()))),
        }
        self
    }

    /// Send the request, blocking until the whole body has been read
    pub fn send(self) -> HttpResult<Response> {
        if let Some(err) = self.error {
            return Err(err);
        }

        let mut request = reqwest::blocking::Request::new(self.method, self.url?);

        if let Some(body) = self.body {
            let (bytes, content_type) = match body {
                Body::Form(form) => (form.into_bytes(), Some(FORM_CONTENT_TYPE)),
                Body::Text(text) => (text.into_bytes(), None),
                Body::Json(json) => (json, Some(JSON_CONTENT_TYPE)),
            };
            if let Some(content_type) = content_type {
                request
                    .headers_mut()
                    .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
            }
            *request.body_mut() = Some(bytes.into());
        }

        for (name, value) in self.headers {
            request.headers_mut().insert(name, value);
        }

        self.client.execute(request)
    }
}
