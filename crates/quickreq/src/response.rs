//! HTTP response types

use std::collections::HashMap;

use encoding_rs::Encoding;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::HttpError;
use crate::json_path::{self, JsonLeaf};

/// Result type returned by every fallible operation in this crate
pub type HttpResult<R, E = HttpError> = Result<R, E>;

/// Header name to value, last write wins
pub type Headers = HashMap<String, String>;

const DEFAULT_CHARSET: &str = "utf-8";

/// A completed exchange: status code, headers and the full body
///
/// Header names are stored lowercased, as the transport delivers them, and
/// [`Response::header`] matches names case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: u16,
    headers: Headers,
    body: Vec<u8>,
}

impl Response {
    /// Build a response from its parts
    pub fn new(status: u16, headers: Headers, body: impl Into<Vec<u8>>) -> Self {
        let headers = headers
            .into_iter()
            .map(|(name, value)| (name.to_ascii_lowercase(), value))
            .collect();

        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// Read status, headers and body out of a blocking `reqwest` response
    pub(crate) fn read(response: reqwest::blocking::Response) -> HttpResult<Self> {
        let status = response.status().as_u16();
        let mut headers = Headers::new();
        for (name, value) in response.headers() {
            headers.insert(
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            );
        }
        let body = response.bytes().map_err(HttpError::from)?.to_vec();

        Ok(Self {
            status,
            headers,
            body,
        })
    }

    /// Get the HTTP status code
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Check if the response status is a success (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Check if the response status is a client error (4xx)
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }

    /// Check if the response status is a server error (5xx)
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status)
    }

    /// Value of header `name`, or `""` when absent
    pub fn header(&self, name: &str) -> &str {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// All response headers
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Charset named by the `Content-Type` header, `"utf-8"` if there is none
    pub fn charset(&self) -> String {
        self.header("Content-Type")
            .split(';')
            .filter_map(|param| param.split_once('='))
            .find(|(key, _)| key.trim().eq_ignore_ascii_case("charset"))
            .map(|(_, value)| value.trim().trim_matches('"').to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_CHARSET.to_string())
    }

    /// Body decoded with [`Response::charset`]
    ///
    /// A leading byte order mark is kept as U+FEFF and never overrides the
    /// declared charset.
    pub fn try_text(&self) -> HttpResult<String> {
        let charset = self.charset();
        let encoding = Encoding::for_label(charset.as_bytes())
            .ok_or(HttpError::UnsupportedCharset(charset))?;
        let (text, _) = encoding.decode_without_bom_handling(&self.body);
        Ok(text.into_owned())
    }

    /// Body decoded with [`Response::charset`], or `""` if the charset is not
    /// supported
    pub fn text(&self) -> String {
        self.try_text().unwrap_or_else(|e| {
            tracing::debug!(error = %e, "Falling back to empty body text");
            String::new()
        })
    }

    /// Raw body, suitable for binary payloads
    pub fn bytes(&self) -> &[u8] {
        &self.body
    }

    /// Take ownership of the raw body
    pub fn into_bytes(self) -> Vec<u8> {
        self.body
    }

    /// Body parsed as a JSON object
    ///
    /// Any failure, including an unsupported charset, is reported as
    /// [`HttpError::JsonParse`].
    pub fn json(&self) -> HttpResult<Map<String, Value>> {
        let text = self
            .try_text()
            .map_err(|e| HttpError::JsonParse(e.to_string()))?;
        match serde_json::from_str::<Value>(&text) {
            Ok(Value::Object(root)) => Ok(root),
            Ok(other) => Err(HttpError::JsonParse(format!(
                "root is {}, not an object",
                json_path::type_name(&other)
            ))),
            Err(e) => Err(HttpError::JsonParse(e.to_string())),
        }
    }

    /// Top-level keys of the JSON body, values left untyped
    pub fn json_map(&self) -> HttpResult<HashMap<String, Value>> {
        Ok(self.json()?.into_iter().collect())
    }

    /// Whole body deserialized into `T`
    pub fn deserialize<T: DeserializeOwned>(&self) -> HttpResult<T> {
        serde_json::from_str(&self.try_text()?).map_err(HttpError::from)
    }

    /// Value at dotted `path` read as `T`
    ///
    /// Fails with [`HttpError::PathTraversal`] when an intermediate segment is
    /// not an object, [`HttpError::MissingKey`] when a segment is absent, and
    /// [`HttpError::TypeMismatch`] when the leaf has another JSON type.
    pub fn get<T: JsonLeaf>(&self, path: &str) -> HttpResult<T> {
        json_path::extract(&self.json()?, path)
    }

    /// Value at dotted `path`, whatever its type
    pub fn param(&self, path: &str) -> HttpResult<Value> {
        self.get::<Value>(path)
    }

    /// Object at dotted `path` deserialized into `T` by field name
    pub fn get_bean<T: DeserializeOwned>(&self, path: &str) -> HttpResult<T> {
        let object = self.get::<Map<String, Value>>(path)?;
        serde_json::from_value(Value::Object(object)).map_err(HttpError::from)
    }

    /// Array at dotted `path` with every element converted to `T`
    ///
    /// Elements are converted leniently: numeric strings become numbers, and
    /// numbers and booleans become strings. An element that cannot be read as
    /// `T` either way fails with [`HttpError::TypeMismatch`].
    pub fn get_array<T: DeserializeOwned>(&self, path: &str) -> HttpResult<Vec<T>> {
        self.get::<Vec<Value>>(path)?
            .into_iter()
            .map(json_path::coerce)
            .collect()
    }

    fn or_default<T: Default>(&self, path: &str, result: HttpResult<T>) -> T {
        result.unwrap_or_else(|e| {
            tracing::debug!(path, error = %e, "Substituting default for JSON lookup");
            T::default()
        })
    }

    /// String at `path`, `""` on any failure
    pub fn get_string(&self, path: &str) -> String {
        self.or_default(path, self.get(path))
    }

    /// 32-bit integer at `path`, `0` on any failure
    pub fn get_int(&self, path: &str) -> i32 {
        self.or_default(path, self.get(path))
    }

    /// 64-bit integer at `path`, `0` on any failure
    pub fn get_long(&self, path: &str) -> i64 {
        self.or_default(path, self.get(path))
    }

    /// Number at `path` as `f32`, `0.0` on any failure
    pub fn get_float(&self, path: &str) -> f32 {
        self.or_default(path, self.get(path))
    }

    /// Number at `path` as `f64`, `0.0` on any failure
    pub fn get_double(&self, path: &str) -> f64 {
        self.or_default(path, self.get(path))
    }

    /// Boolean at `path`, `false` on any failure
    pub fn get_bool(&self, path: &str) -> bool {
        self.or_default(path, self.get(path))
    }

    /// Strings at `path`, empty on any failure
    pub fn get_string_array(&self, path: &str) -> Vec<String> {
        self.or_default(path, self.get_array(path))
    }

    /// 32-bit integers at `path`, empty on any failure
    pub fn get_int_array(&self, path: &str) -> Vec<i32> {
        self.or_default(path, self.get_array(path))
    }

    /// 64-bit integers at `path`, empty on any failure
    pub fn get_long_array(&self, path: &str) -> Vec<i64> {
        self.or_default(path, self.get_array(path))
    }

    /// Numbers at `path` as `f32`, empty on any failure
    pub fn get_float_array(&self, path: &str) -> Vec<f32> {
        self.or_default(path, self.get_array(path))
    }

    /// Numbers at `path` as `f64`, empty on any failure
    pub fn get_double_array(&self, path: &str) -> Vec<f64> {
        self.or_default(path, self.get_array(path))
    }
}
