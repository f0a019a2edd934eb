//! Blocking `get`/`post` helpers with dotted-path JSON accessors
//!
//! The free functions in this crate use one process-wide [`HttpClient`], built
//! on first use from an optional `httpRequestConfig.properties` file (see
//! [`ClientConfig`]). The client pools connections, bounds concurrent
//! connections in total and per route, and retries failed transport attempts.
//!
//! # Example
//!
//! ```no_run
//! use std::collections::HashMap;
//!
//! fn example() -> quickreq::HttpResult<()> {
//!     let response = quickreq::get("https://api.example.com/user?id=7")?;
//!     let name = response.get_string("data.user.name");
//!     let age: i64 = response.get("data.user.age")?;
//!
//!     let form = HashMap::from([("a", "1"), ("b", "2")]);
//!     let submitted = quickreq::post("https://api.example.com/submit", &form)?;
//!     println!("{name} {age} {}", submitted.status());
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod error;
mod json_path;
mod limiter;
mod query;
mod request;
mod response;
mod retry;

use serde::Serialize;

pub use client::{HttpClient, HttpClientBuilder};
pub use config::{ClientConfig, CONFIG_PATH_ENV, DEFAULT_CONFIG_FILE};
pub use error::HttpError;
pub use json_path::JsonLeaf;
pub use limiter::{ConnectionLimiter, ConnectionPermit};
pub use query::{build_url, parse_query, QueryParam};
pub use request::RequestBuilder;
pub use response::{Headers, HttpResult, Response};
pub use retry::RetryPolicy;

/// GET `url` with the shared client
pub fn get(url: &str) -> HttpResult<Response> {
    HttpClient::global()?.fetch(url)
}

/// GET `url` with the shared client and extra headers
pub fn get_with_headers(url: &str, headers: &Headers) -> HttpResult<Response> {
    HttpClient::global()?.fetch_with_headers(url, headers)
}

/// POST form data with the shared client
pub fn post<F: Serialize + ?Sized>(url: &str, form: &F) -> HttpResult<Response> {
    HttpClient::global()?.post_form(url, form)
}

/// POST form data with the shared client and extra headers
pub fn post_with_headers<F: Serialize + ?Sized>(
    url: &str,
    headers: &Headers,
    form: &F,
) -> HttpResult<Response> {
    HttpClient::global()?.post_form_with_headers(url, headers, form)
}

/// POST a raw UTF-8 text body with the shared client
pub fn post_text(url: &str, text: impl Into<String>) -> HttpResult<Response> {
    HttpClient::global()?.post_text(url, text)
}

/// POST a raw UTF-8 text body with the shared client and extra headers
pub fn post_text_with_headers(
    url: &str,
    headers: &Headers,
    text: impl Into<String>,
) -> HttpResult<Response> {
    HttpClient::global()?.post_text_with_headers(url, headers, text)
}

/// POST a JSON body with the shared client
pub fn post_json<B: Serialize + ?Sized>(url: &str, body: &B) -> HttpResult<Response> {
    HttpClient::global()?.post_json(url, body)
}
