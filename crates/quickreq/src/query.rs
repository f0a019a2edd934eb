//! URL query-string parsing
//!
//! GET URLs are split on the first `?`. The query section is parsed into
//! key/value pairs and written back through [`url::Url::query_pairs_mut`], so
//! the outgoing request carries a consistently escaped query no matter how the
//! caller encoded it.

use percent_encoding::percent_decode_str;
use url::Url;

use crate::error::HttpError;
use crate::response::HttpResult;

/// A key/value pair taken from a query string
pub type QueryParam = (String, String);

/// Parse `raw` into a [`Url`] whose query is rebuilt from the parsed pairs
pub fn build_url(raw: &str) -> HttpResult<Url> {
    let (base, query) = match raw.split_once('?') {
        Some((base, query)) => (base, Some(query)),
        None => (raw, None),
    };

    let mut url = Url::parse(base).map_err(|e| HttpError::MalformedUrl(format!("{raw}: {e}")))?;

    if let Some(query) = query {
        let params = parse_query(query);
        if !params.is_empty() {
            url.query_pairs_mut().clear().extend_pairs(params);
        }
    }

    Ok(url)
}

/// Parse a query string into pairs, in first-seen key order
///
/// Setting a key that is already present replaces its value. A pair that splits
/// into more than two pieces on `=` is kept as `("", first_piece)`; a pair with
/// no value is kept as `(key, "")`.
pub fn parse_query(query: &str) -> Vec<QueryParam> {
    let mut params: Vec<QueryParam> = Vec::new();

    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = split_pair(pair);
        let (key, value) = (decode_component(key), decode_component(value));

        match params.iter_mut().find(|(k, _)| *k == key) {
            Some(existing) => existing.1 = value,
            None => params.push((key, value)),
        }
    }

    params
}

fn split_pair(pair: &str) -> (&str, &str) {
    let mut pieces: Vec<&str> = pair.split('=').collect();
    // trailing empty pieces never count, "a=" and "a=b=" are one and two pieces
    while pieces.len() > 1 && pieces.last().is_some_and(|p| p.is_empty()) {
        pieces.pop();
    }

    match pieces.as_slice() {
        [key] => (*key, ""),
        [key, value] => (*key, *value),
        [first, ..] => ("", *first),
        [] => ("", ""),
    }
}

fn decode_component(component: &str) -> String {
    let spaced = component.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}
