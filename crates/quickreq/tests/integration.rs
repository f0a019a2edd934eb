//! Integration tests for quickreq using mockito

use std::collections::HashMap;
use std::sync::Arc;
use std::thread;

use mockito::Matcher;
use quickreq::{Headers, HttpClient, HttpError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct TestPayload {
    name: String,
    value: i32,
}

fn headers(pairs: &[(&str, &str)]) -> Headers {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

// === GET and query handling ===

#[test]
fn test_get_well_formed_query() {
    let mut server = mockito::Server::new();

    let mock = server
        .mock("GET", "/search")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("key".into(), "value".into()),
            Matcher::UrlEncoded("key2".into(), "value2".into()),
        ]))
        .with_status(200)
        .with_body("ok")
        .create();

    let client = HttpClient::new();
    let url = format!("{}/search?key=value&key2=value2", server.url());
    let response = client.fetch(&url).expect("GET should succeed");

    assert_eq!(response.status(), 200);
    assert_eq!(response.text(), "ok");
    mock.assert();
}

#[test]
fn test_get_reencodes_special_characters() {
    let mut server = mockito::Server::new();

    let mock = server
        .mock("GET", "/search")
        .match_query(Matcher::Exact("q=a+b&r=x%26y&s=%E4%BD%A0".to_string()))
        .with_status(200)
        .expect(2)
        .create();

    let client = HttpClient::new();
    let raw = format!("{}/search?q=a b&r=x%26y&s=你", server.url());
    let encoded = format!("{}/search?q=a%20b&r=x%26y&s=%E4%BD%A0", server.url());

    assert_eq!(client.fetch(&raw).expect("Raw input").status(), 200);
    assert_eq!(client.fetch(&encoded).expect("Encoded input").status(), 200);
    mock.assert();
}

#[test]
fn test_get_pair_with_extra_equals_uses_empty_key() {
    let mut server = mockito::Server::new();

    let mock = server
        .mock("GET", "/quirk")
        .match_query(Matcher::Exact("=a&d=1".to_string()))
        .with_status(200)
        .create();

    let client = HttpClient::new();
    let url = format!("{}/quirk?a=b=c&d=1", server.url());
    let response = client.fetch(&url).expect("GET should succeed");

    assert_eq!(response.status(), 200);
    mock.assert();
}

#[test]
fn test_get_applies_headers() {
    let mut server = mockito::Server::new();

    let mock = server
        .mock("GET", "/secure")
        .match_header("x-token", "abc")
        .match_header("user-agent", "curl/7.12.1")
        .with_status(200)
        .with_header("x-request-id", "42")
        .create();

    let client = HttpClient::new();
    let url = format!("{}/secure", server.url());
    let response = client
        .fetch_with_headers(
            &url,
            &headers(&[("X-Token", "abc"), ("User-Agent", "curl/7.12.1")]),
        )
        .expect("GET should succeed");

    assert_eq!(response.header("X-Request-Id"), "42");
    assert_eq!(response.header("X-Absent"), "");
    mock.assert();
}

#[test]
fn test_error_status_is_a_response() {
    let mut server = mockito::Server::new();

    let mock = server
        .mock("GET", "/missing")
        .with_status(404)
        .with_body("Not Found")
        .create();

    let client = HttpClient::new();
    let url = format!("{}/missing", server.url());
    let response = client.fetch(&url).expect("404 is still a response");

    assert_eq!(response.status(), 404);
    assert!(response.is_client_error());
    assert_eq!(response.text(), "Not Found");
    mock.assert();
}

#[test]
fn test_get_malformed_url() {
    let client = HttpClient::new();
    let result = client.fetch("no-scheme/path?a=1");
    assert!(matches!(result, Err(HttpError::MalformedUrl(_))));
}

// === POST bodies ===

#[test]
fn test_post_form_body_and_content_type() {
    let mut server = mockito::Server::new();

    let mock = server
        .mock("POST", "/form")
        .match_header("content-type", "application/x-www-form-urlencoded")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("a".into(), "1".into()),
            Matcher::UrlEncoded("b".into(), "2".into()),
        ]))
        .with_status(200)
        .create();

    let client = HttpClient::new();
    let url = format!("{}/form", server.url());
    let form = HashMap::from([("a", "1"), ("b", "2")]);
    let response = client.post_form(&url, &form).expect("POST should succeed");

    assert!(response.is_success());
    mock.assert();
}

#[test]
fn test_post_form_exact_body() {
    let mut server = mockito::Server::new();

    let mock = server
        .mock("POST", "/form")
        .match_body(Matcher::Exact("a=1&b=2&note=x+y%26z".to_string()))
        .with_status(200)
        .create();

    let client = HttpClient::new();
    let url = format!("{}/form", server.url());
    let form = vec![("a", "1"), ("b", "2"), ("note", "x y&z")];
    client.post_form(&url, &form).expect("POST should succeed");

    mock.assert();
}

#[test]
fn test_post_explicit_content_type_overrides_form_default() {
    let mut server = mockito::Server::new();

    let mock = server
        .mock("POST", "/form")
        .match_header("content-type", "text/plain; charset=utf-8")
        .match_body(Matcher::Exact("a=1".to_string()))
        .with_status(200)
        .create();

    let client = HttpClient::new();
    let url = format!("{}/form", server.url());
    let form = vec![("a", "1")];
    client
        .post_form_with_headers(
            &url,
            &headers(&[("Content-Type", "text/plain; charset=utf-8")]),
            &form,
        )
        .expect("POST should succeed");

    mock.assert();
}

#[test]
fn test_post_text_has_no_content_type() {
    let mut server = mockito::Server::new();

    let mock = server
        .mock("POST", "/urls")
        .match_header("content-type", Matcher::Missing)
        .match_body(Matcher::Exact("https://blog.example.com/post".to_string()))
        .with_status(200)
        .with_body(r#"{"remain":99,"success":1}"#)
        .create();

    let client = HttpClient::new();
    let url = format!("{}/urls?site=https://blog.example.com&token=t", server.url());
    let response = client
        .post_text(&url, "https://blog.example.com/post")
        .expect("POST should succeed");

    assert_eq!(response.get_int("success"), 1);
    mock.assert();
}

#[test]
fn test_post_text_with_headers() {
    let mut server = mockito::Server::new();

    let mock = server
        .mock("POST", "/raw")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(serde_json::json!({"name": "raw", "value": 1})))
        .with_status(201)
        .create();

    let client = HttpClient::new();
    let url = format!("{}/raw", server.url());
    let response = client
        .post_text_with_headers(
            &url,
            &headers(&[("Content-Type", "application/json")]),
            r#"{"name":"raw","value":1}"#,
        )
        .expect("POST should succeed");

    assert_eq!(response.status(), 201);
    mock.assert();
}

#[test]
fn test_post_json() {
    let mut server = mockito::Server::new();

    let mock = server
        .mock("POST", "/api/submit")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(serde_json::json!({
            "name": "test",
            "value": 42
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"success": true, "data": {"echo": {"name": "test", "value": 42}}}"#)
        .create();

    let client = HttpClient::new();
    let url = format!("{}/api/submit", server.url());
    let payload = TestPayload {
        name: "test".to_string(),
        value: 42,
    };
    let response = client.post_json(&url, &payload).expect("POST should succeed");

    assert!(response.get_bool("success"));
    let echo: TestPayload = response.get_bean("data.echo").expect("Nested object");
    assert_eq!(echo, payload);
    mock.assert();
}

// === Response decoding ===

#[test]
fn test_response_charset_decoding() {
    let mut server = mockito::Server::new();

    // "中文" in GBK
    let mock = server
        .mock("GET", "/gbk")
        .with_status(200)
        .with_header("content-type", "text/html; charset=GBK")
        .with_body(vec![0xD6_u8, 0xD0, 0xCE, 0xC4])
        .create();

    let client = HttpClient::new();
    let url = format!("{}/gbk", server.url());
    let response = client.fetch(&url).expect("GET should succeed");

    assert_eq!(response.charset(), "GBK");
    assert_eq!(response.text(), "中文");
    assert_eq!(response.bytes().to_vec(), vec![0xD6_u8, 0xD0, 0xCE, 0xC4]);
    mock.assert();
}

#[test]
fn test_response_json_paths() {
    let mut server = mockito::Server::new();

    let mock = server
        .mock("GET", "/json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"a":{"b":{"c":42}},"data":["hh","ee"],"flat":1}"#)
        .create();

    let client = HttpClient::new();
    let url = format!("{}/json", server.url());
    let response = client.fetch(&url).expect("GET should succeed");

    assert_eq!(response.get::<i64>("a.b.c").expect("Integer leaf"), 42);
    assert!(matches!(
        response.get::<String>("a.b.c"),
        Err(HttpError::TypeMismatch { .. })
    ));
    assert!(matches!(
        response.get::<i64>("flat.x"),
        Err(HttpError::PathTraversal { .. })
    ));
    assert_eq!(response.get_string("missing.path"), "");
    assert_eq!(response.get_string_array("data"), vec!["hh", "ee"]);
    mock.assert();
}

// === Shared client ===

#[test]
fn test_free_functions_use_shared_client() {
    let mut server = mockito::Server::new();

    let get_mock = server
        .mock("GET", "/shared")
        .match_query(Matcher::UrlEncoded("id".into(), "7".into()))
        .with_status(200)
        .with_body(r#"{"id":7}"#)
        .create();
    let post_mock = server
        .mock("POST", "/shared")
        .match_body(Matcher::UrlEncoded("a".into(), "1".into()))
        .with_status(200)
        .create();

    let response = quickreq::get(&format!("{}/shared?id=7", server.url())).expect("GET");
    assert_eq!(response.get_int("id"), 7);

    let form = HashMap::from([("a", "1")]);
    quickreq::post(&format!("{}/shared", server.url()), &form).expect("POST");

    get_mock.assert();
    post_mock.assert();
}

#[test]
fn test_concurrent_calls_do_not_mix_responses() {
    let mut server = mockito::Server::new();

    let mocks: Vec<_> = (0..8)
        .map(|i| {
            server
                .mock("GET", format!("/item/{i}").as_str())
                .with_status(200)
                .with_header("content-type", "application/json")
                .with_body(format!(r#"{{"id":{i},"name":"item-{i}"}}"#))
                .expect(3)
                .create()
        })
        .collect();

    let client = Arc::new(
        HttpClient::builder()
            .max_connections(4, 2)
            .build()
            .expect("Valid configuration"),
    );
    let base = server.url();

    let handles: Vec<_> = (0..24)
        .map(|n| {
            let client = Arc::clone(&client);
            let url = format!("{base}/item/{}", n % 8);
            thread::spawn(move || {
                let response = client.fetch(&url).expect("GET should succeed");
                (n % 8, response)
            })
        })
        .collect();

    for handle in handles {
        let (i, response) = handle.join().expect("Worker thread should not panic");
        assert_eq!(response.get_int("id"), i);
        assert_eq!(response.get_string("name"), format!("item-{i}"));
    }

    assert_eq!(client.limiter().in_use(), 0);
    for mock in mocks {
        mock.assert();
    }
}
