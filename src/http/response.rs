//! HTTP response building module
//!
//! Provides builders for every response the router emits. Builders take
//! `is_head` and drop the body for HEAD requests while keeping the headers.
//! `Content-Length` is always set explicitly: hyper only derives it from a
//! non-empty body, which would make HEAD and GET headers differ.

use hyper::header::{CACHE_CONTROL, CONTENT_LENGTH, CONTENT_TYPE, EXPIRES, PRAGMA};
use hyper::{Response, StatusCode};

use super::body::{self, ResponseBody, ZeroBody};

pub const TEXT_PLAIN: &str = "text/plain";
pub const TEXT_HTML: &str = "text/html";
pub const OCTET_STREAM: &str = "application/octet-stream";

const NO_CACHE: &str = "no-cache";
const NO_STORE: &str = "no-cache, no-store, must-revalidate";
const NOT_FOUND_TEXT: &str = "Not Found";

/// Build a 200 `text/plain` response marked `no-cache`
pub fn build_no_cache_text_response(text: String, is_head: bool) -> Response<ResponseBody> {
    let len = text.len();
    let body = if is_head { body::empty() } else { body::full(text) };

    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, TEXT_PLAIN)
        .header(CONTENT_LENGTH, len)
        .header(CACHE_CONTROL, NO_CACHE)
        .body(body)
        .unwrap_or_else(|e| {
            log_build_error("200", &e);
            Response::new(body::empty())
        })
}

/// Build the fixed-size zero payload response
pub fn build_payload_response(len: u64, is_head: bool) -> Response<ResponseBody> {
    let body = if is_head {
        body::empty()
    } else {
        ZeroBody::new(len).boxed()
    };

    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, OCTET_STREAM)
        .header(CONTENT_LENGTH, len)
        .header(CACHE_CONTROL, NO_STORE)
        .header(PRAGMA, NO_CACHE)
        .header(EXPIRES, "0")
        .body(body)
        .unwrap_or_else(|e| {
            log_build_error("payload", &e);
            Response::new(body::empty())
        })
}

/// Build generic HTML response
pub fn build_html_response(content: &'static str) -> Response<ResponseBody> {
    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, TEXT_HTML)
        .body(body::full(content))
        .unwrap_or_else(|e| {
            log_build_error("HTML", &e);
            Response::new(body::empty())
        })
}

/// Build 404 Not Found response
pub fn build_404_response(is_head: bool) -> Response<ResponseBody> {
    let body = if is_head {
        body::empty()
    } else {
        body::full(NOT_FOUND_TEXT)
    };

    Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header(CONTENT_TYPE, TEXT_PLAIN)
        .header(CONTENT_LENGTH, NOT_FOUND_TEXT.len())
        .body(body)
        .unwrap_or_else(|e| {
            log_build_error("404", &e);
            Response::new(body::empty())
        })
}

/// Build 501 Not Implemented response for methods the router does not serve
pub fn build_501_response(method: &hyper::Method) -> Response<ResponseBody> {
    Response::builder()
        .status(StatusCode::NOT_IMPLEMENTED)
        .header(CONTENT_TYPE, TEXT_PLAIN)
        .body(body::full(format!("Unsupported method ('{method}')")))
        .unwrap_or_else(|e| {
            log_build_error("501", &e);
            Response::new(body::empty())
        })
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_bytes(resp: Response<ResponseBody>) -> Vec<u8> {
        resp.into_body().collect().await.unwrap().to_bytes().to_vec()
    }

    #[tokio::test]
    async fn test_text_response() {
        let resp = build_no_cache_text_response("OK".to_string(), false);
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[CONTENT_TYPE], "text/plain");
        assert_eq!(resp.headers()[CACHE_CONTROL], "no-cache");
        assert_eq!(body_bytes(resp).await, b"OK");
    }

    #[tokio::test]
    async fn test_payload_head_keeps_headers() {
        let get = build_payload_response(1_048_576, false);
        let head = build_payload_response(1_048_576, true);
        assert_eq!(get.status(), head.status());
        assert_eq!(get.headers(), head.headers());
        assert_eq!(head.headers()[CONTENT_LENGTH], "1048576");
        assert_eq!(head.headers()[EXPIRES], "0");
        assert!(body_bytes(head).await.is_empty());
    }

    #[tokio::test]
    async fn test_text_head_keeps_content_length() {
        let get = build_no_cache_text_response("OK".to_string(), false);
        let head = build_no_cache_text_response("OK".to_string(), true);
        assert_eq!(get.headers(), head.headers());
        assert_eq!(head.headers()[CONTENT_LENGTH], "2");
        assert!(body_bytes(head).await.is_empty());
    }

    #[tokio::test]
    async fn test_404_response() {
        let resp = build_404_response(false);
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(resp.headers()[CONTENT_LENGTH], "9");
        assert_eq!(body_bytes(resp).await, b"Not Found");

        let head = build_404_response(true);
        assert_eq!(head.headers()[CONTENT_LENGTH], "9");
        assert!(body_bytes(head).await.is_empty());
    }

    #[tokio::test]
    async fn test_501_response() {
        let resp = build_501_response(&hyper::Method::POST);
        assert_eq!(resp.status(), StatusCode::NOT_IMPLEMENTED);
        assert_eq!(body_bytes(resp).await, b"Unsupported method ('POST')");
    }
}
