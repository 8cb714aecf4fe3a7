//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: resolves `(method, path)` to an
//! [`Endpoint`] and runs it.

use std::net::SocketAddr;
use std::time::Instant;

use hyper::body::Body;
use hyper::header::{HeaderName, REFERER, USER_AGENT};
use hyper::{Method, Request, Response, Version};

use crate::config::AppState;
use crate::error::RouterError;
use crate::handler::{delay, pages};
use crate::http::{self, ResponseBody};
use crate::logger::{self, AccessLogEntry};

/// Request context encapsulating information needed for request processing
///
/// Owns everything it needs so the request (and its body) can be dropped
/// before the handler suspends.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub version: Version,
    pub peer_addr: SocketAddr,
    pub referer: Option<String>,
    pub user_agent: Option<String>,
    pub received_at: Instant,
}

impl RequestContext {
    pub fn from_request<B>(req: &Request<B>, peer_addr: SocketAddr) -> Self {
        let header = |name: HeaderName| {
            req.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(ToString::to_string)
        };

        Self {
            method: req.method().clone(),
            path: req.uri().path().to_string(),
            query: req.uri().query().map(ToString::to_string),
            version: req.version(),
            peer_addr,
            referer: header(REFERER),
            user_agent: header(USER_AGENT),
            received_at: Instant::now(),
        }
    }

    pub fn is_head(&self) -> bool {
        self.method == Method::HEAD
    }
}

/// The fixed set of behaviours the server offers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Health,
    Slow,
    FixedPayload,
    Index,
    NotFound,
    Unsupported,
}

/// Resolve a request to an endpoint by exact, case-sensitive path match
///
/// `/slow`, `/` and `/index.html` are GET only; HEAD on them is a 404.
pub fn resolve(method: &Method, path: &str) -> Endpoint {
    match (method, path) {
        (&Method::GET | &Method::HEAD, pages::HEALTH_PATH) => Endpoint::Health,
        (&Method::GET, delay::SLOW_PATH) => Endpoint::Slow,
        (&Method::GET | &Method::HEAD, pages::FIXED_PAYLOAD_PATH) => Endpoint::FixedPayload,
        (&Method::GET, "/" | "/index.html") => Endpoint::Index,
        (&Method::GET | &Method::HEAD, _) => Endpoint::NotFound,
        _ => Endpoint::Unsupported,
    }
}

/// Main entry point for HTTP request handling
pub async fn handle_request(
    ctx: RequestContext,
    state: &AppState,
) -> Result<Response<ResponseBody>, RouterError> {
    let response = route_request(&ctx, state).await?;

    if state.config.logging.access_log {
        log_access(&ctx, &response, &state.config.logging.access_log_format);
    }

    Ok(response)
}

async fn route_request(
    ctx: &RequestContext,
    state: &AppState,
) -> Result<Response<ResponseBody>, RouterError> {
    let is_head = ctx.is_head();

    let response = match resolve(&ctx.method, &ctx.path) {
        Endpoint::Health => pages::serve_health(is_head),
        Endpoint::Slow => delay::serve_slow(ctx.query.as_deref(), state.config.delay.max_ms).await?,
        Endpoint::FixedPayload => pages::serve_fixed_payload(is_head),
        Endpoint::Index => pages::serve_index(),
        Endpoint::NotFound => http::build_404_response(is_head),
        Endpoint::Unsupported => {
            logger::log_warning(&format!("Unsupported method: {}", ctx.method));
            http::build_501_response(&ctx.method)
        }
    };

    Ok(response)
}

fn log_access(ctx: &RequestContext, response: &Response<ResponseBody>, format: &str) {
    let mut entry = AccessLogEntry::new(
        ctx.peer_addr.ip().to_string(),
        ctx.method.to_string(),
        ctx.path.clone(),
    );
    entry.query.clone_from(&ctx.query);
    entry.http_version = version_label(ctx.version).to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = response.body().size_hint().exact().unwrap_or(0);
    entry.referer.clone_from(&ctx.referer);
    entry.user_agent.clone_from(&ctx.user_agent);
    entry.request_time_us =
        u64::try_from(ctx.received_at.elapsed().as_micros()).unwrap_or(u64::MAX);
    logger::log_access(&entry, format);
}

fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use http_body_util::BodyExt;
    use hyper::header::{CACHE_CONTROL, CONTENT_LENGTH, CONTENT_TYPE};
    use hyper::StatusCode;
    use std::time::Duration;

    fn test_state() -> AppState {
        let mut cfg = Config::load_with_port(None).unwrap();
        cfg.logging.access_log = false;
        AppState::new(&cfg)
    }

    fn ctx(method: Method, uri: &str) -> RequestContext {
        let req = Request::builder().method(method).uri(uri).body(()).unwrap();
        RequestContext::from_request(&req, "127.0.0.1:40000".parse().unwrap())
    }

    async fn call(state: &AppState, method: Method, uri: &str) -> Response<ResponseBody> {
        handle_request(ctx(method, uri), state).await.unwrap()
    }

    async fn body_of(resp: Response<ResponseBody>) -> Vec<u8> {
        resp.into_body().collect().await.unwrap().to_bytes().to_vec()
    }

    #[test]
    fn test_resolve_table() {
        assert_eq!(resolve(&Method::GET, "/health"), Endpoint::Health);
        assert_eq!(resolve(&Method::HEAD, "/health"), Endpoint::Health);
        assert_eq!(resolve(&Method::GET, "/slow"), Endpoint::Slow);
        assert_eq!(resolve(&Method::HEAD, "/slow"), Endpoint::NotFound);
        assert_eq!(resolve(&Method::GET, "/fixed/1mb.bin"), Endpoint::FixedPayload);
        assert_eq!(resolve(&Method::HEAD, "/fixed/1mb.bin"), Endpoint::FixedPayload);
        assert_eq!(resolve(&Method::GET, "/"), Endpoint::Index);
        assert_eq!(resolve(&Method::GET, "/index.html"), Endpoint::Index);
        assert_eq!(resolve(&Method::HEAD, "/"), Endpoint::NotFound);
        assert_eq!(resolve(&Method::POST, "/health"), Endpoint::Unsupported);
    }

    #[test]
    fn test_resolve_is_exact() {
        assert_eq!(resolve(&Method::GET, "/health/"), Endpoint::NotFound);
        assert_eq!(resolve(&Method::GET, "/Health"), Endpoint::NotFound);
        assert_eq!(resolve(&Method::GET, "/fixed/1MB.bin"), Endpoint::NotFound);
        assert_eq!(resolve(&Method::GET, "/slow/"), Endpoint::NotFound);
    }

    #[tokio::test]
    async fn test_health_get_and_head() {
        let state = test_state();
        let get = call(&state, Method::GET, "/health").await;
        let head = call(&state, Method::HEAD, "/health").await;

        assert_eq!(get.status(), StatusCode::OK);
        assert_eq!(get.headers()[CONTENT_TYPE], "text/plain");
        assert_eq!(get.headers()[CACHE_CONTROL], "no-cache");
        assert_eq!(get.headers()[CONTENT_LENGTH], "2");
        assert_eq!(get.status(), head.status());
        assert_eq!(get.headers(), head.headers());
        assert_eq!(body_of(get).await, b"OK");
        assert!(body_of(head).await.is_empty());
    }

    #[tokio::test]
    async fn test_fixed_payload() {
        let state = test_state();
        let resp = call(&state, Method::GET, "/fixed/1mb.bin").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[CONTENT_LENGTH], "1048576");
        assert_eq!(resp.headers()[CONTENT_TYPE], "application/octet-stream");
        let body = body_of(resp).await;
        assert_eq!(body.len(), 1_048_576);
        assert!(body.iter().all(|&b| b == 0));

        let head = call(&state, Method::HEAD, "/fixed/1mb.bin").await;
        assert_eq!(head.headers()[CONTENT_LENGTH], "1048576");
        assert!(body_of(head).await.is_empty());
    }

    #[tokio::test]
    async fn test_index_pages() {
        let state = test_state();
        for uri in ["/", "/index.html"] {
            let resp = call(&state, Method::GET, uri).await;
            assert_eq!(resp.status(), StatusCode::OK);
            assert_eq!(resp.headers()[CONTENT_TYPE], "text/html");
            let html = String::from_utf8(body_of(resp).await).unwrap();
            assert!(html.contains(r#"href="/health""#));
            assert!(html.contains(r#"href="/slow?ms=2000""#));
            assert!(html.contains(r#"href="/fixed/1mb.bin""#));
        }

        let head = call(&state, Method::HEAD, "/").await;
        assert_eq!(head.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_not_found() {
        let state = test_state();
        let resp = call(&state, Method::GET, "/does-not-exist").await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(resp.headers()[CONTENT_TYPE], "text/plain");
        assert_eq!(body_of(resp).await, b"Not Found");

        let head = call(&state, Method::HEAD, "/does-not-exist").await;
        assert_eq!(head.status(), StatusCode::NOT_FOUND);
        assert!(body_of(head).await.is_empty());
    }

    #[tokio::test]
    async fn test_unsupported_method() {
        let state = test_state();
        let resp = call(&state, Method::POST, "/health").await;
        assert_eq!(resp.status(), StatusCode::NOT_IMPLEMENTED);
    }

    #[tokio::test]
    async fn test_slow_zero_is_prompt() {
        let state = test_state();
        let start = Instant::now();
        let resp = call(&state, Method::GET, "/slow?ms=0").await;
        assert!(start.elapsed() < Duration::from_millis(200));
        assert_eq!(resp.headers()[CACHE_CONTROL], "no-cache");
        assert_eq!(body_of(resp).await, b"Delayed response (0ms)");
    }

    #[tokio::test]
    async fn test_slow_waits() {
        let state = test_state();
        let start = Instant::now();
        let resp = call(&state, Method::GET, "/slow?ms=250").await;
        assert!(start.elapsed() >= Duration::from_millis(250));
        assert_eq!(body_of(resp).await, b"Delayed response (250ms)");
    }

    #[tokio::test]
    async fn test_slow_default_delay() {
        let state = test_state();
        let start = Instant::now();
        let resp = call(&state, Method::GET, "/slow").await;
        assert!(start.elapsed() >= Duration::from_millis(1000));
        assert_eq!(body_of(resp).await, b"Delayed response (1000ms)");
    }

    #[tokio::test]
    async fn test_slow_negative_delay() {
        let state = test_state();
        let resp = call(&state, Method::GET, "/slow?ms=-50").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_of(resp).await, b"Delayed response (-50ms)");
    }

    #[tokio::test]
    async fn test_slow_invalid_parameter() {
        let state = test_state();
        match handle_request(ctx(Method::GET, "/slow?ms=abc"), &state).await {
            Err(RouterError::ParameterFormat { name, value, .. }) => {
                assert_eq!(name, "ms");
                assert_eq!(value, "abc");
            }
            Ok(resp) => panic!("Expected ParameterFormat, got status {}", resp.status()),
        }
    }

    #[tokio::test]
    async fn test_slow_respects_cap() {
        let mut cfg = Config::load_with_port(None).unwrap();
        cfg.logging.access_log = false;
        cfg.delay.max_ms = Some(10);
        let state = AppState::new(&cfg);

        let resp = call(&state, Method::GET, "/slow?ms=60000").await;
        assert_eq!(body_of(resp).await, b"Delayed response (10ms)");
    }

    #[tokio::test]
    async fn test_concurrent_slow_requests_overlap() {
        let state = test_state();
        let start = Instant::now();
        let (a, b) = tokio::join!(
            call(&state, Method::GET, "/slow?ms=300"),
            call(&state, Method::GET, "/slow?ms=300"),
        );
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(300));
        assert!(elapsed < Duration::from_millis(550), "requests were serialised: {elapsed:?}");
        assert_eq!(a.status(), StatusCode::OK);
        assert_eq!(b.status(), StatusCode::OK);
    }
}
