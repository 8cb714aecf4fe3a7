//! Static endpoints: health check, fixed payload and index page

use hyper::Response;

use crate::http::{self, ResponseBody};

pub const HEALTH_PATH: &str = "/health";
pub const FIXED_PAYLOAD_PATH: &str = "/fixed/1mb.bin";

/// Size of the throughput test payload (1 MiB)
pub const FIXED_PAYLOAD_LEN: u64 = 1_048_576;

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
    <title>Network QoE Test Target</title>
</head>
<body>
    <h1>Network QoE Test Target Server</h1>
    <p>This server provides test endpoints for network quality measurements.</p>
    <ul>
        <li><a href="/health">Health Check</a> - Fast response endpoint</li>
        <li><a href="/slow?ms=2000">Slow Endpoint</a> - Configurable delay endpoint</li>
        <li><a href="/fixed/1mb.bin">1MB Test File</a> - For throughput testing</li>
    </ul>
</body>
</html>"#;

pub fn serve_health(is_head: bool) -> Response<ResponseBody> {
    http::build_no_cache_text_response("OK".to_string(), is_head)
}

pub fn serve_fixed_payload(is_head: bool) -> Response<ResponseBody> {
    http::build_payload_response(FIXED_PAYLOAD_LEN, is_head)
}

pub fn serve_index() -> Response<ResponseBody> {
    http::build_html_response(INDEX_HTML)
}
