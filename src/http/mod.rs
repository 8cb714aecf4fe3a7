//! HTTP protocol layer module
//!
//! Response bodies, response builders and query string decoding, kept apart
//! from the routing decisions in `handler`.

pub mod body;
pub mod query;
pub mod response;

// Re-export commonly used types
pub use body::ResponseBody;
pub use response::{
    build_404_response, build_501_response, build_html_response, build_no_cache_text_response,
    build_payload_response,
};
