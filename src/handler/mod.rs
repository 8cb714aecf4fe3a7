//! Request handler module
//!
//! Responsible for request routing dispatch and the behaviour of each endpoint.

pub mod delay;
pub mod pages;
pub mod router;

// Re-export main entry point
pub use router::{handle_request, RequestContext};
