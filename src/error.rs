//! Error types
//!
//! `RouterError` is returned from the request service; hyper aborts the
//! connection when it sees one. `ServerError` covers fatal startup failures.

use std::net::SocketAddr;
use std::num::ParseIntError;

use thiserror::Error;

/// Failure while handling a single request
#[derive(Debug, Error)]
pub enum RouterError {
    #[error("invalid value '{value}' for query parameter '{name}': {source}")]
    ParameterFormat {
        name: &'static str,
        value: String,
        #[source]
        source: ParseIntError,
    },
}

/// Failure while starting the server
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("{0}")]
    Address(String),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to initialise logger: {0}")]
    Logger(#[source] std::io::Error),

    #[error("failed to build runtime: {0}")]
    Runtime(#[source] std::io::Error),
}
