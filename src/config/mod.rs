// Configuration module entry point
// Loads process configuration from the environment

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::Config;

/// Environment variable holding the listening port
pub const PORT_ENV: &str = "PORT";

/// Prefix for every other setting, e.g. `QOE_SERVER__WORKERS`
const ENV_PREFIX: &str = "QOE";

impl Config {
    /// Load configuration from the process environment
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_with_port(std::env::var(PORT_ENV).ok())
    }

    /// Load configuration with an explicit `PORT` value
    ///
    /// `PORT` takes precedence over `QOE_SERVER__PORT`.
    pub fn load_with_port(port: Option<String>) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 80)?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "common")?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.header_read_timeout", 30)?
            .set_override_option("server.port", port)?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}
