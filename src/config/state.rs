// Application state module
// Shared, read-only configuration plus transport-level connection accounting

use std::sync::atomic::{AtomicUsize, Ordering};

use super::types::Config;

/// Application state shared by every connection task
pub struct AppState {
    pub config: Config,

    /// Connections currently being served
    pub active_connections: AtomicUsize,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
            active_connections: AtomicUsize::new(0),
        }
    }

    /// Reserve a connection slot
    ///
    /// Increments first, then checks, so concurrent accepts cannot both slip
    /// under the limit. Returns the previous count on rejection.
    pub fn try_acquire_connection(&self) -> Result<(), usize> {
        let prev_count = self.active_connections.fetch_add(1, Ordering::SeqCst);

        if let Some(max_conn) = self.config.performance.max_connections {
            if prev_count >= usize::try_from(max_conn).unwrap_or(usize::MAX) {
                self.active_connections.fetch_sub(1, Ordering::SeqCst);
                return Err(prev_count);
            }
        }

        Ok(())
    }

    /// Release a slot taken by [`Self::try_acquire_connection`]
    pub fn release_connection(&self) {
        self.active_connections.fetch_sub(1, Ordering::SeqCst);
    }
}
