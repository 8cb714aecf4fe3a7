// Connection handling module
// Accepts a single TCP connection and serves it on its own task

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::Request;
use hyper_util::rt::{TokioIo, TokioTimer};
use tokio::net::TcpStream;

use crate::config::AppState;
use crate::handler::{self, RequestContext};
use crate::logger;

/// Accept a connection, enforcing the connection limit.
///
/// Connections over `performance.max_connections` are dropped without a
/// response.
pub fn accept_connection(stream: TcpStream, peer_addr: SocketAddr, state: &Arc<AppState>) {
    if let Err(prev_count) = state.try_acquire_connection() {
        logger::log_warning(&format!(
            "Max connections reached: {prev_count}/{}. Connection from {peer_addr} rejected.",
            state.config.performance.max_connections.unwrap_or_default()
        ));
        drop(stream);
        return;
    }

    handle_connection(stream, peer_addr, Arc::clone(state));
}

/// Serve one connection on a spawned task.
///
/// Requests on the connection are handled one after another (HTTP/1.1), but
/// every connection has its own task, so a delayed response only holds up
/// its own connection. A service error (e.g. an unparseable `ms`) makes hyper
/// abort the connection; it is logged here and the listener carries on.
fn handle_connection(stream: TcpStream, peer_addr: SocketAddr, state: Arc<AppState>) {
    tokio::spawn(async move {
        let io = TokioIo::new(stream);
        let performance = &state.config.performance;

        let mut builder = http1::Builder::new();
        builder
            .timer(TokioTimer::new())
            .keep_alive(performance.keep_alive)
            .header_read_timeout(Duration::from_secs(performance.header_read_timeout));

        let service_state = Arc::clone(&state);
        let conn = builder.serve_connection(
            io,
            service_fn(move |req: Request<Incoming>| {
                let state = Arc::clone(&service_state);
                let ctx = RequestContext::from_request(&req, peer_addr);
                async move { handler::handle_request(ctx, &state).await }
            }),
        );

        if let Err(err) = conn.await {
            logger::log_connection_error(&err);
        }

        state.release_connection();
    });
}
