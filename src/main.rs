use std::process::ExitCode;
use std::sync::Arc;

mod config;
mod error;
mod handler;
mod http;
mod logger;
mod server;

use error::ServerError;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            logger::log_error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), ServerError> {
    let cfg = config::Config::load()?;
    logger::init(&cfg).map_err(ServerError::Logger)?;

    // Worker thread count defaults to the number of CPU cores
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build().map_err(ServerError::Runtime)?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), ServerError> {
    let addr = cfg.get_socket_addr().map_err(ServerError::Address)?;
    let listener =
        server::create_listener(addr).map_err(|source| ServerError::Bind { addr, source })?;

    logger::log_server_start(&addr, &cfg);

    let state = Arc::new(config::AppState::new(&cfg));
    server::start_server_loop(listener, state, server::shutdown_signal()).await;
    Ok(())
}
