//! Server module
//!
//! Owns the accept loop. Connections are served sequentially: each one is
//! driven to completion before the next is accepted. There is no shutdown
//! path; the loop runs until the process is terminated externally.

pub mod listener;

use crate::config::Config;
use crate::handler;
use crate::logger;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};

/// State shared with every request: the document root and the configuration.
/// Both are read-only for the lifetime of the process.
pub struct ServerState {
    pub root: PathBuf,
    pub config: Config,
}

/// Run the accept loop. Never returns under normal operation.
pub async fn run(
    listener: TcpListener,
    state: Arc<ServerState>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        match listener.accept().await {
            Ok((stream, peer_addr)) => {
                serve_one(stream, peer_addr, &state).await;
            }
            Err(e) => {
                logger::log_error(&format!("Failed to accept connection: {e}"));
            }
        }
    }
}

/// Serve a single connection to completion.
///
/// Keep-alive is disabled: one request per connection, matching the
/// HTTP/1.0-style behavior of the handler this server replaces. A serve
/// error ends only this connection, never the loop.
async fn serve_one(stream: TcpStream, peer_addr: SocketAddr, state: &Arc<ServerState>) {
    let io = TokioIo::new(stream);

    let conn_state = Arc::clone(state);
    let service = service_fn(move |req| {
        let state = Arc::clone(&conn_state);
        async move { handler::handle_request(req, peer_addr, state).await }
    });

    let conn = http1::Builder::new()
        .keep_alive(false)
        .serve_connection(io, service);

    if let Err(err) = conn.await {
        logger::log_connection_error(&err);
    }
}
