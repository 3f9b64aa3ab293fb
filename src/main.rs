use std::path::PathBuf;
use std::sync::Arc;

mod config;
mod handler;
mod http;
mod logger;
mod server;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = config::Config::load()?;

    // Current-thread runtime: one request is handled fully before the next
    // connection is accepted.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    // Anchor all relative file resolution to the executable's directory,
    // no matter where the process was launched from.
    let root = resolve_document_root()?;
    std::env::set_current_dir(&root)?;

    logger::init(&cfg)?;

    let addr = cfg.socket_addr()?;

    // A bind failure (address in use, no permission) is fatal; the error
    // propagates out of main and the process exits nonzero.
    let listener = server::listener::bind(addr)?;

    logger::log_server_start(&addr, &root, &cfg);

    let state = Arc::new(server::ServerState { root, config: cfg });
    server::run(listener, state).await
}

/// Resolve the document root: the directory containing the running executable.
fn resolve_document_root() -> std::io::Result<PathBuf> {
    let exe = std::env::current_exe()?;
    let dir = exe.parent().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "executable path has no parent directory",
        )
    })?;
    dir.canonicalize()
}
