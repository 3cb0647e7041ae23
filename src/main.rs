use ketama::{config, diagnostics, server, ContinuumContext};
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Initialize logging (INFO by default, overridable via RUST_LOG)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let servers_file = match args.next() {
        Some(path) => path,
        None => {
            eprintln!("Usage: ketama <ketama.servers file> [listen addr]");
            std::process::exit(1);
        }
    };
    let listen_addr = args.next().unwrap_or_else(|| "127.0.0.1:26379".to_string());

    info!("ketama starting, loading {}", servers_file);

    let servers = match config::load_server_file(&servers_file) {
        Ok(servers) => servers,
        Err(e) => {
            error!("failed to load server file: {}", e);
            std::process::exit(1);
        }
    };

    let ctx = Arc::new(ContinuumContext::initialize(servers));

    match ctx.current() {
        Some(continuum) => info!("{}", diagnostics::info(&continuum)),
        None => {
            error!(
                "continuum not built: {}",
                ctx.last_error()
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| "unknown error".to_string())
            );
            std::process::exit(1);
        }
    }

    if let Err(e) = server::run(&listen_addr, ctx).await {
        error!("lookup server error: {}", e);
        std::process::exit(1);
    }
}
