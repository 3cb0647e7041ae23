//! Lookup socket driver
//!
//! Accepts TCP connections and answers length-prefixed key lookups
//! against a shared `ContinuumContext`. Each connection runs in its own
//! task; the continuum itself needs no coordination beyond the context's
//! snapshot swap.

mod connection;

use crate::context::ContinuumContext;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

pub use connection::Connection;

/// Bind `addr` and serve lookups until the process exits.
pub async fn run(addr: &str, ctx: Arc<ContinuumContext>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("ketama lookup server listening on {}", addr);

    serve(listener, ctx).await
}

/// Serve lookups on an already-bound listener.
pub async fn serve(listener: TcpListener, ctx: Arc<ContinuumContext>) -> anyhow::Result<()> {
    loop {
        let (socket, addr) = listener.accept().await?;
        info!("new lookup connection from {}", addr);

        let ctx = ctx.clone();

        tokio::spawn(async move {
            let mut connection = Connection::new(socket);

            if let Err(e) = connection.handle(ctx).await {
                error!("connection error from {}: {}", addr, e);
            }

            info!("connection closed: {}", addr);
        });
    }
}
