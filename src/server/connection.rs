//! Connection handling
//!
//! Reads length-prefixed keys from a client, resolves each against the
//! shared continuum context and writes the owning server's address back,
//! framed the same way.

use crate::context::ContinuumContext;
use crate::protocol::{FrameEncoder, FrameParser};
use bytes::BytesMut;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, warn};

/// Connection handler
pub struct Connection {
    /// TCP stream
    stream: TcpStream,

    /// Read buffer
    read_buffer: BytesMut,

    /// Write buffer
    write_buffer: BytesMut,
}

impl Connection {
    /// Create a new connection handler
    pub fn new(stream: TcpStream) -> Self {
        Connection {
            stream,
            read_buffer: BytesMut::with_capacity(4096),
            write_buffer: BytesMut::with_capacity(4096),
        }
    }

    /// Handle the connection.
    ///
    /// Reads key frames, resolves them against the current continuum and
    /// answers with address frames. A framing error terminates the read
    /// loop; a failed lookup answers a zero-length frame so the client
    /// can tell "no server" from a dead connection.
    pub async fn handle(&mut self, ctx: Arc<ContinuumContext>) -> anyhow::Result<()> {
        loop {
            let n = self.stream.read_buf(&mut self.read_buffer).await?;

            // Connection closed
            if n == 0 {
                if self.read_buffer.is_empty() {
                    return Ok(());
                } else {
                    anyhow::bail!("connection reset by peer");
                }
            }

            debug!("read {} bytes", n);

            loop {
                match FrameParser::parse(&mut self.read_buffer) {
                    Ok(Some(key)) => {
                        let address = match ctx.lookup(&key) {
                            Ok(server) => server.address,
                            Err(e) => {
                                warn!("lookup failed: {}", e);
                                String::new()
                            }
                        };

                        debug!(key_len = key.len(), %address, "resolved key");
                        self.send_response(&address).await?;
                    }
                    Ok(None) => {
                        // Need more data
                        break;
                    }
                    Err(e) => {
                        warn!("framing error, closing connection: {}", e);
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Send an address response to the client
    async fn send_response(&mut self, address: &str) -> anyhow::Result<()> {
        self.write_buffer.clear();
        FrameEncoder::encode_to(&mut self.write_buffer, address)?;

        self.stream.write_all(&self.write_buffer).await?;
        self.stream.flush().await?;

        Ok(())
    }
}
