//! Per-client session
//!
//! Reads framed commands off one TCP stream, runs them against the store and
//! writes back one response per command, in order.

use std::io::{self, BufReader, BufWriter, ErrorKind};
use std::net::{SocketAddr, TcpStream};
use std::sync::Arc;
use std::time::Duration;

use crate::error::{ListError, Result};
use crate::protocol::{read_command, write_response, Command, Response};
use crate::store::Store;

/// One client session
pub struct Connection {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
    store: Arc<Store>,

    /// `None` if the socket could not report its peer
    peer: Option<SocketAddr>,

    /// Commands answered so far
    served: u64,
}

/// Why a session loop stopped reading
enum Incoming {
    Command(Command),
    Closed,
}

impl Connection {
    /// Wrap an accepted stream
    pub fn new(stream: TcpStream, store: Arc<Store>) -> Result<Self> {
        let peer = stream.peer_addr().ok();

        // Replies are small and latency-bound
        stream.set_nodelay(true)?;
        let reader = BufReader::new(stream.try_clone()?);

        Ok(Self {
            reader,
            writer: BufWriter::new(stream),
            store,
            peer,
            served: 0,
        })
    }

    /// Apply read/write timeouts; 0 leaves that direction blocking
    pub fn set_timeouts(&mut self, read_ms: u64, write_ms: u64) -> Result<()> {
        let as_timeout = |ms: u64| (ms > 0).then(|| Duration::from_millis(ms));

        self.reader
            .get_ref()
            .set_read_timeout(as_timeout(read_ms))?;
        self.writer
            .get_ref()
            .set_write_timeout(as_timeout(write_ms))?;
        Ok(())
    }

    /// Serve commands until the client goes away
    ///
    /// A clean close, a reset or an idle timeout ends the session with `Ok`.
    /// An undecodable frame is answered with ERROR and ends it with `Err`,
    /// since the stream can no longer be trusted to be frame-aligned.
    pub fn handle(&mut self) -> Result<()> {
        tracing::debug!(peer = %self.peer_label(), "Session opened");

        while let Incoming::Command(command) = self.next_command()? {
            tracing::trace!(peer = %self.peer_label(), ?command, "Command received");

            let response = self.respond(command);
            match write_response(&mut self.writer, &response) {
                Ok(()) => self.served += 1,
                Err(ListError::Io(e)) if is_disconnect(&e) => {
                    tracing::debug!(peer = %self.peer_label(), "Client left before its reply");
                    break;
                }
                Err(e) => {
                    tracing::warn!(peer = %self.peer_label(), "Reply failed: {}", e);
                    return Err(e);
                }
            }
        }

        tracing::debug!(
            peer = %self.peer_label(),
            served = self.served,
            "Session closed"
        );
        Ok(())
    }

    /// Address of the client, if known
    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.peer
    }

    fn next_command(&mut self) -> Result<Incoming> {
        match read_command(&mut self.reader) {
            Ok(command) => Ok(Incoming::Command(command)),
            Err(ListError::Io(e)) if is_disconnect(&e) || is_idle_timeout(&e) => {
                tracing::debug!(peer = %self.peer_label(), "Stream ended ({:?})", e.kind());
                Ok(Incoming::Closed)
            }
            Err(e) => {
                tracing::warn!(peer = %self.peer_label(), "Bad request: {}", e);
                let _ = write_response(&mut self.writer, &Response::error(&e.to_string()));
                Err(e)
            }
        }
    }

    fn respond(&self, command: Command) -> Response {
        match self.store.execute(command) {
            Ok(reply) => Response::from_reply(&reply),
            Err(e) if e.is_client_error() => Response::from_error(&e),
            Err(e) => {
                tracing::error!(peer = %self.peer_label(), "Command failed: {}", e);
                Response::from_error(&e)
            }
        }
    }

    fn peer_label(&self) -> String {
        self.peer
            .map(|addr| addr.to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

fn is_disconnect(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        ErrorKind::UnexpectedEof
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::BrokenPipe
    )
}

// Unix reports an expired read timeout as WouldBlock, Windows as TimedOut
fn is_idle_timeout(e: &io::Error) -> bool {
    matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut)
}
