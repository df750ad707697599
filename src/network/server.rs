//! TCP Server
//!
//! Accepts connections and serves each one on its own thread.

use std::io::BufWriter;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use crate::config::Config;
use crate::error::{ListError, Result};
use crate::protocol::{write_response, Response};
use crate::store::Store;
use super::Connection;

/// TCP server for remotelist
pub struct Server {
    config: Config,
    store: Arc<Store>,
    listener: Option<TcpListener>,
    shutdown: Arc<AtomicBool>,
    active_connections: Arc<AtomicUsize>,
}

/// Stops a running server from another thread
#[derive(Clone)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,
    addr: SocketAddr,
}

impl ShutdownHandle {
    /// Signal the server to stop accepting connections
    ///
    /// The accept loop is blocked in `accept`, so a throwaway connection is
    /// made to wake it up.
    pub fn shutdown(&self) {
        self.flag.store(true, Ordering::SeqCst);
        let _ = TcpStream::connect(self.addr);
    }
}

/// Decrements the live connection count when a worker exits
struct ConnectionSlot(Arc<AtomicUsize>);

impl Drop for ConnectionSlot {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Server {
    /// Create a new server with the given config and store
    pub fn new(config: Config, store: Arc<Store>) -> Self {
        Self {
            config,
            store,
            listener: None,
            shutdown: Arc::new(AtomicBool::new(false)),
            active_connections: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Bind the listen address (idempotent) and return the bound address
    ///
    /// Binding `127.0.0.1:0` picks a free port; use the returned address.
    pub fn bind(&mut self) -> Result<SocketAddr> {
        if self.listener.is_none() {
            let listener = TcpListener::bind(&self.config.listen_addr).map_err(|e| {
                ListError::Network(format!("cannot bind {}: {}", self.config.listen_addr, e))
            })?;
            self.listener = Some(listener);
        }
        self.local_addr()
    }

    /// Address the server is bound to
    pub fn local_addr(&self) -> Result<SocketAddr> {
        match &self.listener {
            Some(listener) => Ok(listener.local_addr()?),
            None => Err(ListError::Network("server is not bound".to_string())),
        }
    }

    /// Handle for stopping the server from another thread (binds first)
    pub fn shutdown_handle(&mut self) -> Result<ShutdownHandle> {
        let addr = self.bind()?;
        Ok(ShutdownHandle {
            flag: Arc::clone(&self.shutdown),
            addr,
        })
    }

    /// Start the server (blocking)
    ///
    /// Accepts connections until shut down, one worker thread per connection.
    pub fn run(&mut self) -> Result<()> {
        let addr = self.bind()?;
        tracing::info!("Listening on {}", addr);

        let listener = match &self.listener {
            Some(listener) => listener,
            None => return Err(ListError::Network("server is not bound".to_string())),
        };

        for stream in listener.incoming() {
            if self.shutdown.load(Ordering::SeqCst) {
                break;
            }

            match stream {
                Ok(stream) => self.dispatch(stream),
                Err(e) => tracing::warn!("Failed to accept connection: {}", e),
            }
        }

        tracing::info!("Server stopped accepting connections");
        Ok(())
    }

    /// Signal the server to shutdown gracefully
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
        if let Ok(addr) = self.local_addr() {
            let _ = TcpStream::connect(addr);
        }
    }

    /// Number of connections currently being served
    pub fn active_connections(&self) -> usize {
        self.active_connections.load(Ordering::SeqCst)
    }

    /// Hand a new connection to a worker thread, or reject it when full
    fn dispatch(&self, stream: TcpStream) {
        let active = self.active_connections.fetch_add(1, Ordering::SeqCst);
        let slot = ConnectionSlot(Arc::clone(&self.active_connections));

        if active >= self.config.max_connections {
            tracing::warn!(
                "Rejecting connection: {} connections already open",
                active
            );
            let mut writer = BufWriter::new(stream);
            let _ = write_response(&mut writer, &Response::error("too many connections"));
            return;
        }

        let store = Arc::clone(&self.store);
        let read_ms = self.config.read_timeout_ms;
        let write_ms = self.config.write_timeout_ms;

        let spawned = thread::Builder::new()
            .name("remotelist-conn".to_string())
            .spawn(move || {
                let _slot = slot;
                let result = Connection::new(stream, store).and_then(|mut conn| {
                    conn.set_timeouts(read_ms, write_ms)?;
                    conn.handle()
                });
                if let Err(e) = result {
                    tracing::debug!("Connection ended with error: {}", e);
                }
            });

        if let Err(e) = spawned {
            tracing::error!("Failed to spawn connection worker: {}", e);
        }
    }
}
