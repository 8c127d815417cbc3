//! TCP Server
//!
//! Accepts connections and hands each one to its own session thread.

use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use super::events::{EventSink, TracingSink};
use super::{Session, Transport};
use crate::config::Config;
use crate::error::Result;
use crate::protocol::FrameCodec;

/// Pause after a failed accept before trying again
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(50);

/// TCP server for framewire
pub struct Server {
    config: Config,

    /// Bound listener, dropped when `run` returns
    listener: TcpListener,

    local_addr: SocketAddr,

    codec: FrameCodec,

    sink: Arc<dyn EventSink>,

    /// Set by `ShutdownHandle` to stop the accept loop
    shutdown: Arc<AtomicBool>,

    /// Sessions currently running
    active: Arc<AtomicUsize>,

    next_session_id: u64,
}

impl Server {
    /// Bind the listen address, logging session events through `tracing`
    pub fn bind(config: Config) -> Result<Self> {
        Self::bind_with_sink(config, Arc::new(TracingSink))
    }

    /// Bind the listen address, sending session events to `sink`
    pub fn bind_with_sink(config: Config, sink: Arc<dyn EventSink>) -> Result<Self> {
        config.validate()?;

        let listener = TcpListener::bind(&config.listen_addr)?;
        let local_addr = listener.local_addr()?;
        let codec = FrameCodec::new(config.max_payload_size);

        tracing::info!("Listening on {}", local_addr);

        Ok(Self {
            config,
            listener,
            local_addr,
            codec,
            sink,
            shutdown: Arc::new(AtomicBool::new(false)),
            active: Arc::new(AtomicUsize::new(0)),
            next_session_id: 0,
        })
    }

    /// Address actually bound (resolves port 0)
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Number of sessions currently running
    pub fn active_connections(&self) -> usize {
        self.active.load(Ordering::Acquire)
    }

    /// Handle that stops `run` from another thread
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            flag: Arc::clone(&self.shutdown),
            active: Arc::clone(&self.active),
            addr: self.local_addr,
        }
    }

    /// Start the server (blocking)
    ///
    /// Returns after a shutdown request. Sessions already running keep going
    /// until their clients leave; the listener is closed on return.
    pub fn run(mut self) -> Result<()> {
        tracing::info!(
            "Accepting connections on {} (max {})",
            self.local_addr,
            self.config.max_connections
        );

        while !self.shutdown.load(Ordering::Acquire) {
            let stream = match self.listener.accept() {
                Ok((stream, _)) => stream,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    // Persistent failures (e.g. out of descriptors) would otherwise spin
                    tracing::warn!("Failed to accept connection: {}", e);
                    thread::sleep(ACCEPT_ERROR_BACKOFF);
                    continue;
                }
            };

            // The wake-up connection from ShutdownHandle lands here too
            if self.shutdown.load(Ordering::Acquire) {
                break;
            }

            if let Err(e) = self.spawn_session(stream) {
                tracing::warn!("Failed to start session: {}", e);
            }
        }

        tracing::info!("Server on {} stopped accepting", self.local_addr);
        Ok(())
    }

    fn spawn_session(&mut self, mut stream: TcpStream) -> Result<()> {
        let Some(guard) = ConnectionGuard::acquire(&self.active, self.config.max_connections)
        else {
            tracing::warn!(
                "Rejecting {}: connection limit ({}) reached",
                stream.peer(),
                self.config.max_connections
            );
            let _ = stream.close();
            return Ok(());
        };

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;
        if self.config.read_timeout_ms > 0 {
            stream.set_read_timeout(Some(Duration::from_millis(self.config.read_timeout_ms)))?;
        }
        if self.config.write_timeout_ms > 0 {
            stream.set_write_timeout(Some(Duration::from_millis(self.config.write_timeout_ms)))?;
        }

        let id = self.next_session_id;
        self.next_session_id += 1;

        // Created on the session thread: a failed spawn must not report Opened
        let codec = self.codec;
        let sink = Arc::clone(&self.sink);
        thread::Builder::new()
            .name(format!("session-{}", id))
            .spawn(move || {
                let _guard = guard;
                Session::new(stream, codec, sink).run();
            })?;

        Ok(())
    }
}

/// Stops a running server's accept loop
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,
    active: Arc<AtomicUsize>,
    addr: SocketAddr,
}

impl ShutdownHandle {
    /// Signal the server to stop accepting
    ///
    /// The accept call is blocking, so a throwaway connection is made to wake
    /// it up.
    pub fn shutdown(&self) {
        if self.flag.swap(true, Ordering::AcqRel) {
            return;
        }

        let mut wake_addr = self.addr;
        if wake_addr.ip().is_unspecified() {
            let loopback = match wake_addr.ip() {
                IpAddr::V4(_) => IpAddr::V4(Ipv4Addr::LOCALHOST),
                IpAddr::V6(_) => IpAddr::V6(Ipv6Addr::LOCALHOST),
            };
            wake_addr.set_ip(loopback);
        }

        if let Err(e) = TcpStream::connect_timeout(&wake_addr, Duration::from_secs(1)) {
            tracing::debug!("Shutdown wake-up connection to {} failed: {}", wake_addr, e);
        }
    }

    pub fn is_shutdown(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    /// Number of sessions still running, including after `run` has returned
    pub fn active_connections(&self) -> usize {
        self.active.load(Ordering::Acquire)
    }
}

/// Slot in the active-connection count, released on drop
struct ConnectionGuard {
    active: Arc<AtomicUsize>,
}

impl ConnectionGuard {
    fn acquire(active: &Arc<AtomicUsize>, limit: usize) -> Option<Self> {
        active
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < limit).then_some(n + 1)
            })
            .ok()?;

        Some(Self {
            active: Arc::clone(active),
        })
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::AcqRel);
    }
}
