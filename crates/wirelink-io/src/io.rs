//! IO task for a module session.
//!
//! One tokio task owns the transport exclusively. It writes outbound
//! requests handed to it over a channel and, whenever it is otherwise idle,
//! reads from the port and feeds every received byte to the session's
//! [`Engine`]. Confirmations are never read inline with a request: the
//! engine correlates them, so a caller sends through [`LinkIo::send`] and
//! then awaits the engine.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use wirelink_core::engine::Engine;
use wirelink_core::error::{Error, Result};
use wirelink_core::protocol::Protocol;
use wirelink_core::transport::Transport;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Configuration for the IO task.
#[derive(Debug, Clone)]
pub struct IoConfig {
    /// Timeout for one idle read from the transport.
    pub idle_read_timeout: Duration,
    /// Pause after an empty idle read before polling the port again.
    pub idle_backoff: Duration,
    /// Size of the buffer handed to `Transport::receive`.
    pub read_buffer_size: usize,
    /// Optional bytes written just before the transport is handed back on
    /// shutdown.
    pub shutdown_bytes: Option<Vec<u8>>,
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            idle_read_timeout: Duration::from_millis(100),
            idle_backoff: Duration::from_millis(10),
            read_buffer_size: 256,
            shutdown_bytes: None,
        }
    }
}

/// A request sent from session methods to the IO task.
pub enum Request {
    /// Write bytes to the port.
    Send {
        bytes: Vec<u8>,
        reply: oneshot::Sender<Result<()>>,
    },
    /// Graceful shutdown; returns the transport for recovery.
    Shutdown {
        reply: oneshot::Sender<Box<dyn Transport>>,
    },
}

/// Handle to the IO task.
pub struct LinkIo {
    /// Outbound request channel.
    pub tx: mpsc::Sender<Request>,
    /// Cancellation token for abandoning the task without recovering the
    /// transport.
    pub cancel: CancellationToken,
    /// Join handle for the IO task.
    pub task: JoinHandle<()>,
}

impl LinkIo {
    /// Hand `bytes` to the IO task and wait until they are written.
    pub async fn send(&self, bytes: Vec<u8>) -> Result<()> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(Request::Send {
                bytes,
                reply: reply_tx,
            })
            .await
            .map_err(|_| Error::NotConnected)?;

        match reply_rx.await {
            Ok(result) => result,
            Err(_) => Err(Error::NotConnected),
        }
    }

    /// Whether the IO task is still running.
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Shut down the IO task and recover the transport.
    pub async fn shutdown(self) -> Result<Box<dyn Transport>> {
        let (reply_tx, reply_rx) = oneshot::channel();
        let _ = self.tx.send(Request::Shutdown { reply: reply_tx }).await;
        let transport = reply_rx.await.map_err(|_| Error::NotConnected)?;
        let _ = self.task.await;
        Ok(transport)
    }
}

// ---------------------------------------------------------------------------
// Spawn
// ---------------------------------------------------------------------------

/// Spawn the IO task for `engine`. Returns the handle for sending.
pub fn spawn_io_task<P: Protocol>(
    transport: Box<dyn Transport>,
    engine: Arc<Engine<P>>,
    config: IoConfig,
) -> LinkIo {
    let (tx, rx) = mpsc::channel::<Request>(32);
    let cancel = CancellationToken::new();
    let cancel_clone = cancel.clone();

    let task = tokio::spawn(io_loop(transport, engine, config, rx, cancel_clone));

    LinkIo { tx, cancel, task }
}

// ---------------------------------------------------------------------------
// IO Loop
// ---------------------------------------------------------------------------

/// The main IO loop. Runs as a spawned Tokio task.
///
/// Uses `tokio::select! { biased; }` to prioritize:
/// 1. Cancellation
/// 2. Outbound requests
/// 3. Idle reads feeding the engine
async fn io_loop<P: Protocol>(
    mut transport: Box<dyn Transport>,
    engine: Arc<Engine<P>>,
    config: IoConfig,
    mut rx: mpsc::Receiver<Request>,
    cancel: CancellationToken,
) {
    let mut read_buf = vec![0u8; config.read_buffer_size.max(1)];

    loop {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                debug!("IO task cancelled");
                break;
            }

            req = rx.recv() => {
                match req {
                    Some(Request::Send { bytes, reply }) => {
                        debug!(len = bytes.len(), "writing request");
                        let result = transport.send(&bytes).await;
                        let _ = reply.send(result);
                    }
                    Some(Request::Shutdown { reply }) => {
                        debug!("IO task shutdown requested");
                        if let Some(bytes) = &config.shutdown_bytes {
                            let _ = transport.send(bytes).await;
                        }
                        let _ = reply.send(transport);
                        return;
                    }
                    None => {
                        debug!("request channel closed, exiting IO task");
                        break;
                    }
                }
            }

            // Idle: read whatever the module sends.
            outcome = async {
                match transport.receive(&mut read_buf, config.idle_read_timeout).await {
                    Ok(n) if n > 0 => {
                        engine.on_bytes(&read_buf[..n]);
                        Ok(())
                    }
                    Err(Error::ConnectionLost) => Err(Error::ConnectionLost),
                    _ => {
                        // Timeout or empty read: yield so the loop can
                        // check for requests or cancellation.
                        tokio::time::sleep(config.idle_backoff).await;
                        Ok(())
                    }
                }
            } => {
                if let Err(e) = outcome {
                    warn!(error = %e, "transport lost, stopping IO task");
                    break;
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
