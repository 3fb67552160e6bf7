//! A running module session: engine plus IO task.
//!
//! [`Session`] is what the per-family module types wrap. It owns the IO
//! task handle and shares the [`Engine`] with it, and it implements the
//! request pattern every family uses: clear the confirmation table, write
//! the request, await the matching confirmation, optionally retry.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use wirelink_core::engine::Engine;
use wirelink_core::error::{Error, Result};
use wirelink_core::protocol::Protocol;
use wirelink_core::stats::StatsSnapshot;
use wirelink_core::transport::Transport;

use crate::io::{spawn_io_task, IoConfig, LinkIo};

/// Request policy for a session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How long a request waits for its confirmation (default 500 ms).
    pub command_timeout: Duration,
    /// Whether to resend a request after a timeout or corrupted reply.
    pub auto_retry: bool,
    /// Maximum number of resends when `auto_retry` is enabled.
    pub max_retries: u32,
    /// IO task settings.
    pub io: IoConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            command_timeout: Duration::from_millis(500),
            auto_retry: false,
            max_retries: 3,
            io: IoConfig::default(),
        }
    }
}

/// Engine and IO task of one connected module.
pub struct Session<P: Protocol> {
    engine: Arc<Engine<P>>,
    io: LinkIo,
    config: SessionConfig,
}

impl<P: Protocol> Session<P> {
    /// Spawn the IO task over `transport` and start routing received bytes
    /// into `engine`.
    pub fn start(transport: Box<dyn Transport>, engine: Engine<P>, config: SessionConfig) -> Self {
        let engine = Arc::new(engine);
        let io = spawn_io_task(transport, Arc::clone(&engine), config.io.clone());
        debug!(
            command_timeout_ms = config.command_timeout.as_millis() as u64,
            auto_retry = config.auto_retry,
            "session started"
        );
        Session { engine, io, config }
    }

    /// The shared engine.
    pub fn engine(&self) -> &Arc<Engine<P>> {
        &self.engine
    }

    /// The default confirmation timeout.
    pub fn command_timeout(&self) -> Duration {
        self.config.command_timeout
    }

    /// Write raw bytes to the module.
    ///
    /// Completion only means the bytes reached the port; the module's answer
    /// arrives through the engine.
    pub async fn send_request(&self, bytes: Vec<u8>) -> Result<()> {
        self.io.send(bytes).await
    }

    /// See [`Engine::wait_for_confirmation`].
    pub fn wait_for_confirmation(
        &self,
        key: P::Key,
        expected: P::Status,
        timeout: Duration,
        reset: bool,
    ) -> impl Future<Output = Result<()>> + Send + 'static {
        self.engine.wait_for_confirmation(key, expected, timeout, reset)
    }

    /// See [`Engine::wait_for_status`].
    pub fn wait_for_status(
        &self,
        key: P::Key,
        timeout: Duration,
        reset: bool,
    ) -> impl Future<Output = Result<P::Status>> + Send + 'static {
        self.engine.wait_for_status(key, timeout, reset)
    }

    /// Send `bytes` and return the status of the confirmation keyed `key`.
    ///
    /// The confirmation table is cleared before each attempt. With auto
    /// retry enabled, attempts that end in [`Error::Timeout`] or
    /// [`Error::CorruptedFrames`] are resent after a linear backoff.
    ///
    /// Requests on one session must not overlap: starting a request
    /// discards confirmations another in-flight request is waiting for.
    pub async fn request_status(&self, bytes: &[u8], key: P::Key) -> Result<P::Status> {
        let retries = if self.config.auto_retry {
            self.config.max_retries
        } else {
            0
        };

        let mut attempt = 0u32;
        loop {
            if attempt > 0 {
                debug!(attempt, ?key, "request retry");
                tokio::time::sleep(Duration::from_millis(20 * attempt as u64)).await;
            }

            let wait = self
                .engine
                .wait_for_status(key.clone(), self.config.command_timeout, true);
            self.io.send(bytes.to_vec()).await?;

            match wait.await {
                Err(e) if e.is_retryable() && attempt < retries => {
                    debug!(error = %e, attempt, "request attempt failed");
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    /// Send `bytes` and require a confirmation keyed `key` with `expected`
    /// status, retrying per the session's policy.
    pub async fn request_with_retry(
        &self,
        bytes: &[u8],
        key: P::Key,
        expected: P::Status,
    ) -> Result<()> {
        let status = self.request_status(bytes, key).await?;
        if status == expected {
            Ok(())
        } else {
            Err(Error::StatusMismatch {
                expected: format!("{expected:?}"),
                actual: format!("{status:?}"),
            })
        }
    }

    /// Drop any partial frame and every pending confirmation.
    pub fn reset(&self) {
        self.engine.reset_session();
    }

    /// Snapshot of the receive counters.
    pub fn stats(&self) -> StatsSnapshot {
        self.engine.stats()
    }

    /// Whether the IO task is still running.
    pub fn is_running(&self) -> bool {
        self.io.is_running()
    }

    /// Stop the IO task and hand back the transport.
    pub async fn shutdown(self) -> Result<Box<dyn Transport>> {
        debug!("session shutting down");
        self.io.shutdown().await
    }
}
