//! A connected binary-framed module.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, info};

use wirelink_core::error::Result;
use wirelink_core::stats::StatsSnapshot;
use wirelink_core::transport::Transport;
use wirelink_io::Session;

use crate::classify::Status;
use crate::commands;
use crate::frame::{encode_request, FrameProfile};
use crate::protocol::FrameProtocol;

/// A binary-framed radio or BLE module.
///
/// Built with [`BinaryModuleBuilder`](crate::builder::BinaryModuleBuilder).
/// Indications are delivered to the event sink chosen at build time.
///
/// Commands on one module must be awaited one at a time; each command
/// clears confirmations still pending for another.
pub struct BinaryModule {
    session: Session<FrameProtocol>,
    profile: FrameProfile,
}

impl BinaryModule {
    pub(crate) fn new(session: Session<FrameProtocol>, profile: FrameProfile) -> Self {
        BinaryModule { session, profile }
    }

    /// The framing profile in use.
    pub fn profile(&self) -> &FrameProfile {
        &self.profile
    }

    /// Send request `identity` with `payload` and require a successful
    /// confirmation.
    pub async fn request(&self, identity: u8, payload: &[u8]) -> Result<()> {
        self.request_expecting(identity, payload, Status::SUCCESS).await
    }

    /// Send request `identity` and require a confirmation with `expected`
    /// status.
    pub async fn request_expecting(
        &self,
        identity: u8,
        payload: &[u8],
        expected: Status,
    ) -> Result<()> {
        let bytes = encode_request(&self.profile, identity, payload)?;
        debug!(command = identity, len = payload.len(), "binary request");
        self.session
            .request_with_retry(&bytes, commands::confirmation_of(identity), expected)
            .await
    }

    /// Send request `identity` and return whatever status the module
    /// confirms with.
    pub async fn request_status(&self, identity: u8, payload: &[u8]) -> Result<Status> {
        let bytes = encode_request(&self.profile, identity, payload)?;
        debug!(command = identity, len = payload.len(), "binary request");
        self.session
            .request_status(&bytes, commands::confirmation_of(identity))
            .await
    }

    /// Software-reset the module.
    ///
    /// Local receive state is dropped first, so a frame cut off by the
    /// reset cannot swallow the confirmation.
    pub async fn reset(&self) -> Result<()> {
        self.session.reset();
        self.request(commands::RESET, &[]).await?;
        info!("module reset confirmed");
        Ok(())
    }

    /// Query the module's operating state; returns the confirmation status.
    pub async fn get_state(&self) -> Result<Status> {
        self.request_status(commands::GET_STATE, &[]).await
    }

    /// Transmit `payload` over the air.
    pub async fn send_data(&self, payload: &[u8]) -> Result<()> {
        self.request(commands::DATA, payload).await
    }

    /// Wait for the confirmation keyed `command` without sending anything.
    ///
    /// For exchanges the caller drives by hand through
    /// [`session`](Self::session). With `reset` the confirmation table is
    /// cleared before this returns.
    pub fn wait_for_confirmation(
        &self,
        command: u8,
        expected: Status,
        timeout: Duration,
        reset: bool,
    ) -> impl Future<Output = Result<()>> + Send + 'static {
        self.session
            .wait_for_confirmation(command, expected, timeout, reset)
    }

    /// The underlying session.
    pub fn session(&self) -> &Session<FrameProtocol> {
        &self.session
    }

    /// Snapshot of the receive counters.
    pub fn stats(&self) -> StatsSnapshot {
        self.session.stats()
    }

    /// Stop the IO task and hand back the transport.
    pub async fn close(self) -> Result<Box<dyn Transport>> {
        self.session.shutdown().await
    }
}
