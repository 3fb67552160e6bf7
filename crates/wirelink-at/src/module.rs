//! A connected AT command module.

use tracing::debug;

use wirelink_core::error::Result;
use wirelink_core::stats::StatsSnapshot;
use wirelink_core::transport::Transport;
use wirelink_io::Session;

use crate::command::{encode_command, AtArg, AtCommand};
use crate::protocol::{AtConfig, AtKey, AtProtocol, AtStatus};

/// A WiFi or cellular module speaking AT commands.
///
/// Built with [`AtModuleBuilder`](crate::builder::AtModuleBuilder).
/// Information and unsolicited lines (`+CSQ: ...`) are delivered to the
/// event sink chosen at build time; the final result code confirms the
/// command.
///
/// Commands on one module must be awaited one at a time; each command
/// clears confirmations still pending for another.
pub struct AtModule {
    session: Session<AtProtocol>,
    config: AtConfig,
}

impl AtModule {
    pub(crate) fn new(session: Session<AtProtocol>, config: AtConfig) -> Self {
        AtModule { session, config }
    }

    pub fn config(&self) -> &AtConfig {
        &self.config
    }

    /// Send `AT<keyword>=<args>` and require `OK`.
    pub async fn command(&self, keyword: &str, args: &[AtArg]) -> Result<()> {
        self.run(keyword, AtCommand::Set(args.to_vec())).await
    }

    /// Send `AT<keyword>?` and require `OK`. The answer arrives as an event.
    pub async fn query(&self, keyword: &str) -> Result<()> {
        self.run(keyword, AtCommand::Query).await
    }

    /// Send `AT<keyword>` and require `OK`.
    pub async fn execute(&self, keyword: &str) -> Result<()> {
        self.run(keyword, AtCommand::Execute).await
    }

    /// Send `AT` and require `OK`.
    pub async fn ping(&self) -> Result<()> {
        self.execute("").await
    }

    /// Send a command and return its final result code, whatever it is.
    pub async fn command_status(&self, keyword: &str, command: AtCommand) -> Result<AtStatus> {
        let line = encode_command(keyword, &command, &self.config.eol, self.config.max_line)?;
        debug!(keyword, "AT command");
        self.session.request_status(&line, AtKey::Final).await
    }

    async fn run(&self, keyword: &str, command: AtCommand) -> Result<()> {
        let line = encode_command(keyword, &command, &self.config.eol, self.config.max_line)?;
        debug!(keyword, "AT command");
        self.session
            .request_with_retry(&line, AtKey::Final, AtStatus::Ok)
            .await
    }

    /// The underlying session.
    pub fn session(&self) -> &Session<AtProtocol> {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::AtModuleBuilder;
    use crate::events::AtEvent;
    use std::time::Duration;
    use wirelink_core::error::Error;
    use wirelink_test_harness::MockTransport;

    async fn build(mock: MockTransport) -> AtModule {
        AtModuleBuilder::new()
            .command_timeout(Duration::from_millis(200))
            .build_with_transport(Box::new(mock))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn set_command_ok() {
        let mut mock = MockTransport::new();
        mock.expect(b"AT+CEREG=2\r\n", b"\r\nOK\r\n");
        let module = build(mock).await;

        module.command("+CEREG", &[2i64.into()]).await.unwrap();
        let _ = module.close().await;
    }

    #[tokio::test]
    async fn query_answer_goes_to_sink() {
        let mut mock = MockTransport::new().with_chunk_size(3);
        mock.expect(b"AT+CSQ\r\n", b"\r\n+CSQ: 23,99\r\n\r\nOK\r\n");
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let module = AtModuleBuilder::new()
            .event_sink(tx)
            .build_with_transport(Box::new(mock))
            .await
            .unwrap();

        module.execute("+CSQ").await.unwrap();
        assert_eq!(
            rx.try_recv().unwrap(),
            AtEvent::SignalQuality { rssi: 23, ber: 99 }
        );
        let _ = module.close().await;
    }

    #[tokio::test]
    async fn cme_error_is_a_mismatch() {
        let mut mock = MockTransport::new();
        mock.expect(b"AT+CPIN?\r\n", b"\r\n+CME ERROR: 10\r\n");
        let module = build(mock).await;

        match module.query("+CPIN").await {
            Err(Error::StatusMismatch { expected, actual }) => {
                assert_eq!(expected, "Ok");
                assert_eq!(actual, "CmeError(\"10\")");
            }
            other => panic!("expected StatusMismatch, got {other:?}"),
        }
        let _ = module.close().await;
    }

    #[tokio::test]
    async fn command_status_returns_error_code() {
        let mut mock = MockTransport::new();
        mock.expect(b"AT+CFUN=1\r\n", b"\r\n+CMS ERROR: 500\r\n");
        let module = build(mock).await;

        let status = module
            .command_status("+CFUN", AtCommand::Set(vec![1i64.into()]))
            .await
            .unwrap();
        assert_eq!(status, AtStatus::CmsError("500".into()));
        let _ = module.close().await;
    }

    #[tokio::test]
    async fn silent_module_times_out() {
        let mut mock = MockTransport::new();
        mock.expect(b"AT\r\n", b"");
        let module = build(mock).await;

        assert!(matches!(module.ping().await, Err(Error::Timeout)));
        let _ = module.close().await;
    }

    #[tokio::test]
    async fn echo_is_dropped_and_counted() {
        let mut mock = MockTransport::new();
        mock.expect(b"AT\r\n", b"AT\r\nOK\r\n");
        let module = build(mock).await;

        module.ping().await.unwrap();
        assert_eq!(module.stats().unrecognized, 1);
        let _ = module.close().await;
    }

    #[tokio::test]
    async fn overlong_command_is_rejected_before_sending() {
        let module = AtModuleBuilder::new()
            .max_line(16)
            .build_with_transport(Box::new(MockTransport::new()))
            .await
            .unwrap();
        let result = module
            .command("+CGDCONT", &[1i64.into(), "IP".into(), "internet".into()])
            .await;
        assert!(matches!(result, Err(Error::PayloadTooLarge { max: 16, .. })));
        let _ = module.close().await;
    }
}
