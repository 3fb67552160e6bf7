//! Receive-path counters.
//!
//! Errors on the receive path are absorbed rather than propagated, so these
//! counters are how a caller finds out that frames are being lost.

use std::sync::atomic::{AtomicU32, Ordering};

/// Live counters updated by the engine's receive path.
#[derive(Debug, Default)]
pub struct LinkStats {
    messages: AtomicU32,
    corrupt: AtomicU32,
    unrecognized: AtomicU32,
    confirmations: AtomicU32,
    overflows: AtomicU32,
    events: AtomicU32,
}

/// Point-in-time copy of [`LinkStats`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Frames/lines that passed validation.
    pub messages: u32,
    /// Frames/lines discarded for integrity failures (checksum, length bound).
    pub corrupt: u32,
    /// Valid frames/lines the classifier did not recognize.
    pub unrecognized: u32,
    /// Confirmations/responses stored for correlation.
    pub confirmations: u32,
    /// Confirmations dropped because the table was full.
    pub overflows: u32,
    /// Unsolicited events delivered to the sink.
    pub events: u32,
}

impl LinkStats {
    pub(crate) fn record_message(&self) {
        self.messages.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_corrupt(&self) {
        self.corrupt.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_unrecognized(&self) {
        self.unrecognized.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_confirmation(&self) {
        self.confirmations.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_overflow(&self) {
        self.overflows.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_event(&self) {
        self.events.fetch_add(1, Ordering::Relaxed);
    }

    /// Number of corrupt frames discarded so far.
    pub fn corrupt(&self) -> u32 {
        self.corrupt.load(Ordering::Relaxed)
    }

    /// Copy all counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            messages: self.messages.load(Ordering::Relaxed),
            corrupt: self.corrupt.load(Ordering::Relaxed),
            unrecognized: self.unrecognized.load(Ordering::Relaxed),
            confirmations: self.confirmations.load(Ordering::Relaxed),
            overflows: self.overflows.load(Ordering::Relaxed),
            events: self.events.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reflects_records() {
        let stats = LinkStats::default();
        stats.record_message();
        stats.record_message();
        stats.record_corrupt();
        stats.record_event();
        let snap = stats.snapshot();
        assert_eq!(snap.messages, 2);
        assert_eq!(snap.corrupt, 1);
        assert_eq!(snap.events, 1);
        assert_eq!(snap.overflows, 0);
        assert_eq!(stats.corrupt(), 1);
    }
}
