//! Event dispatch sinks.
//!
//! Unsolicited frames (binary indications, AT `+EVENT:` lines) are handed to
//! the session's [`EventSink`] synchronously from the receive path. A sink
//! must not issue requests or block: it may only copy the event somewhere
//! (a channel, a flag, a counter) for later processing.

use tokio::sync::{broadcast, mpsc};

/// Receiver of unsolicited events decoded by the engine.
pub trait EventSink<E>: Send + Sync + 'static {
    /// Deliver one event. Called once per classified unsolicited message.
    fn deliver(&self, event: E);
}

/// Sink that drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl<E> EventSink<E> for NullSink {
    fn deliver(&self, _event: E) {}
}

/// Fan events out to any number of subscribers.
///
/// Slow subscribers may lag and miss events; the receive path never waits
/// on them.
impl<E: Clone + Send + 'static> EventSink<E> for broadcast::Sender<E> {
    fn deliver(&self, event: E) {
        // No subscribers is not an error for the receive path.
        let _ = self.send(event);
    }
}

/// Queue events for a single consumer task.
impl<E: Send + 'static> EventSink<E> for mpsc::UnboundedSender<E> {
    fn deliver(&self, event: E) {
        if self.send(event).is_err() {
            tracing::trace!("event receiver dropped, discarding event");
        }
    }
}

/// Adapter turning a closure into an [`EventSink`].
///
/// ```
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
/// use wirelink_core::events::{CallbackSink, EventSink};
///
/// let count = Arc::new(AtomicUsize::new(0));
/// let seen = Arc::clone(&count);
/// let sink = CallbackSink::new(move |_event: u8| {
///     seen.fetch_add(1, Ordering::Relaxed);
/// });
/// sink.deliver(7);
/// assert_eq!(count.load(Ordering::Relaxed), 1);
/// ```
pub struct CallbackSink<F> {
    callback: F,
}

impl<F> CallbackSink<F> {
    /// Wrap `callback` so it can be registered as a session's event sink.
    pub fn new(callback: F) -> Self {
        CallbackSink { callback }
    }
}

impl<E, F> EventSink<E> for CallbackSink<F>
where
    F: Fn(E) + Send + Sync + 'static,
{
    fn deliver(&self, event: E) {
        (self.callback)(event);
    }
}

/// Lets builders store a sink chosen at runtime.
impl<E: 'static> EventSink<E> for Box<dyn EventSink<E>> {
    fn deliver(&self, event: E) {
        (**self).deliver(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_sink_accepts_anything() {
        let sink = NullSink;
        EventSink::<u32>::deliver(&sink, 1);
        EventSink::<String>::deliver(&sink, "x".into());
    }

    #[test]
    fn broadcast_sink_without_subscribers_does_not_fail() {
        let (tx, rx) = broadcast::channel::<u8>(4);
        drop(rx);
        tx.deliver(1);
    }

    #[test]
    fn broadcast_sink_delivers() {
        let (tx, mut rx) = broadcast::channel::<u8>(4);
        tx.deliver(42);
        assert_eq!(rx.try_recv().unwrap(), 42);
    }

    #[test]
    fn unbounded_sink_delivers_in_order() {
        let (tx, mut rx) = mpsc::unbounded_channel::<u8>();
        tx.deliver(1);
        tx.deliver(2);
        assert_eq!(rx.try_recv().unwrap(), 1);
        assert_eq!(rx.try_recv().unwrap(), 2);
    }

    #[test]
    fn callback_sink_invokes_closure() {
        use std::sync::Mutex;
        let seen = std::sync::Arc::new(Mutex::new(Vec::new()));
        let store = std::sync::Arc::clone(&seen);
        let sink = CallbackSink::new(move |v: u8| store.lock().unwrap().push(v));
        sink.deliver(3);
        sink.deliver(4);
        assert_eq!(*seen.lock().unwrap(), vec![3, 4]);
    }
}
