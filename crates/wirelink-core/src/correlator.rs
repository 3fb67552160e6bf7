//! Bounded table of confirmations awaiting a matching request.
//!
//! The receive path inserts `{key, status}` entries into the first free slot;
//! a waiting caller removes the entry whose key it is waiting for. There is
//! no ordering across keys: a waiter for key A finds its entry regardless of
//! how many entries for other keys arrived first.
//!
//! When every slot is occupied the new confirmation is dropped. Unlike a
//! silent drop, the key is remembered so that a caller waiting for it fails
//! with [`Error::CorrelatorOverflow`] instead of running into its timeout.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::futures::Notified;
use tokio::sync::Notify;

use crate::error::{Error, Result};

/// Default number of confirmation slots.
pub const DEFAULT_SLOTS: usize = 2;

/// Outcome of looking up a key in the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Taken<S> {
    /// A confirmation for the key was stored; its slot is now free.
    Confirmed(S),
    /// A confirmation for the key arrived while the table was full.
    Overflowed,
}

#[derive(Debug)]
struct Table<K, S> {
    slots: Vec<Option<(K, S)>>,
    overflowed: Vec<K>,
}

#[derive(Debug)]
struct Inner<K, S> {
    table: Mutex<Table<K, S>>,
    arrived: Notify,
}

/// Shared handle to a confirmation table. Clones refer to the same table.
#[derive(Debug)]
pub struct Correlator<K, S> {
    inner: Arc<Inner<K, S>>,
}

impl<K, S> Clone for Correlator<K, S> {
    fn clone(&self) -> Self {
        Correlator {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K: Clone + Eq, S> Correlator<K, S> {
    /// Create a table with `capacity` slots (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        Correlator {
            inner: Arc::new(Inner {
                table: Mutex::new(Table {
                    slots,
                    overflowed: Vec::with_capacity(capacity),
                }),
                arrived: Notify::new(),
            }),
        }
    }

    fn table(&self) -> MutexGuard<'_, Table<K, S>> {
        self.inner
            .table
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        self.table().slots.len()
    }

    /// Number of occupied slots.
    pub fn pending(&self) -> usize {
        self.table().slots.iter().filter(|s| s.is_some()).count()
    }

    /// Store a confirmation in the first free slot and wake waiters.
    ///
    /// Returns [`Error::CorrelatorOverflow`] when every slot is occupied; the
    /// existing entries are left untouched.
    pub fn insert(&self, key: K, status: S) -> Result<()> {
        let result = {
            let mut table = self.table();
            match table.slots.iter_mut().find(|slot| slot.is_none()) {
                Some(slot) => {
                    *slot = Some((key, status));
                    Ok(())
                }
                None => {
                    let bound = table.slots.len();
                    if table.overflowed.len() >= bound {
                        table.overflowed.remove(0);
                    }
                    table.overflowed.push(key);
                    Err(Error::CorrelatorOverflow)
                }
            }
        };
        self.inner.arrived.notify_waiters();
        result
    }

    /// Remove and return the entry stored for `key`, if any.
    pub fn take(&self, key: &K) -> Option<Taken<S>> {
        let mut table = self.table();
        if let Some(slot) = table
            .slots
            .iter_mut()
            .find(|slot| matches!(slot, Some((k, _)) if k == key))
        {
            return slot.take().map(|(_, status)| Taken::Confirmed(status));
        }
        if let Some(pos) = table.overflowed.iter().position(|k| k == key) {
            table.overflowed.remove(pos);
            return Some(Taken::Overflowed);
        }
        None
    }

    /// Free every slot and forget recorded overflows.
    pub fn reset(&self) {
        let mut table = self.table();
        table.slots.iter_mut().for_each(|slot| *slot = None);
        table.overflowed.clear();
    }

    /// Future that completes on the next [`insert`](Self::insert).
    ///
    /// The future observes inserts made after it was created, even before it
    /// is first polled, so create it before checking the table.
    pub fn arrived(&self) -> Notified<'_> {
        self.inner.arrived.notified()
    }
}
