use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tracing::trace;

use crate::error::SiseError;

/// Initial capacity of a worker's description buffer.
const DESCRIPTION_CAPACITY: usize = 4096;

/// Counts scratch handles handed out and given back during one run.
#[derive(Debug, Default, Clone)]
pub struct ScratchLedger {
    inner: Arc<Counts>,
}

#[derive(Debug, Default)]
struct Counts {
    acquired: AtomicUsize,
    released: AtomicUsize,
}

impl ScratchLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the buffers one worker reuses across all of its entries.
    ///
    /// # Errors
    ///
    /// [`SiseError::Resource`] if the buffers cannot be reserved.
    pub fn acquire(&self, worker: usize) -> Result<ScratchHandle, SiseError> {
        let mut line = Vec::new();
        let mut description = String::new();
        line.try_reserve(DESCRIPTION_CAPACITY)
            .and_then(|()| description.try_reserve(DESCRIPTION_CAPACITY))
            .map_err(|e| SiseError::Resource(format!("scratch for worker {worker}: {e}")))?;

        self.inner.acquired.fetch_add(1, Ordering::SeqCst);
        trace!(worker, "scratch acquired");
        Ok(ScratchHandle {
            worker,
            line,
            description,
            ledger: Arc::clone(&self.inner),
        })
    }

    pub fn acquired(&self) -> usize {
        self.inner.acquired.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.inner.released.load(Ordering::SeqCst)
    }

    /// Handles not yet dropped.
    pub fn outstanding(&self) -> usize {
        self.acquired() - self.released()
    }
}

/// A worker's private read and description buffers.
///
/// Released exactly once, when dropped, whichever way the worker exits.
#[derive(Debug)]
pub struct ScratchHandle {
    worker:          usize,
    pub line:        Vec<u8>,
    pub description: String,
    ledger:          Arc<Counts>,
}

impl ScratchHandle {
    /// Drop the current entry's text before moving on.
    pub fn reset(&mut self) {
        self.line.clear();
        self.description.clear();
    }
}

impl Drop for ScratchHandle {
    fn drop(&mut self) {
        self.ledger.released.fetch_add(1, Ordering::SeqCst);
        trace!(worker = self.worker, "scratch released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_happens_on_drop() {
        let ledger = ScratchLedger::new();
        let a = ledger.acquire(0).unwrap();
        let b = ledger.acquire(1).unwrap();
        assert_eq!(ledger.outstanding(), 2);
        drop(a);
        assert_eq!(ledger.outstanding(), 1);
        drop(b);
        assert_eq!((ledger.acquired(), ledger.released()), (2, 2));
    }

    #[test]
    fn released_when_owner_panics() {
        let ledger = ScratchLedger::new();
        let handle = ledger.acquire(3).unwrap();
        let res = std::thread::spawn(move || {
            let _held = handle;
            panic!("worker blew up");
        })
        .join();
        assert!(res.is_err());
        assert_eq!(ledger.outstanding(), 0);
    }

    #[test]
    fn reset_clears_entry_text() {
        let ledger = ScratchLedger::new();
        let mut handle = ledger.acquire(0).unwrap();
        handle.description.push_str("leftover");
        handle.reset();
        assert!(handle.description.is_empty());
    }
}
