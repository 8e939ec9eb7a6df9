use std::io::{self, Write};
use std::sync::Mutex;

use crate::entry::AggregationRecord;
use crate::error::SiseError;

/// Pseudo path used when the final output stream fails.
pub const OUTPUT_PATH: &str = "<output>";

/// Write one block: a blank line, `name:`, then the description verbatim.
pub fn write_block<W: Write + ?Sized>(out: &mut W, record: &AggregationRecord<'_>) -> io::Result<()> {
    write!(out, "\n{}:\n", record.name)?;
    out.write_all(record.description.as_bytes())
}

// ---------------------------------------------------------------------------
// SharedSink
// ---------------------------------------------------------------------------

/// In-memory target shared by parallel workers.
///
/// Each block is written under a single lock acquisition, so blocks never
/// interleave. Block order across workers is whatever order they got the lock.
#[derive(Debug, Default)]
pub struct SharedSink {
    buf: Mutex<Vec<u8>>,
}

impl SharedSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write(&self, record: &AggregationRecord<'_>) -> Result<(), SiseError> {
        let mut guard = self
            .buf
            .lock()
            .map_err(|_| SiseError::Internal("aggregation lock poisoned".into()))?;
        write_block(&mut *guard, record).map_err(|e| SiseError::io(OUTPUT_PATH, e))
    }

    /// Take everything written so far. Called once, after all workers joined.
    pub fn drain(self) -> Result<Vec<u8>, SiseError> {
        self.buf
            .into_inner()
            .map_err(|_| SiseError::Internal("aggregation lock poisoned".into()))
    }
}

// ---------------------------------------------------------------------------
// Sink
// ---------------------------------------------------------------------------

/// A worker's view of the aggregation target.
///
/// A lone worker owns the final output and writes to it directly; there is
/// nobody to contend with. Parallel workers each hold a reference to the
/// same [`SharedSink`].
pub enum Sink<'a> {
    Direct(&'a mut dyn Write),
    Shared(&'a SharedSink),
}

impl Sink<'_> {
    pub fn write(&mut self, record: &AggregationRecord<'_>) -> Result<(), SiseError> {
        match self {
            Self::Direct(out) => {
                write_block(&mut **out, record).map_err(|e| SiseError::io(OUTPUT_PATH, e))
            }
            Self::Shared(shared) => shared.write(record),
        }
    }
}
