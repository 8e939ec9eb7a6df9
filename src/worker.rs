use tracing::{debug, trace, warn};

use crate::entry::AggregationRecord;
use crate::error::SiseError;
use crate::extract::{DescriptionExtractor, Extraction};
use crate::partition::Partition;
use crate::scratch::ScratchHandle;
use crate::sink::Sink;
use crate::traits::{Matcher, Source};

/// Read-only collaborators every worker shares.
pub struct WorkerContext<'a> {
    pub source:    &'a dyn Source,
    pub extractor: &'a DescriptionExtractor,
    pub matcher:   &'a dyn Matcher,
}

/// One worker's assignment. Owned by the worker until it finishes.
#[derive(Debug)]
pub struct WorkerTask {
    pub id:        usize,
    pub partition: Partition,
    pub scratch:   ScratchHandle,
}

/// What a worker reports back to the driver.
#[derive(Debug)]
pub struct WorkerOutcome {
    pub id:        usize,
    pub partition: Partition,
    pub scanned:   usize,
    pub matched:   usize,
    pub skipped:   usize,
    pub result:    Result<(), SiseError>,
}

impl WorkerOutcome {
    fn new(id: usize, partition: Partition) -> Self {
        Self {
            id,
            partition,
            scanned: 0,
            matched: 0,
            skipped: 0,
            result:  Ok(()),
        }
    }

    /// A worker released before it touched any entry.
    pub fn aborted(task: WorkerTask) -> Self {
        let mut outcome = Self::new(task.id, task.partition);
        outcome.result = Err(SiseError::Resource(format!("worker {} was not started", task.id)));
        outcome
    }

    /// A worker whose thread panicked.
    pub fn panicked(id: usize, partition: Partition) -> Self {
        let mut outcome = Self::new(id, partition);
        outcome.result = Err(SiseError::Internal(format!("worker {id} panicked")));
        outcome
    }
}

/// Search every entry in `task.partition`, in ordinal order.
///
/// Entries without a readable description are skipped. A failure to replay
/// the source or to write to the sink ends this worker only. The task's
/// scratch is dropped on return, on every path.
pub fn run(task: WorkerTask, ctx: &WorkerContext<'_>, sink: &mut Sink<'_>) -> WorkerOutcome {
    let WorkerTask { id, partition, mut scratch } = task;
    let mut outcome = WorkerOutcome::new(id, partition);
    debug!(worker = id, start = partition.start, end = partition.end, "worker started");

    let entries = match ctx.source.entries() {
        Ok(entries) => entries,
        Err(e) => {
            warn!(worker = id, error = %e, "worker could not enumerate corpus");
            outcome.result = Err(e);
            return outcome;
        }
    };

    for entry in entries.skip(partition.start).take(partition.len()) {
        if !partition.contains(entry.ordinal) {
            outcome.result = Err(SiseError::Internal(format!(
                "worker {id} got ordinal {} outside [{}, {})",
                entry.ordinal, partition.start, partition.end
            )));
            return outcome;
        }
        outcome.scanned += 1;
        scratch.reset();

        let ScratchHandle { line, description, .. } = &mut scratch;
        let (found, err) = ctx.extractor.extract(&entry.document, line, description);
        if let Some(err) = err {
            trace!(worker = id, error = %err, "index document unreadable");
        }
        if found == Extraction::NotFound {
            outcome.skipped += 1;
            continue;
        }

        if !ctx.matcher.is_match(description) {
            continue;
        }

        let record = AggregationRecord { name: &entry.name, description };
        if let Err(e) = sink.write(&record) {
            warn!(worker = id, error = %e, "worker could not write results");
            outcome.result = Err(e);
            return outcome;
        }
        outcome.matched += 1;
        trace!(worker = id, entry = %entry.name, "matched");
    }

    scratch.reset();
    debug!(
        worker = id,
        scanned = outcome.scanned,
        matched = outcome.matched,
        "worker finished"
    );
    outcome
}
