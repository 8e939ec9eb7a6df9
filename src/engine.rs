use std::io::Write;
use std::sync::mpsc;
use std::thread;
use std::time::Instant;

use tracing::{debug, warn};

use crate::error::SiseError;
use crate::extract::DescriptionExtractor;
use crate::partition::{self, Plan, PlanConfig};
use crate::results::{Report, ScanStats};
use crate::scratch::ScratchLedger;
use crate::sink::{SharedSink, Sink, OUTPUT_PATH};
use crate::traits::{Matcher, Source};
use crate::worker::{self, WorkerContext, WorkerOutcome, WorkerTask};

// ---------------------------------------------------------------------------
// Engine options
// ---------------------------------------------------------------------------

/// Internal options passed from the builder to `run()`.
pub(crate) struct EngineOptions {
    pub config:     PlanConfig,
    pub sequential: bool,
    pub source:     Box<dyn Source>,
    pub matcher:    Box<dyn Matcher>,
    pub extractor:  DescriptionExtractor,
}

// ---------------------------------------------------------------------------
// run()
// ---------------------------------------------------------------------------

/// Count entries, plan, run every worker, then stream results to `out`.
///
/// Setup failures (unreadable corpus root, invalid plan, scratch or thread
/// exhaustion) abort with `Err` before any entry is searched. Failures of
/// individual workers are collected into [`Report::failures`]; the other
/// workers still run to completion and their output is still written.
pub(crate) fn run(opts: EngineOptions, out: &mut dyn Write) -> Result<Report, SiseError> {
    let start = Instant::now();

    let total = opts.source.entries()?.count();
    let plan = if opts.sequential {
        let plan = Plan::sequential(total);
        plan.validate()?;
        plan
    } else {
        partition::plan(total, &opts.config)?
    };
    debug!(total, workers = plan.workers(), "search plan ready");

    let ledger = ScratchLedger::new();
    let outcomes = {
        let tasks = plan
            .partitions
            .iter()
            .enumerate()
            .map(|(id, &partition)| {
                Ok(WorkerTask { id, partition, scratch: ledger.acquire(id)? })
            })
            .collect::<Result<Vec<_>, SiseError>>()?;

        let ctx = WorkerContext {
            source:    opts.source.as_ref(),
            extractor: &opts.extractor,
            matcher:   opts.matcher.as_ref(),
        };

        if plan.is_parallel() {
            let shared = SharedSink::new();
            let outcomes = run_parallel(tasks, &ctx, &shared)?;
            out.write_all(&shared.drain()?)
                .map_err(|e| SiseError::io(OUTPUT_PATH, e))?;
            outcomes
        } else {
            let mut sink = Sink::Direct(&mut *out);
            tasks
                .into_iter()
                .map(|task| worker::run(task, &ctx, &mut sink))
                .collect()
        }
    };
    out.flush().map_err(|e| SiseError::io(OUTPUT_PATH, e))?;

    if ledger.outstanding() != 0 {
        return Err(SiseError::Internal(format!(
            "{} scratch handles outlived their workers",
            ledger.outstanding()
        )));
    }

    Ok(summarize(plan, outcomes, ScanStats {
        duration:         start.elapsed(),
        scratch_acquired: ledger.acquired(),
        scratch_released: ledger.released(),
    }))
}

// ---------------------------------------------------------------------------
// Parallel fork-join
// ---------------------------------------------------------------------------

/// Spawn one thread per task and join them all.
///
/// Each worker waits on its own start gate. Only once every thread exists are
/// the gates opened, so a spawn failure releases the already-spawned workers
/// without letting any of them search.
fn run_parallel(
    tasks: Vec<WorkerTask>,
    ctx: &WorkerContext<'_>,
    shared: &SharedSink,
) -> Result<Vec<WorkerOutcome>, SiseError> {
    thread::scope(|scope| {
        let mut handles = Vec::with_capacity(tasks.len());
        let mut gates = Vec::with_capacity(tasks.len());

        for task in tasks {
            let (id, partition) = (task.id, task.partition);
            let (open, gate) = mpsc::channel::<()>();

            let spawned = thread::Builder::new()
                .name(format!("sise-worker-{id}"))
                .spawn_scoped(scope, move || {
                    if gate.recv().is_err() {
                        return WorkerOutcome::aborted(task);
                    }
                    worker::run(task, ctx, &mut Sink::Shared(shared))
                });

            match spawned {
                Ok(handle) => {
                    handles.push((id, partition, handle));
                    gates.push(open);
                }
                Err(e) => {
                    drop(gates);
                    return Err(SiseError::Resource(format!("unable to start worker {id}: {e}")));
                }
            }
        }

        for open in &gates {
            // A closed gate means that worker is gone already; join reports it.
            let _ = open.send(());
        }

        Ok(handles
            .into_iter()
            .map(|(id, partition, handle)| {
                handle
                    .join()
                    .unwrap_or_else(|_| WorkerOutcome::panicked(id, partition))
            })
            .collect())
    })
}

// ---------------------------------------------------------------------------
// Combine outcomes
// ---------------------------------------------------------------------------

fn summarize(plan: Plan, outcomes: Vec<WorkerOutcome>, stats: ScanStats) -> Report {
    let mut report = Report {
        matches:  0,
        scanned:  0,
        skipped:  0,
        workers:  plan.workers(),
        plan,
        failures: Vec::new(),
        stats,
    };

    for outcome in outcomes {
        report.matches += outcome.matched;
        report.scanned += outcome.scanned;
        report.skipped += outcome.skipped;
        if let Err(e) = outcome.result {
            warn!(
                worker = outcome.id,
                start = outcome.partition.start,
                end = outcome.partition.end,
                error = %e,
                "worker failed"
            );
            report.failures.push(e);
        }
    }
    report
}
