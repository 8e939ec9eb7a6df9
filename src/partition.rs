//! Splitting the corpus into contiguous worker ranges.
//!
//! Sizing is deliberately approximate: worker count comes from how many
//! "optimal" loads fit in the corpus, rounding up only when the leftover is a
//! large enough share of one load, and the last range absorbs whatever the
//! earlier ones did not cover. Whatever the heuristic produces, the ranges
//! are checked to tile `[0, total)` exactly before any worker is started.

use std::ops::Range;

use tracing::debug;

use crate::error::SiseError;

/// Corpora smaller than this are searched by a single worker.
pub const DEFAULT_PARALLEL_THRESHOLD: usize =
    2 * DEFAULT_PER_WORKER - (DEFAULT_PER_WORKER - DEFAULT_PER_WORKER / 4);
pub const DEFAULT_MAX_WORKERS: usize = 4;
pub const DEFAULT_PER_WORKER: usize = 80;
/// Leftover share of one load, in percent, needed to add a worker.
pub const DEFAULT_MIN_FRACTION_PCT: usize = 40;

// ---------------------------------------------------------------------------
// PlanConfig
// ---------------------------------------------------------------------------

/// Tuning knobs for [`plan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanConfig {
    pub parallel_threshold: usize,
    pub max_workers:        usize,
    pub per_worker:         usize,
    pub min_fraction_pct:   usize,
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            max_workers:        DEFAULT_MAX_WORKERS,
            per_worker:         DEFAULT_PER_WORKER,
            min_fraction_pct:   DEFAULT_MIN_FRACTION_PCT,
        }
    }
}

impl PlanConfig {
    /// Reject settings that cannot produce a plan.
    pub fn validate(&self) -> Result<(), SiseError> {
        if self.max_workers == 0 {
            return Err(SiseError::Argument("worker count must be at least 1".into()));
        }
        if self.per_worker == 0 {
            return Err(SiseError::Argument("entries per worker must be at least 1".into()));
        }
        Ok(())
    }

    /// Number of workers for a corpus of `total` entries.
    pub fn worker_count(&self, total: usize) -> usize {
        if total < self.parallel_threshold {
            return 1;
        }
        let whole = total / self.per_worker;
        let leftover_pct = (total % self.per_worker) * 100 / self.per_worker;
        let count = if leftover_pct < self.min_fraction_pct { whole } else { whole + 1 };
        count.clamp(1, self.max_workers)
    }
}

// ---------------------------------------------------------------------------
// Partition / Plan
// ---------------------------------------------------------------------------

/// Half-open range of entry ordinals owned by one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partition {
    pub start: usize,
    pub end:   usize,
}

impl Partition {
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, ordinal: usize) -> bool {
        self.range().contains(&ordinal)
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Worker ranges for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub total:      usize,
    pub partitions: Vec<Partition>,
}

impl Plan {
    /// One worker over everything.
    pub fn sequential(total: usize) -> Self {
        Self {
            total,
            partitions: vec![Partition { start: 0, end: total }],
        }
    }

    pub fn workers(&self) -> usize {
        self.partitions.len()
    }

    pub fn is_parallel(&self) -> bool {
        self.workers() > 1
    }

    /// Check that the partitions tile `[0, total)` in order.
    ///
    /// # Errors
    ///
    /// [`SiseError::Internal`] naming the first offending partition.
    pub fn validate(&self) -> Result<(), SiseError> {
        if self.partitions.is_empty() {
            return Err(SiseError::Internal("plan has no partitions".into()));
        }
        let mut cursor = 0;
        for (idx, p) in self.partitions.iter().enumerate() {
            if p.start != cursor || p.end < p.start || p.end > self.total {
                return Err(SiseError::Internal(format!(
                    "partition {idx} [{}, {}) breaks tiling of [0, {})",
                    p.start, p.end, self.total
                )));
            }
            cursor = p.end;
        }
        if cursor != self.total {
            return Err(SiseError::Internal(format!(
                "partitions end at {cursor}, expected {}",
                self.total
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// plan()
// ---------------------------------------------------------------------------

/// Decide worker count and build validated partitions for `total` entries.
pub fn plan(total: usize, config: &PlanConfig) -> Result<Plan, SiseError> {
    config.validate()?;

    let workers = config.worker_count(total);
    if workers == 1 {
        let plan = Plan::sequential(total);
        plan.validate()?;
        return Ok(plan);
    }

    let first_size = if workers < config.max_workers {
        config.per_worker
    } else {
        total / config.max_workers
    };

    let mut partitions: Vec<Partition> = Vec::with_capacity(workers);
    for idx in 0..workers {
        let partition = match partitions.last() {
            None => Partition { start: 0, end: first_size },
            Some(prev) => {
                let start = prev.end;
                let end = if idx == workers - 1 { total } else { start + prev.len() };
                Partition { start, end }
            }
        };
        partitions.push(partition);
    }

    let plan = Plan { total, partitions };
    plan.validate()?;
    debug!(total, workers, first_size, "planned partitions");
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_tiles(plan: &Plan, total: usize) {
        let mut seen = vec![0u8; total];
        for p in &plan.partitions {
            for ordinal in p.range() {
                seen[ordinal] += 1;
            }
        }
        assert!(seen.iter().all(|&n| n == 1), "not a tiling for {total}: {plan:?}");
    }

    #[test]
    fn default_threshold_matches_tool() {
        assert_eq!(DEFAULT_PARALLEL_THRESHOLD, 100);
    }

    #[test]
    fn every_total_is_tiled_exactly() {
        let config = PlanConfig::default();
        for total in 0..2_000 {
            let plan = plan(total, &config).unwrap();
            assert_eq!(plan.total, total);
            assert!(plan.workers() >= 1 && plan.workers() <= config.max_workers);
            assert_tiles(&plan, total);
        }
    }

    #[test]
    fn small_corpus_is_sequential() {
        let plan = plan(99, &PlanConfig::default()).unwrap();
        assert!(!plan.is_parallel());
        assert_eq!(plan.partitions, [Partition { start: 0, end: 99 }]);
    }

    #[test]
    fn leftover_below_fraction_rounds_down() {
        let config = PlanConfig::default();
        // 100 / 80 = 1.25, leftover 25% < 40%
        assert_eq!(config.worker_count(100), 1);
        // 180 / 80 = 2.25
        assert_eq!(config.worker_count(180), 2);
        // 112 / 80 = 1.40, exactly at the fraction
        assert_eq!(config.worker_count(112), 2);
        // 120 / 80 = 1.5
        assert_eq!(config.worker_count(120), 2);
        // 240 / 80 = 3.0
        assert_eq!(config.worker_count(240), 3);
    }

    #[test]
    fn below_max_workers_uses_optimal_load() {
        let plan = plan(150, &PlanConfig::default()).unwrap();
        assert_eq!(
            plan.partitions,
            [Partition { start: 0, end: 80 }, Partition { start: 80, end: 150 }]
        );

        let plan = super::plan(250, &PlanConfig::default()).unwrap();
        assert_eq!(
            plan.partitions,
            [
                Partition { start: 0, end: 80 },
                Partition { start: 80, end: 160 },
                Partition { start: 160, end: 250 },
            ]
        );
    }

    #[test]
    fn four_hundred_entries_split_four_ways() {
        let plan = plan(400, &PlanConfig::default()).unwrap();
        assert_eq!(plan.workers(), 4);
        let bounds: Vec<(usize, usize)> = plan.partitions.iter().map(|p| (p.start, p.end)).collect();
        assert_eq!(bounds, [(0, 100), (100, 200), (200, 300), (300, 400)]);
    }

    #[test]
    fn last_partition_absorbs_remainder() {
        let plan = plan(1_003, &PlanConfig::default()).unwrap();
        assert_eq!(plan.workers(), 4);
        assert_eq!(plan.partitions[0].len(), 250);
        assert_eq!(plan.partitions[3], Partition { start: 750, end: 1_003 });
    }

    #[test]
    fn custom_config_still_tiles() {
        let config = PlanConfig {
            parallel_threshold: 0,
            max_workers:        7,
            per_worker:         3,
            min_fraction_pct:   0,
        };
        for total in 0..200 {
            assert_tiles(&plan(total, &config).unwrap(), total);
        }
    }

    #[test]
    fn zero_workers_is_rejected() {
        let config = PlanConfig { max_workers: 0, ..PlanConfig::default() };
        assert!(matches!(plan(10, &config), Err(SiseError::Argument(_))));
    }

    #[test]
    fn broken_tiling_is_internal_error() {
        let plan = Plan {
            total:      10,
            partitions: vec![Partition { start: 0, end: 4 }, Partition { start: 5, end: 10 }],
        };
        assert!(matches!(plan.validate(), Err(SiseError::Internal(_))));

        let short = Plan { total: 10, partitions: vec![Partition { start: 0, end: 9 }] };
        assert!(matches!(short.validate(), Err(SiseError::Internal(_))));
    }
}
