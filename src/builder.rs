use std::io::Write;
use std::path::PathBuf;

use crate::engine::{run, EngineOptions};
use crate::error::SiseError;
use crate::extract::DescriptionExtractor;
use crate::matcher::MatchStrategy;
use crate::partition::PlanConfig;
use crate::query::SearchQuery;
use crate::results::Report;
use crate::source::DirectorySource;
use crate::traits::{Matcher, Source};

// ---------------------------------------------------------------------------
// SearchBuilder
// ---------------------------------------------------------------------------

/// Entry point for configuring and executing a search.
///
/// Created via [`sise::search()`](crate::search). Configure with chained
/// builder methods, then call [`run()`](SearchBuilder::run) with the stream
/// matched blocks should go to.
///
/// # Example
///
/// ```rust,ignore
/// let report = sise::search()
///     .query("useless gaps")
///     .root("/srv/sites/dwm.suckless.org/patches")
///     .ignore_case(true)
///     .run(&mut std::io::stdout())?;
/// ```
pub struct SearchBuilder {
    query:       Option<String>,
    source:      Option<Box<dyn Source>>,
    matcher:     Option<Box<dyn Matcher>>,
    strategy:    MatchStrategy,
    ignore_case: bool,
    sequential:  bool,
    config:      PlanConfig,
    extractor:   DescriptionExtractor,
}

impl Default for SearchBuilder {
    fn default() -> Self {
        Self {
            query:       None,
            source:      None,
            matcher:     None,
            strategy:    MatchStrategy::default(),
            ignore_case: false,
            sequential:  false,
            config:      PlanConfig::default(),
            extractor:   DescriptionExtractor::default(),
        }
    }
}

impl SearchBuilder {
    // ── Query ─────────────────────────────────────────────────────────────

    /// The text to search for. Required and must contain a non-blank token.
    pub fn query(mut self, text: impl Into<String>) -> Self {
        self.query = Some(text.into());
        self
    }

    // ── Source ────────────────────────────────────────────────────────────

    /// Search the entry directories under `root`.
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.source = Some(Box::new(DirectorySource::new(root)));
        self
    }

    /// Set any [`Source`] to enumerate entries from.
    pub fn source(mut self, s: impl Source + 'static) -> Self {
        self.source = Some(Box::new(s));
        self
    }

    // ── Matching ──────────────────────────────────────────────────────────

    /// Choose how the query is compared against descriptions.
    pub fn strategy(mut self, strategy: MatchStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Compare case-insensitively. Off by default.
    pub fn ignore_case(mut self, yes: bool) -> Self {
        self.ignore_case = yes;
        self
    }

    /// Set a custom matcher, replacing the strategy.
    ///
    /// The query is still required and still validated.
    pub fn with_matcher(mut self, m: impl Matcher + 'static) -> Self {
        self.matcher = Some(Box::new(m));
        self
    }

    /// Title line of the section to extract. Defaults to `Description`.
    pub fn section_title(mut self, title: impl Into<String>) -> Self {
        self.extractor = DescriptionExtractor::new(title);
        self
    }

    // ── Partitioning ──────────────────────────────────────────────────────

    /// Always use a single worker, whatever the corpus size.
    pub fn sequential(mut self, yes: bool) -> Self {
        self.sequential = yes;
        self
    }

    /// Upper bound on parallel workers.
    pub fn max_workers(mut self, n: usize) -> Self {
        self.config.max_workers = n;
        self
    }

    /// Entries a worker is expected to handle efficiently.
    pub fn per_worker(mut self, n: usize) -> Self {
        self.config.per_worker = n;
        self
    }

    /// Corpora below this many entries are searched sequentially.
    pub fn parallel_threshold(mut self, n: usize) -> Self {
        self.config.parallel_threshold = n;
        self
    }

    /// Replace all partitioning knobs at once.
    pub fn plan_config(mut self, config: PlanConfig) -> Self {
        self.config = config;
        self
    }

    // ── Execute ───────────────────────────────────────────────────────────

    /// Execute the search, writing matched blocks to `out`.
    ///
    /// The query is validated before the source is touched.
    ///
    /// # Errors
    ///
    /// Returns `Err` for argument errors (missing query, missing source,
    /// invalid partitioning knobs) and for setup failures. Worker-level
    /// failures are reported in [`Report::failures`] instead.
    pub fn run(self, out: &mut dyn Write) -> Result<Report, SiseError> {
        let query = SearchQuery::parse(self.query.unwrap_or_default())?;
        self.config.validate()?;

        let source = self
            .source
            .ok_or_else(|| SiseError::Argument("no corpus provided".into()))?;

        let matcher = match self.matcher {
            Some(m) => m,
            None    => self.strategy.matcher(&query, self.ignore_case),
        };

        let opts = EngineOptions {
            config:     self.config,
            sequential: self.sequential,
            source,
            matcher,
            extractor:  self.extractor,
        };

        run(opts, out)
    }
}
