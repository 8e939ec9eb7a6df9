//! # sise
//!
//! Parallel search over a corpus of suckless patch pages.
//!
//! A corpus is a directory with one subdirectory per entry. Each entry has an
//! `index.md` whose `Description` section is extracted and compared against
//! the query. Matching entries are written as blocks of the form
//!
//! ```text
//!
//! <entry name>:
//! <description text>
//! ```
//!
//! Large corpora are split into contiguous ranges searched by a small, fixed
//! set of worker threads that share one lock-guarded output buffer.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! let mut out = Vec::new();
//! let report = sise::search()
//!     .query("gaps")
//!     .root("/home/me/.cache/sise/sites/dwm.suckless.org/patches")
//!     .run(&mut out)?;
//!
//! println!("{} matches", report.matches);
//! # Ok::<(), sise::SiseError>(())
//! ```
//!
//! # Custom Sources and Matchers
//!
//! Implement [`Source`] to enumerate entries from somewhere other than a
//! directory, and [`Matcher`] for matching rules beyond the built-in
//! [`MatchStrategy`] choices.

#![forbid(unsafe_code)]

pub mod extract;
pub mod partition;
pub mod source;

mod builder;
mod engine;
mod entry;
mod error;
mod matcher;
mod query;
mod results;
mod scratch;
mod sink;
mod traits;
mod worker;

// ── Public re-exports ─────────────────────────────────────────────────────────

pub use builder::SearchBuilder;
pub use entry::{AggregationRecord, Entry};
pub use error::SiseError;
pub use extract::DescriptionExtractor;
pub use matcher::{MatchStrategy, PhraseMatcher, TermMatcher};
pub use partition::{Partition, Plan, PlanConfig};
pub use query::SearchQuery;
pub use results::{Report, ScanStats};
pub use source::{DirectorySource, Tool};
pub use traits::{Matcher, Source};

// ── Entry point ───────────────────────────────────────────────────────────────

/// Create a new [`SearchBuilder`] to configure and run a search.
pub fn search() -> SearchBuilder {
    SearchBuilder::default()
}
