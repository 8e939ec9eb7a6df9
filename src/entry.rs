use std::path::PathBuf;

/// One searchable unit produced by a [`Source`](crate::traits::Source).
///
/// For the filesystem source this is a corpus subdirectory; `document` points
/// at the index document inside it. Entries are plain values so workers can
/// own their slice outright.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Position in enumeration order. Stable for one corpus snapshot.
    pub ordinal: usize,

    /// The entry's identifier, printed as the block header on a match.
    pub name: String,

    /// Path to the document holding the description section.
    pub document: PathBuf,
}

/// One matched block as it is written to the aggregation sink.
#[derive(Debug, Clone, Copy)]
pub struct AggregationRecord<'a> {
    pub name:        &'a str,
    pub description: &'a str,
}
