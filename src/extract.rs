//! Description section extraction.
//!
//! An index document is scanned line by line. Once a line starting with the
//! section title is seen, following lines are captured until a separator line
//! ends the section:
//!
//! ```text
//! Seeking ──title──▶ Capturing ──separator──▶ Done
//!    │                   │
//!    └──end of input──▶ NotFound   └──end of input──▶ Done
//! ```
//!
//! A separator directly after the title is kept as content (a setext heading
//! underline, usually). A separator only ends the section once at least one
//! line has been captured, and is itself never part of the text.
//!
//! Lines are read as bytes and decoded lossily, so stray bytes that are not
//! UTF-8 only ever affect the line they sit on.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use crate::error::SiseError;

/// Title line that opens the section of interest.
pub const SECTION_TITLE: &str = "Description";

/// Character a separator line is made of.
pub const RULE_CHAR: char = '-';

/// Shortest run of [`RULE_CHAR`] that counts as a separator.
pub const MIN_RULE_LEN: usize = 3;

/// Result of scanning one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extraction {
    /// The section was found; its text is in the caller's buffer.
    Found,
    /// No title line before end of input, or the document was unreadable.
    NotFound,
}

/// `true` if `line` is entirely [`RULE_CHAR`], at least [`MIN_RULE_LEN`] long.
///
/// The trailing line terminator is not part of the line.
pub fn is_separator(line: &str) -> bool {
    let line = line.trim_end_matches(['\n', '\r']);
    line.chars().count() >= MIN_RULE_LEN && line.chars().all(|c| c == RULE_CHAR)
}

enum State {
    Seeking,
    Capturing { lines: usize },
}

/// Line-oriented extractor for one section title.
///
/// Holds only configuration; all per-document state lives on the stack of
/// [`extract_from`](DescriptionExtractor::extract_from), so one extractor can
/// be shared by every worker.
#[derive(Debug, Clone)]
pub struct DescriptionExtractor {
    title: String,
}

impl Default for DescriptionExtractor {
    fn default() -> Self {
        Self::new(SECTION_TITLE)
    }
}

impl DescriptionExtractor {
    pub fn new(title: impl Into<String>) -> Self {
        Self { title: title.into() }
    }

    /// Extract the section from the document at `path` into `out`.
    ///
    /// An unopenable or unreadable document yields [`Extraction::NotFound`]
    /// together with the recoverable error so the caller can log it.
    pub fn extract(
        &self,
        path: &Path,
        line: &mut Vec<u8>,
        out: &mut String,
    ) -> (Extraction, Option<SiseError>) {
        let file = match File::open(path) {
            Ok(f) => f,
            Err(source) => {
                let err = SiseError::EntryIo { path: path.to_path_buf(), source };
                return (Extraction::NotFound, Some(err));
            }
        };
        match self.extract_from(BufReader::new(file), line, out) {
            Ok(found) => (found, None),
            Err(source) => {
                out.clear();
                let err = SiseError::EntryIo { path: path.to_path_buf(), source };
                (Extraction::NotFound, Some(err))
            }
        }
    }

    /// Run the state machine over `reader`.
    ///
    /// `line` is scratch space for reading; `out` receives the section text
    /// with original line endings. Both are cleared first.
    pub fn extract_from<R: BufRead>(
        &self,
        mut reader: R,
        line: &mut Vec<u8>,
        out: &mut String,
    ) -> io::Result<Extraction> {
        line.clear();
        out.clear();
        let mut state = State::Seeking;

        loop {
            line.clear();
            if reader.read_until(b'\n', line)? == 0 {
                break;
            }

            match state {
                State::Seeking => {
                    if line.starts_with(self.title.as_bytes()) {
                        state = State::Capturing { lines: 0 };
                    }
                }
                State::Capturing { ref mut lines } => {
                    let text = String::from_utf8_lossy(line);
                    if *lines > 0 && is_separator(&text) {
                        return Ok(Extraction::Found);
                    }
                    *lines += 1;
                    out.push_str(&text);
                }
            }
        }

        match state {
            State::Seeking => Ok(Extraction::NotFound),
            State::Capturing { .. } => Ok(Extraction::Found),
        }
    }

    /// Convenience wrapper returning an owned description.
    pub fn description(&self, path: &Path) -> Option<String> {
        let mut line = Vec::new();
        let mut out = String::new();
        match self.extract(path, &mut line, &mut out).0 {
            Extraction::Found    => Some(out),
            Extraction::NotFound => None,
        }
    }
}
