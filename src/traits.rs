use crate::entry::Entry;
use crate::error::SiseError;

/// An ordered source of entries to search through.
///
/// The engine calls [`entries`](Source::entries) once to size the work, then
/// every worker calls it again and keeps only its own slice. Implementations
/// must therefore yield the same entries in the same order on every call for
/// as long as the corpus is unchanged, with `ordinal` counting from zero.
///
/// # Thread Safety
///
/// `Send + Sync` are required. Workers replay the source concurrently.
///
/// # Example
///
/// ```rust
/// use sise::{Entry, SiseError, Source};
///
/// struct Fixed(Vec<&'static str>);
///
/// impl Source for Fixed {
///     fn entries(&self) -> Result<Box<dyn Iterator<Item = Entry> + '_>, SiseError> {
///         Ok(Box::new(self.0.iter().enumerate().map(|(ordinal, name)| Entry {
///             ordinal,
///             name:     name.to_string(),
///             document: format!("/corpus/{name}/index.md").into(),
///         })))
///     }
/// }
/// ```
pub trait Source: Send + Sync {
    /// Enumerate the corpus in ordinal order.
    ///
    /// Return `Err` only when the corpus as a whole cannot be read. Children
    /// that cannot be inspected are skipped, not reported.
    fn entries(&self) -> Result<Box<dyn Iterator<Item = Entry> + '_>, SiseError>;
}

/// Decides whether an extracted description matches.
///
/// # Thread Safety
///
/// `Send + Sync` are required. One matcher is shared by every worker.
///
/// # Example
///
/// ```rust
/// use sise::Matcher;
///
/// struct StartsWith(String);
///
/// impl Matcher for StartsWith {
///     fn is_match(&self, text: &str) -> bool {
///         text.starts_with(&self.0)
///     }
/// }
/// ```
pub trait Matcher: Send + Sync {
    /// Returns `true` if this description should be reported.
    fn is_match(&self, text: &str) -> bool;
}
