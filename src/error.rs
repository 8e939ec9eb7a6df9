use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SiseError {
    // Invocation
    #[error("{0}")]
    Argument(String),

    // Setup
    #[error("{0}")]
    Resource(String),

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Per entry, never escalated
    #[error("{}: {source}", .path.display())]
    EntryIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Internal(String),
}

impl SiseError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    /// The path this error occurred at, if applicable.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::Io { path, .. } | Self::EntryIo { path, .. } => Some(path),
            _ => None,
        }
    }

    /// Whether the search keeps going after this error.
    ///
    /// Only a single entry's unreadable index document is recoverable; the
    /// entry is treated as having no description. Everything else fails
    /// either one worker or the whole run.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::EntryIo { .. })
    }

    /// Prefix for the one-line diagnostic shown to the user.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Argument(_) | Self::EntryIo { .. } => "error: ",
            Self::Resource(_) | Self::Io { .. } => "fatal error: ",
            Self::Internal(_) => "bug: ",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_follow_error_kind() {
        let arg = SiseError::Argument("search text required".into());
        assert_eq!(arg.category(), "error: ");
        assert_eq!(format!("{}{}", arg.category(), arg), "error: search text required");

        let io = SiseError::io("/nope", std::io::Error::from(std::io::ErrorKind::NotFound));
        assert_eq!(io.category(), "fatal error: ");
        assert_eq!(io.path(), Some(&PathBuf::from("/nope")));
        assert!(!io.is_recoverable());

        assert_eq!(SiseError::Internal("x".into()).category(), "bug: ");
    }

    #[test]
    fn only_entry_errors_are_recoverable() {
        let entry = SiseError::EntryIo {
            path: "a/index.md".into(),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert!(entry.is_recoverable());
        assert!(!SiseError::Resource("spawn".into()).is_recoverable());
    }
}
