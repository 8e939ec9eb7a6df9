use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use ignore::{DirEntry, WalkBuilder};
use tracing::{debug, trace};

use crate::entry::Entry;
use crate::error::SiseError;
use crate::traits::Source;

/// Children whose name starts with this are never entries.
pub const HIDDEN_MARKER: char = '.';

/// Index document location, relative to an entry directory.
pub const INDEX_DOCUMENT: &str = "index.md";

// ---------------------------------------------------------------------------
// DirectorySource
// ---------------------------------------------------------------------------

/// Enumerates the subdirectories of a corpus root as entries.
///
/// Children are sorted by file name so that the driver's count and every
/// worker's replay agree on ordinals. Plain files, hidden children and
/// anything that is not a directory are skipped.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root:     PathBuf,
    document: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root:     root.into(),
            document: PathBuf::from(INDEX_DOCUMENT),
        }
    }

    /// Use a different index document path inside each entry directory.
    pub fn with_document(mut self, relative: impl Into<PathBuf>) -> Self {
        self.document = relative.into();
        self
    }

    /// The default corpus for `tool` inside the user's cache directory.
    pub fn for_tool(tool: Tool) -> Result<Self, SiseError> {
        Ok(Self::new(default_root(tool)?))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn open_root(&self) -> Result<(), SiseError> {
        let meta = fs::metadata(&self.root).map_err(|e| SiseError::io(&self.root, e))?;
        if !meta.is_dir() {
            return Err(SiseError::io(&self.root, io::Error::other("not a directory")));
        }
        Ok(())
    }
}

impl Source for DirectorySource {
    fn entries(&self) -> Result<Box<dyn Iterator<Item = Entry> + '_>, SiseError> {
        self.open_root()?;

        let walker = WalkBuilder::new(&self.root)
            .standard_filters(false)
            .hidden(false)
            .parents(false)
            .follow_links(false)
            .max_depth(Some(1))
            .sort_by_file_name(|a, b| a.cmp(b))
            .build();

        let mut children = Vec::new();
        for res in walker {
            let entry = match res {
                Ok(e) => e,
                Err(e) => {
                    let err = map_ignore_error(e, &self.root);
                    if err.path() == Some(&self.root) {
                        return Err(err);
                    }
                    trace!(error = %err, "skipping unreadable child");
                    continue;
                }
            };
            if let Some(child) = entry_child(&entry) {
                children.push(child);
            }
        }

        debug!(root = %self.root.display(), count = children.len(), "enumerated corpus");

        let document = self.document.clone();
        Ok(Box::new(children.into_iter().enumerate().map(move |(ordinal, (name, dir))| Entry {
            ordinal,
            document: dir.join(&document),
            name,
        })))
    }
}

/// Display name and on-disk directory of an entry.
///
/// The name is lossy for display only; the directory keeps the raw file name.
fn entry_child(entry: &DirEntry) -> Option<(String, PathBuf)> {
    if entry.depth() == 0 {
        return None;
    }
    if !entry.file_type().is_some_and(|ft| ft.is_dir()) {
        return None;
    }
    let name = entry.file_name().to_string_lossy().into_owned();
    if name.starts_with(HIDDEN_MARKER) {
        return None;
    }
    Some((name, entry.path().to_path_buf()))
}

// ---------------------------------------------------------------------------
// Default corpus location
// ---------------------------------------------------------------------------

/// Suckless projects with a patch corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    #[default]
    Dwm,
    St,
    Surf,
}

impl Tool {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dwm  => "dwm",
            Self::St   => "st",
            Self::Surf => "surf",
        }
    }
}

/// `<cache dir>/sise/sites/<tool>.suckless.org/patches`
pub fn default_root(tool: Tool) -> Result<PathBuf, SiseError> {
    let dirs = BaseDirs::new()
        .ok_or_else(|| SiseError::Resource("unable to determine the user cache directory".into()))?;
    Ok(dirs
        .cache_dir()
        .join("sise")
        .join("sites")
        .join(format!("{}.suckless.org", tool.as_str()))
        .join("patches"))
}

// ---------------------------------------------------------------------------
// Map ignore::Error to SiseError
// ---------------------------------------------------------------------------

fn map_ignore_error(e: ignore::Error, root: &Path) -> SiseError {
    match e {
        ignore::Error::WithPath { path, err } => match *err {
            ignore::Error::Io(io_err) => SiseError::Io { path, source: io_err },
            other => SiseError::io(path, io::Error::other(other.to_string())),
        },
        ignore::Error::WithDepth { err, .. } => map_ignore_error(*err, root),
        ignore::Error::Loop { child, .. } => {
            SiseError::io(child, io::Error::other("symlink loop"))
        }
        ignore::Error::Io(io_err) => SiseError::io(root, io_err),
        other => SiseError::io(root, io::Error::other(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_files_and_hidden_children() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir(root.join("beta")).unwrap();
        fs::create_dir(root.join("alpha")).unwrap();
        fs::create_dir(root.join(".git")).unwrap();
        fs::write(root.join("README"), "not an entry").unwrap();

        let source = DirectorySource::new(root);
        let entries: Vec<Entry> = source.entries().unwrap().collect();

        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["alpha", "beta"]);
        assert_eq!(entries[0].ordinal, 0);
        assert_eq!(entries[1].ordinal, 1);
        assert_eq!(entries[1].document, root.join("beta").join(INDEX_DOCUMENT));
    }

    #[test]
    fn custom_document_path() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("gaps")).unwrap();

        let source = DirectorySource::new(dir.path()).with_document("docs/README.md");
        assert_eq!(source.root(), dir.path());

        let entries: Vec<Entry> = source.entries().unwrap().collect();
        assert_eq!(entries[0].document, dir.path().join("gaps").join("docs/README.md"));
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_directory_keeps_raw_path() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join(OsStr::from_bytes(b"caf\xe9"));
        fs::create_dir(&sub).unwrap();
        fs::write(sub.join(INDEX_DOCUMENT), "Description\nx\n").unwrap();

        let entries: Vec<Entry> = DirectorySource::new(dir.path()).entries().unwrap().collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "caf\u{fffd}");
        assert_eq!(entries[0].document, sub.join(INDEX_DOCUMENT));
        assert!(entries[0].document.is_file());
    }

    #[test]
    fn replay_yields_same_order() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["m", "c", "x", "a", "q"] {
            fs::create_dir(dir.path().join(name)).unwrap();
        }
        let source = DirectorySource::new(dir.path());
        let first: Vec<Entry> = source.entries().unwrap().collect();
        let second: Vec<Entry> = source.entries().unwrap().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn missing_root_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = DirectorySource::new(dir.path().join("absent"));
        let err = source.entries().err().unwrap();
        assert!(matches!(err, SiseError::Io { .. }));
    }

    #[test]
    fn file_root_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plain");
        fs::write(&file, "x").unwrap();
        let err = DirectorySource::new(&file).entries().err().unwrap();
        assert!(matches!(err, SiseError::Io { .. }));
    }

    #[test]
    fn default_root_names_tool_site() {
        if let Ok(root) = default_root(Tool::St) {
            assert!(root.ends_with("sise/sites/st.suckless.org/patches"));
        }
    }
}
