//! Document retrieval.
//!
//! Fetching is best effort: when a document cannot be fetched, the caller is
//! handed the link to open directly instead of an error. Only failing to save
//! bytes that were fetched is reported as an error.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::record::Document;

/// Something that can turn a document link into bytes.
pub trait DocumentSource {
    /// Fetch the bytes behind `link`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DocumentFetch`] if the link cannot be resolved or read.
    fn fetch(&self, link: &str) -> Result<Vec<u8>>;
}

/// Resolves links against the local filesystem.
///
/// `file://` links are read as absolute paths. Root-relative links such as
/// `/docs/deed.pdf` are resolved under the configured documents root. Remote
/// links are not fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalDocumentSource {
    root: Option<PathBuf>,
}

impl LocalDocumentSource {
    /// Create a source that resolves root-relative links under `root`.
    #[must_use]
    pub fn new(root: Option<PathBuf>) -> Self {
        Self { root }
    }

    /// Local path a link resolves to, if any.
    #[must_use]
    pub fn resolve(&self, link: &str) -> Option<PathBuf> {
        if let Some(path) = link.strip_prefix("file://") {
            return Some(PathBuf::from(path));
        }
        if link.contains("://") {
            return None;
        }
        let relative = link.trim_start_matches('/');
        match &self.root {
            Some(root) => Some(root.join(relative)),
            None => Some(PathBuf::from(link)),
        }
    }
}

impl DocumentSource for LocalDocumentSource {
    fn fetch(&self, link: &str) -> Result<Vec<u8>> {
        let path = self
            .resolve(link)
            .ok_or_else(|| Error::document_fetch(link, "remote links are opened directly"))?;
        debug!(link, path = %path.display(), "Reading document");
        std::fs::read(&path).map_err(|e| Error::document_fetch(link, e.to_string()))
    }
}

/// Result of retrieving a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The document was saved locally.
    Saved {
        /// Where it was written.
        path: PathBuf,
        /// Number of bytes written.
        bytes: u64,
    },
    /// The document could not be fetched; open the link instead.
    OpenDirect {
        /// The link to open.
        link: String,
    },
}

/// Turn free text into a single path component.
///
/// Path separators and control characters count as whitespace, whitespace
/// runs become `_`, and leading dots are dropped, so the result never names a
/// parent directory or a hidden file. Falls back to `fallback` when nothing
/// is left.
#[must_use]
pub fn safe_file_stem(raw: &str, fallback: &str) -> String {
    let spaced: String = raw
        .chars()
        .map(|c| {
            if c == '/' || c == '\\' || c.is_control() {
                ' '
            } else {
                c
            }
        })
        .collect();
    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
    let stem = joined.trim_start_matches('.');
    if stem.is_empty() {
        fallback.to_string()
    } else {
        stem.to_string()
    }
}

/// Local file name for a document: its name made safe by
/// [`safe_file_stem`], plus the extension of its link (`file` when the link
/// has none or it is not alphanumeric).
#[must_use]
pub fn download_filename(doc: &Document) -> String {
    let stem = safe_file_stem(&doc.name, "document");
    let last_segment = doc
        .link
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or_default();
    let ext = last_segment
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty() && ext.chars().all(char::is_alphanumeric))
        .unwrap_or("file");
    format!("{stem}.{ext}")
}

/// Fetch `doc` from `source` and save it into `dest_dir`.
///
/// # Errors
///
/// Returns an error only if fetched bytes cannot be written; fetch failures
/// become [`FetchOutcome::OpenDirect`].
pub fn retrieve(
    source: &dyn DocumentSource,
    doc: &Document,
    dest_dir: &Path,
) -> Result<FetchOutcome> {
    let bytes = match source.fetch(&doc.link) {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!(
                document = %doc.name,
                error = %err,
                "Document fetch failed, falling back to direct link"
            );
            return Ok(FetchOutcome::OpenDirect {
                link: doc.link.clone(),
            });
        }
    };

    if !dest_dir.exists() {
        std::fs::create_dir_all(dest_dir).map_err(|source| Error::DirectoryCreate {
            path: dest_dir.to_path_buf(),
            source,
        })?;
    }

    let path = dest_dir.join(download_filename(doc));
    std::fs::write(&path, &bytes)?;
    Ok(FetchOutcome::Saved {
        path,
        bytes: bytes.len() as u64,
    })
}
