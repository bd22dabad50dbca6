//! Error taxonomy for the analysis pipeline.
//!
//! `Usage` and `Path` surface to the entry point and terminate the run.
//! `Io` is recovered per file (log, skip, continue). `Internal` marks a
//! broken structural invariant such as an unmatched `}`; the parser resets
//! to the global scope and the rest of the corpus still gets analyzed.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalyzeError {
    /// Bad or missing command-line arguments.
    #[error("{0}")]
    Usage(String),

    /// The root directory does not exist or is not a directory.
    #[error("path {0:?} does not exist")]
    Path(PathBuf),

    /// A source file could not be opened or read.
    #[error("cannot open {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A structural invariant was broken while parsing.
    #[error("internal: {0}")]
    Internal(String),
}

impl AnalyzeError {
    /// True for errors that terminate the whole run rather than one file.
    pub fn is_fatal(&self) -> bool {
        matches!(self, AnalyzeError::Usage(_) | AnalyzeError::Path(_))
    }
}
