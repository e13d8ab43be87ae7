//! Error types for the graphload-batch crate.

use std::path::PathBuf;

use thiserror::Error;

use crate::summary::RunSummary;

/// Fatal errors that end a batch run.
///
/// A failing statement is not one of these; it is recorded in the
/// [`RunSummary`] and the run continues.
#[derive(Error, Debug)]
pub enum BatchError {
    #[error(transparent)]
    Config(#[from] graphload_core::ConfigError),

    #[error(transparent)]
    Graph(#[from] graphload_graph::GraphError),

    #[error("Statement source not found: {}", path.display())]
    SourceNotFound { path: PathBuf },

    #[error("Failed to read {} at line {line}: {source}", path.display())]
    SourceRead {
        path: PathBuf,
        line: usize,
        #[source]
        source: std::io::Error,
        /// Everything executed before the read failed.
        summary: Box<RunSummary>,
    },

    #[error("Failed to write run report to {}: {source}", path.display())]
    Report {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BatchError {
    /// The partial summary carried by a mid-run failure, if any.
    pub fn partial_summary(&self) -> Option<&RunSummary> {
        match self {
            Self::SourceRead { summary, .. } => Some(&**summary),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, BatchError>;
