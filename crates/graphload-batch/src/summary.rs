//! Run summaries and the JSON run report.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{BatchError, Result};
use crate::segment::Statement;

/// A statement the database rejected.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatementFailure {
    /// 1-based position of the statement in the source.
    pub index: usize,
    /// 1-based line the statement starts on.
    pub line: usize,
    pub statement: String,
    pub error: String,
}

/// Outcome of a batch run: counts plus every failure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub source: PathBuf,
    pub graph: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub failures: Vec<StatementFailure>,
}

impl RunSummary {
    pub fn new(source: &Path, graph: &str) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            source: source.to_path_buf(),
            graph: graph.to_string(),
            started_at: Utc::now(),
            finished_at: None,
            attempted: 0,
            succeeded: 0,
            failed: 0,
            failures: Vec::new(),
        }
    }

    pub fn record_success(&mut self) {
        self.attempted += 1;
        self.succeeded += 1;
    }

    pub fn record_failure(&mut self, statement: &Statement, error: String) {
        self.attempted += 1;
        self.failed += 1;
        self.failures.push(StatementFailure {
            index: self.attempted,
            line: statement.line(),
            statement: statement.text().to_string(),
            error,
        });
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// True when no statement failed.
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }

    /// Write the summary as pretty-printed JSON, creating parent directories.
    pub fn write_report(&self, path: &Path) -> Result<()> {
        let report_err = |source: std::io::Error| BatchError::Report {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(report_err)?;
        }
        let json = serde_json::to_vec_pretty(self).map_err(|e| report_err(e.into()))?;
        std::fs::write(path, json).map_err(report_err)?;

        tracing::info!(run_id = %self.run_id, path = %path.display(), "Run report written");
        Ok(())
    }
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} statement(s) attempted against graph '{}': {} succeeded, {} failed",
            self.attempted, self.graph, self.succeeded, self.failed
        )
    }
}
