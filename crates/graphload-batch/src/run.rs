//! End-to-end batch runs: validate, connect, segment, execute, summarize.
//!
//! ```text
//! Idle -> Connecting -> ConnectionFailed
//!                    \-> Connected -> Executing -> Finished
//! ```

use std::path::Path;

use graphload_core::ConnectionSettings;
use graphload_graph::{Connection, ConnectionManager, GraphDriver};

use crate::config::BatchConfig;
use crate::error::{BatchError, Result};
use crate::executor::BatchExecutor;
use crate::segment;
use crate::summary::RunSummary;

/// Lifecycle of a single batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    Connecting,
    ConnectionFailed,
    Connected,
    Executing,
    Finished,
}

/// One batch run over one statement source.
pub struct BatchRun<D> {
    manager: ConnectionManager<D>,
    config: BatchConfig,
    phase: RunPhase,
}

impl<D: GraphDriver> BatchRun<D> {
    pub fn new(manager: ConnectionManager<D>, config: BatchConfig) -> Self {
        Self {
            manager,
            config,
            phase: RunPhase::Idle,
        }
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    fn transition(&mut self, next: RunPhase) {
        tracing::debug!(from = ?self.phase, to = ?next, "Batch run phase change");
        self.phase = next;
    }

    /// Run the whole pipeline to completion.
    ///
    /// Settings are validated before any I/O. A connection failure ends the
    /// run before the source is opened. Once connected, the connection is
    /// released on every exit path before this returns.
    pub async fn run(
        &mut self,
        settings: ConnectionSettings,
        source: &Path,
    ) -> Result<RunSummary> {
        let config = settings.validate()?;

        self.transition(RunPhase::Connecting);
        let connection = match self.manager.connect(&config).await {
            Ok(connection) => connection,
            Err(e) => {
                tracing::error!(error = %e, "Failed to connect to graph database");
                self.transition(RunPhase::ConnectionFailed);
                return Err(e.into());
            }
        };
        self.transition(RunPhase::Connected);

        let result = self.execute(&connection, source).await;
        drop(connection);

        self.transition(RunPhase::Finished);
        tracing::info!(source = %source.display(), "Batch run finished");
        result
    }

    /// Blocking entry point: drives [`BatchRun::run`] on a dedicated
    /// current-thread runtime until the pipeline completes.
    ///
    /// Must be called from synchronous code. Calling it from inside a tokio
    /// runtime panics; await [`BatchRun::run`] there instead.
    pub fn run_blocking(
        &mut self,
        settings: ConnectionSettings,
        source: &Path,
    ) -> Result<RunSummary> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        runtime.block_on(self.run(settings, source))
    }

    async fn execute(
        &mut self,
        connection: &Connection<D::Connection>,
        source: &Path,
    ) -> Result<RunSummary> {
        let statements = segment::open_source(source, self.config.on_unterminated)?;

        self.transition(RunPhase::Executing);
        let mut summary = RunSummary::new(source, connection.graph_name());
        let outcome = BatchExecutor::new(connection)
            .execute(statements, &mut summary)
            .await;
        summary.finish();

        tracing::info!(
            run_id = %summary.run_id,
            graph = %summary.graph,
            attempted = summary.attempted,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "Batch execution complete"
        );

        match outcome {
            Ok(()) => Ok(summary),
            Err(e) => {
                tracing::error!(line = e.line, error = %e.source, "Failed to read statement source");
                Err(BatchError::SourceRead {
                    path: source.to_path_buf(),
                    line: e.line,
                    source: e.source,
                    summary: Box::new(summary),
                })
            }
        }
    }
}

/// Every statement succeeded.
pub const EXIT_CLEAN: u8 = 0;
/// The run finished but some statements failed.
pub const EXIT_STATEMENTS_FAILED: u8 = 2;
/// The run ended on a fatal error.
pub const EXIT_FATAL: u8 = 1;

/// Map a run result to the process exit status.
pub fn exit_status(result: &Result<RunSummary>) -> u8 {
    match result {
        Ok(summary) if summary.is_clean() => EXIT_CLEAN,
        Ok(_) => EXIT_STATEMENTS_FAILED,
        Err(_) => EXIT_FATAL,
    }
}

/// Write the JSON run report for `result` to `path`, if a path is set.
///
/// An interrupted run reports its partial summary. If that write fails the
/// failure is logged and the original run error is returned unchanged.
pub fn write_run_report(
    result: Result<RunSummary>,
    path: Option<&Path>,
) -> Result<RunSummary> {
    let Some(path) = path else {
        return result;
    };

    match result {
        Ok(summary) => {
            summary.write_report(path)?;
            Ok(summary)
        }
        Err(e) => {
            if let Some(partial) = e.partial_summary() {
                if let Err(report_err) = partial.write_report(path) {
                    tracing::error!(error = %report_err, "Failed to write partial run report");
                }
            }
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use graphload_core::ConfigError;
    use graphload_graph::{DriverCapability, GraphError};

    use super::*;
    use crate::config::UnterminatedPolicy;
    use crate::summary::StatementFailure;
    use crate::testing::{manager, settings, MockDriver};

    fn source_file(contents: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents).unwrap();
        file
    }

    #[tokio::test]
    async fn test_full_run() {
        let driver = MockDriver::default();
        let state = driver.state.clone();
        let mut run = BatchRun::new(manager(driver), BatchConfig::default());
        let file = source_file(b"MATCH (n) RETURN n;\n\nCREATE (:X);\n");

        let summary = run.run(settings(), file.path()).await.unwrap();

        assert_eq!(summary.attempted, 2);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.graph, "social");
        assert!(summary.finished_at.is_some());
        assert_eq!(state.executed(), vec!["MATCH (n) RETURN n", "CREATE (:X)"]);
        assert!(state.released());
        assert_eq!(run.phase(), RunPhase::Finished);
    }

    #[tokio::test]
    async fn test_second_of_three_fails() {
        let mut run = BatchRun::new(manager(MockDriver::default()), BatchConfig::default());
        let file = source_file(b"CREATE (:A);\nCREATE BROKEN;\nCREATE (:C);\n");

        let summary = run.run(settings(), file.path()).await.unwrap();

        assert_eq!(summary.attempted, 3);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.failures[0].statement, "CREATE BROKEN");
    }

    #[tokio::test]
    async fn test_missing_graph_name_never_connects() {
        let driver = MockDriver::default();
        let state = driver.state.clone();
        let mut run = BatchRun::new(manager(driver), BatchConfig::default());
        let file = source_file(b"RETURN 1;\n");

        let err = run
            .run(
                ConnectionSettings {
                    graph_name: None,
                    ..settings()
                },
                file.path(),
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            BatchError::Config(ConfigError::Missing { ref fields }) if fields == &["graph_name"]
        ));
        assert_eq!(state.connects(), 0);
        assert_eq!(run.phase(), RunPhase::Idle);
    }

    #[tokio::test]
    async fn test_connection_failure_is_terminal() {
        let driver = MockDriver {
            fail_ping: true,
            ..MockDriver::default()
        };
        let state = driver.state.clone();
        let mut run = BatchRun::new(manager(driver), BatchConfig::default());
        let file = source_file(b"RETURN 1;\n");

        let err = run.run(settings(), file.path()).await.unwrap_err();

        assert!(matches!(err, BatchError::Graph(GraphError::Connection { .. })));
        assert!(state.executed().is_empty());
        assert!(state.released());
        assert_eq!(run.phase(), RunPhase::ConnectionFailed);
    }

    #[tokio::test]
    async fn test_unavailable_driver() {
        let driver = MockDriver::default();
        let state = driver.state.clone();
        let manager = ConnectionManager::new(driver, DriverCapability::Unavailable);
        let mut run = BatchRun::new(manager, BatchConfig::default());
        let file = source_file(b"RETURN 1;\n");

        let err = run.run(settings(), file.path()).await.unwrap_err();

        assert!(matches!(
            err,
            BatchError::Graph(GraphError::DependencyUnavailable { .. })
        ));
        assert_eq!(state.connects(), 0);
    }

    #[tokio::test]
    async fn test_missing_source_releases_connection() {
        let driver = MockDriver::default();
        let state = driver.state.clone();
        let mut run = BatchRun::new(manager(driver), BatchConfig::default());
        let dir = tempfile::tempdir().unwrap();

        let err = run
            .run(settings(), &dir.path().join("nope.cypher"))
            .await
            .unwrap_err();

        assert!(matches!(err, BatchError::SourceNotFound { .. }));
        assert!(state.executed().is_empty());
        assert!(state.released());
        assert_eq!(run.phase(), RunPhase::Finished);
    }

    #[tokio::test]
    async fn test_read_error_carries_partial_summary() {
        let driver = MockDriver::default();
        let state = driver.state.clone();
        let mut run = BatchRun::new(manager(driver), BatchConfig::default());
        let file = source_file(b"RETURN 1;\nRETURN 2;\n\xff\xff;\nRETURN 4;\n");

        let err = run.run(settings(), file.path()).await.unwrap_err();

        let partial = err.partial_summary().unwrap();
        assert_eq!(partial.attempted, 2);
        assert_eq!(partial.succeeded, 2);
        assert!(matches!(err, BatchError::SourceRead { line: 3, .. }));
        assert!(state.released());
    }

    #[tokio::test]
    async fn test_unterminated_policy_execute() {
        let driver = MockDriver::default();
        let state = driver.state.clone();
        let config = BatchConfig {
            on_unterminated: UnterminatedPolicy::Execute,
            ..BatchConfig::default()
        };
        let mut run = BatchRun::new(manager(driver), config);
        let file = source_file(b"CREATE (:A);\nCREATE (:B)\n");

        let summary = run.run(settings(), file.path()).await.unwrap();

        assert_eq!(summary.attempted, 2);
        assert_eq!(state.executed(), vec!["CREATE (:A)", "CREATE (:B)"]);
    }

    #[test]
    fn test_run_blocking() {
        let mut run = BatchRun::new(manager(MockDriver::default()), BatchConfig::default());
        let file = source_file(b"CREATE (:A);\nCREATE (:B);\nCREATE (:C)\n");

        let summary = run.run_blocking(settings(), file.path()).unwrap();

        assert_eq!(summary.attempted, 2);
        assert_eq!(run.phase(), RunPhase::Finished);
    }

    #[tokio::test]
    async fn test_unreachable_server_ends_in_connection_failed() {
        let driver = MockDriver {
            refuse: true,
            ..MockDriver::default()
        };
        let state = driver.state.clone();
        let mut run = BatchRun::new(manager(driver), BatchConfig::default());
        let file = source_file(b"RETURN 1;\n");

        let err = run.run(settings(), file.path()).await.unwrap_err();

        assert!(matches!(err, BatchError::Graph(GraphError::Connection { .. })));
        assert!(err.to_string().contains("connection refused"));
        assert_eq!(state.connects(), 1);
        assert!(state.executed().is_empty());
        assert_eq!(run.phase(), RunPhase::ConnectionFailed);
    }

    fn summary_with(failed: usize) -> RunSummary {
        let mut summary = RunSummary::new(Path::new("q.cypher"), "social");
        summary.record_success();
        for _ in 0..failed {
            summary.attempted += 1;
            summary.failed += 1;
            summary.failures.push(StatementFailure {
                index: summary.attempted,
                line: summary.attempted,
                statement: "BROKEN".to_string(),
                error: "Invalid input".to_string(),
            });
        }
        summary
    }

    fn read_error(summary: RunSummary) -> BatchError {
        BatchError::SourceRead {
            path: "q.cypher".into(),
            line: 4,
            source: std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "stream did not contain valid UTF-8",
            ),
            summary: Box::new(summary),
        }
    }

    #[test]
    fn test_exit_status() {
        assert_eq!(exit_status(&Ok(summary_with(0))), EXIT_CLEAN);
        assert_eq!(exit_status(&Ok(summary_with(1))), EXIT_STATEMENTS_FAILED);
        assert_eq!(exit_status(&Err(read_error(summary_with(0)))), EXIT_FATAL);
        let not_found = BatchError::SourceNotFound {
            path: "nope.cypher".into(),
        };
        assert_eq!(exit_status(&Err(not_found)), EXIT_FATAL);
    }

    #[test]
    fn test_report_written_for_finished_run() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");

        let summary = write_run_report(Ok(summary_with(1)), Some(&path)).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let written: RunSummary = serde_json::from_str(&raw).unwrap();
        assert_eq!(written, summary);
    }

    #[test]
    fn test_partial_report_written_for_interrupted_run() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");

        let err = write_run_report(Err(read_error(summary_with(1))), Some(&path)).unwrap_err();

        assert!(matches!(err, BatchError::SourceRead { line: 4, .. }));
        let raw = std::fs::read_to_string(&path).unwrap();
        let written: RunSummary = serde_json::from_str(&raw).unwrap();
        assert_eq!(written.attempted, 2);
        assert_eq!(written.failed, 1);
    }

    #[test]
    fn test_failed_partial_report_keeps_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"").unwrap();
        let path = blocker.join("run.json");

        let err = write_run_report(Err(read_error(summary_with(0))), Some(&path)).unwrap_err();

        assert!(matches!(err, BatchError::SourceRead { line: 4, .. }));
        assert!(err.to_string().contains("valid UTF-8"));
        assert!(!path.exists());
    }

    #[test]
    fn test_no_report_path() {
        let summary = write_run_report(Ok(summary_with(0)), None).unwrap();
        assert!(summary.is_clean());
    }
}
