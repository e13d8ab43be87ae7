//! Sequential statement execution.

use graphload_graph::{Connection, GraphConnection};

use crate::segment::{ReadError, Statement};
use crate::summary::RunSummary;

/// Executes statements one at a time over a single connection.
///
/// A failing statement is logged, recorded in the summary, and skipped; only
/// a failure to read the next statement stops execution.
pub struct BatchExecutor<'a, C> {
    connection: &'a Connection<C>,
}

impl<'a, C: GraphConnection> BatchExecutor<'a, C> {
    pub fn new(connection: &'a Connection<C>) -> Self {
        Self { connection }
    }

    /// Drain `statements` in order, recording every outcome in `summary`.
    ///
    /// On a read error the statements already executed stay recorded in
    /// `summary` and the error is returned.
    pub async fn execute<I>(
        &self,
        statements: I,
        summary: &mut RunSummary,
    ) -> Result<(), ReadError>
    where
        I: IntoIterator<Item = Result<Statement, ReadError>>,
    {
        for next in statements {
            let statement = next?;
            self.execute_one(&statement, summary).await;
        }
        Ok(())
    }

    async fn execute_one(&self, statement: &Statement, summary: &mut RunSummary) {
        let index = summary.attempted + 1;
        tracing::debug!(index, line = statement.line(), "Executing statement");

        match self.connection.query(statement.text()).await {
            Ok(()) => summary.record_success(),
            Err(e) => {
                tracing::error!(
                    index,
                    line = statement.line(),
                    graph = %self.connection.graph_name(),
                    statement = %statement.text(),
                    error = %e,
                    "Statement failed"
                );
                summary.record_failure(statement, e.to_string());
            }
        }
    }
}
