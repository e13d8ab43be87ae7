//! Statement segmentation.
//!
//! Turns a line-oriented source into a lazy sequence of statements. A
//! statement ends on the first line whose trimmed content ends with `;`.
//! Blank lines are skipped. No quoting is understood: a `;` at the end of a
//! line inside a string literal still ends the statement.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use crate::config::UnterminatedPolicy;
use crate::error::{BatchError, Result};

/// Statement delimiter.
pub const DELIMITER: char = ';';

/// One complete statement, delimiter stripped and whitespace trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    text: String,
    line: usize,
}

impl Statement {
    pub fn text(&self) -> &str {
        &self.text
    }

    /// 1-based source line the statement starts on.
    pub fn line(&self) -> usize {
        self.line
    }
}

/// A read failure, with the 1-based line number that could not be read.
#[derive(Debug)]
pub struct ReadError {
    pub line: usize,
    pub source: io::Error,
}

/// Lazy, forward-only iterator of statements over a buffered reader.
///
/// Not restartable: open the source again to segment it again. After a read
/// error the iterator is exhausted.
pub struct StatementSegmenter<R> {
    lines: io::Lines<R>,
    policy: UnterminatedPolicy,
    buffer: Vec<String>,
    buffer_start: usize,
    line_no: usize,
    done: bool,
}

impl<R: BufRead> StatementSegmenter<R> {
    pub fn new(reader: R, policy: UnterminatedPolicy) -> Self {
        Self {
            lines: reader.lines(),
            policy,
            buffer: Vec::new(),
            buffer_start: 0,
            line_no: 0,
            done: false,
        }
    }

    fn take_statement(&mut self) -> Option<Statement> {
        let joined = self.buffer.join("\n");
        self.buffer.clear();

        let trimmed = joined.trim();
        let text = trimmed.strip_suffix(DELIMITER).unwrap_or(trimmed).trim();
        if text.is_empty() {
            tracing::debug!(line = self.buffer_start, "Skipping empty statement");
            return None;
        }
        Some(Statement {
            text: text.to_string(),
            line: self.buffer_start,
        })
    }

    fn finish(&mut self) -> Option<Statement> {
        self.done = true;
        if self.buffer.is_empty() {
            return None;
        }
        match self.policy {
            UnterminatedPolicy::Execute => self.take_statement(),
            UnterminatedPolicy::Drop => {
                tracing::warn!(
                    line = self.buffer_start,
                    lines = self.buffer.len(),
                    "Dropping unterminated statement at end of input"
                );
                self.buffer.clear();
                None
            }
        }
    }
}

impl<R: BufRead> Iterator for StatementSegmenter<R> {
    type Item = std::result::Result<Statement, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            let line = match self.lines.next() {
                Some(Ok(line)) => line,
                Some(Err(source)) => {
                    self.done = true;
                    return Some(Err(ReadError {
                        line: self.line_no + 1,
                        source,
                    }));
                }
                None => return self.finish().map(Ok),
            };
            self.line_no += 1;

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let terminated = trimmed.ends_with(DELIMITER);
            if self.buffer.is_empty() {
                self.buffer_start = self.line_no;
            }
            self.buffer.push(line);

            if terminated {
                if let Some(statement) = self.take_statement() {
                    return Some(Ok(statement));
                }
            }
        }
    }
}

/// Segment an in-memory string.
pub fn segment_str(input: &str, policy: UnterminatedPolicy) -> StatementSegmenter<&[u8]> {
    StatementSegmenter::new(input.as_bytes(), policy)
}

/// Open a statement file for segmentation.
///
/// A missing file is reported as [`BatchError::SourceNotFound`] so callers
/// can tell it apart from other I/O failures.
pub fn open_source(
    path: &Path,
    policy: UnterminatedPolicy,
) -> Result<StatementSegmenter<BufReader<File>>> {
    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => BatchError::SourceNotFound {
            path: path.to_path_buf(),
        },
        _ => BatchError::Io(e),
    })?;
    Ok(StatementSegmenter::new(BufReader::new(file), policy))
}
