//! graphload-batch: Runs files of graph query statements against a graph.
//!
//! A source file is split into `;`-terminated statements, each statement is
//! executed in order over a single health-checked connection, and the run
//! ends with a summary of what succeeded and what failed.

pub mod config;
pub mod error;
pub mod executor;
pub mod run;
pub mod segment;
pub mod summary;

#[cfg(test)]
mod testing;
