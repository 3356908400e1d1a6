//! Result aggregation.
//!
//! Runs each algorithm against each topology file, reduces repeated
//! samples to their best value, and appends rows to the results table.

pub mod aggregator;
pub mod table;

pub use aggregator::{aggregate, measure, AggregateSummary, Outcome, TopologyUnit};
pub use table::{ResultsTable, RunRecord, ALGORITHM_COLUMN, SYNTHESIS_TIME_COLUMN};
