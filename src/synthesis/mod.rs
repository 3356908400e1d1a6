//! External collective synthesis tool.
//!
//! Process invocation, the algorithm catalogue, and extraction of the
//! synthesized collective time from the tool's output.

pub mod algorithm;
pub mod invoker;
pub mod metric;

pub use algorithm::{default_algorithms, Algorithm};
pub use invoker::{ExternalTool, Invocation, InvokeError, Synthesizer};
pub use metric::extract_synthesis_time;
