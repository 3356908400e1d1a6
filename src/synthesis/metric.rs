//! Synthesis-time extraction from the tool's stdout.

use regex::Regex;
use std::sync::LazyLock;

/// Match: "Synthesized Collective Time: <N> ps"
static SYNTHESIS_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Synthesized Collective Time:\s+(\d+)\s+ps").expect("Invalid synthesis time regex")
});

/// Extract the first synthesized collective time, in picoseconds.
///
/// Absence is an expected outcome, not an error.
pub fn extract_synthesis_time(stdout: &str) -> Option<u64> {
    SYNTHESIS_TIME
        .captures(stdout)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}
