//! Scheduling algorithms the synthesis tool is run under.

use serde::{Deserialize, Serialize};

fn default_attempts() -> usize {
    1
}

/// One algorithm: a result-table name, tool arguments, and attempt count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Algorithm {
    pub name: String,
    pub args: Vec<String>,
    /// More than one attempt means best-of-N: the minimum time is recorded
    #[serde(default = "default_attempts")]
    pub attempts: usize,
}

impl Algorithm {
    pub fn new(name: &str, args: &[&str], attempts: usize) -> Self {
        Self {
            name: name.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            attempts,
        }
    }

    /// Random scheduling, single sample
    pub fn random() -> Self {
        Self::new("random", &["--run"], 1)
    }

    /// Greedy scheduling, single sample
    pub fn greedy() -> Self {
        Self::new("greedy", &["--greedy", "--run"], 1)
    }

    /// The tool's `--multiple 5` mode, sampled five times and reduced to the best
    pub fn multiple_5() -> Self {
        Self::new("multiple_5", &["--multiple", "5", "--run"], 5)
    }

    pub fn is_best_of_n(&self) -> bool {
        self.attempts > 1
    }
}

/// `random`, `greedy`, `multiple_5`
pub fn default_algorithms() -> Vec<Algorithm> {
    vec![Algorithm::random(), Algorithm::greedy(), Algorithm::multiple_5()]
}
