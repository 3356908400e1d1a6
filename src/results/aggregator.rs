//! Per-(file, algorithm) measurement and best-of-N reduction.
//!
//! Each unit of work ends in exactly one [`Outcome`]. Only `Success` emits
//! a row; the other outcomes are logged and processing continues.

use color_eyre::eyre::Result;
use log::{debug, error, info, warn};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::results::table::{ResultsTable, RunRecord};
use crate::synthesis::{extract_synthesis_time, Algorithm, InvokeError, Synthesizer};

/// Terminal state of one (file, algorithm) unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Best (minimum) extracted time in picoseconds
    Success(u64),
    /// The tool ran but never reported a time
    NoMetric,
    /// Every attempt failed to run
    ProcessFailure,
}

/// A topology file together with its parameter column values
#[derive(Debug, Clone, PartialEq)]
pub struct TopologyUnit {
    pub path: PathBuf,
    pub parameters: Vec<String>,
}

impl TopologyUnit {
    fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Counters over one aggregation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateSummary {
    pub files: usize,
    pub rows: usize,
    pub no_metric: usize,
    pub process_failures: usize,
}

fn log_failure(algorithm: &str, file: &str, err: &InvokeError) {
    error!("Failed to execute '{}' on '{}': {}", algorithm, file, err);
    if let Some(stderr) = err.stderr() {
        if !stderr.trim().is_empty() {
            warn!("Error output: {}", stderr.trim());
        }
    }
}

/// Run one algorithm on one file, `algorithm.attempts` times.
pub fn measure(tool: &dyn Synthesizer, file: &Path, algorithm: &Algorithm) -> Outcome {
    let attempts = algorithm.attempts.max(1);
    let file_name = file.display().to_string();
    let mut times = Vec::with_capacity(attempts);
    let mut ran = false;

    for attempt in 1..=attempts {
        if attempts > 1 {
            info!("  Running '{}' - Attempt {}/{}", algorithm.name, attempt, attempts);
        } else {
            info!("  Running '{}'", algorithm.name);
        }

        let invocation = match tool.synthesize(file, &algorithm.args) {
            Ok(invocation) => invocation,
            Err(e) => {
                log_failure(&algorithm.name, &file_name, &e);
                continue;
            }
        };
        ran = true;

        match extract_synthesis_time(&invocation.stdout) {
            Some(time) => {
                debug!("    Extracted Synthesis Time: {} ps", time);
                times.push(time);
            }
            None => warn!(
                "Synthesis time not found in output for '{}' on '{}'",
                algorithm.name, file_name
            ),
        }
    }

    match times.iter().min() {
        Some(&best) => Outcome::Success(best),
        None if ran => Outcome::NoMetric,
        None => Outcome::ProcessFailure,
    }
}

/// Measure every algorithm on every unit and append rows to `table`.
///
/// Units are processed in file-name order and the table is flushed after
/// each file, so a crash keeps every row of the files already finished.
pub fn aggregate<W: Write>(
    tool: &dyn Synthesizer,
    algorithms: &[Algorithm],
    units: &[TopologyUnit],
    table: &mut ResultsTable<W>,
) -> Result<AggregateSummary> {
    let mut ordered: Vec<&TopologyUnit> = units.iter().collect();
    ordered.sort_by_key(|unit| unit.file_name());

    let mut summary = AggregateSummary::default();
    for unit in ordered {
        let file_name = unit.file_name();
        info!(
            "Processing File: {} | Parameters: {}",
            file_name,
            unit.parameters.join(", ")
        );

        for algorithm in algorithms {
            match measure(tool, &unit.path, algorithm) {
                Outcome::Success(time) => {
                    table.append(&RunRecord {
                        parameters: unit.parameters.clone(),
                        algorithm: algorithm.name.clone(),
                        synthesis_time_ps: time,
                    })?;
                    summary.rows += 1;
                    if algorithm.is_best_of_n() {
                        info!("    Best Synthesis Time for '{}': {} ps", algorithm.name, time);
                    } else {
                        info!("    Synthesis Time for '{}': {} ps", algorithm.name, time);
                    }
                }
                Outcome::NoMetric => {
                    summary.no_metric += 1;
                    warn!(
                        "No valid synthesis times extracted for '{}' on '{}', no row recorded",
                        algorithm.name, file_name
                    );
                }
                Outcome::ProcessFailure => {
                    summary.process_failures += 1;
                    warn!(
                        "'{}' could not be run on '{}', no row recorded",
                        algorithm.name, file_name
                    );
                }
            }
        }

        table.flush()?;
        summary.files += 1;
    }

    info!(
        "All commands executed: {} rows recorded from {} files",
        summary.rows, summary.files
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthesis::Invocation;
    use crate::topology::TopologyKind;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::process::ExitStatus;

    /// Replays scripted results in order
    struct Scripted {
        replies: RefCell<VecDeque<Result<Invocation, InvokeError>>>,
        calls: RefCell<Vec<Vec<String>>>,
    }

    impl Scripted {
        fn new(replies: Vec<Result<Invocation, InvokeError>>) -> Self {
            Self {
                replies: RefCell::new(replies.into()),
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl Synthesizer for Scripted {
        fn synthesize(&self, _file: &Path, args: &[String]) -> Result<Invocation, InvokeError> {
            self.calls.borrow_mut().push(args.to_vec());
            self.replies
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(InvokeError::NotFound { path: "scripted".into() }))
        }
    }

    fn time(ps: u64) -> Result<Invocation, InvokeError> {
        Ok(Invocation {
            stdout: format!("\t- Synthesized Collective Time: {} ps\n", ps),
            stderr: String::new(),
        })
    }

    fn silent() -> Result<Invocation, InvokeError> {
        Ok(Invocation {
            stdout: "nothing synthesized".into(),
            stderr: String::new(),
        })
    }

    fn failed() -> Result<Invocation, InvokeError> {
        #[cfg(unix)]
        let status = {
            use std::os::unix::process::ExitStatusExt;
            ExitStatus::from_raw(1 << 8)
        };
        #[cfg(not(unix))]
        let status = {
            use std::os::windows::process::ExitStatusExt;
            ExitStatus::from_raw(1)
        };
        Err(InvokeError::NonZeroExit {
            path: "tool".into(),
            status,
            stderr: "boom".into(),
        })
    }

    #[test]
    fn test_best_of_five_takes_minimum() {
        let tool = Scripted::new(vec![time(50), time(30), time(70), time(30), time(90)]);
        let outcome = measure(&tool, Path::new("t.csv"), &Algorithm::multiple_5());
        assert_eq!(outcome, Outcome::Success(30));
        assert_eq!(tool.calls.borrow().len(), 5);
        assert_eq!(tool.calls.borrow()[0], vec!["--multiple", "5", "--run"]);
    }

    #[test]
    fn test_best_of_n_ignores_failed_attempts() {
        let tool = Scripted::new(vec![failed(), time(80), silent(), time(60), failed()]);
        let outcome = measure(&tool, Path::new("t.csv"), &Algorithm::multiple_5());
        assert_eq!(outcome, Outcome::Success(60));
    }

    #[test]
    fn test_no_metric_and_process_failure() {
        let tool = Scripted::new(vec![silent()]);
        assert_eq!(
            measure(&tool, Path::new("t.csv"), &Algorithm::random()),
            Outcome::NoMetric
        );

        let tool = Scripted::new(vec![failed()]);
        assert_eq!(
            measure(&tool, Path::new("t.csv"), &Algorithm::greedy()),
            Outcome::ProcessFailure
        );

        let tool = Scripted::new(vec![failed(), failed(), failed(), failed(), failed()]);
        assert_eq!(
            measure(&tool, Path::new("t.csv"), &Algorithm::multiple_5()),
            Outcome::ProcessFailure
        );
    }

    #[test]
    fn test_aggregate_sorts_files_and_skips_failures() {
        let units = vec![
            TopologyUnit {
                path: PathBuf::from("dir/ring_ws8_bw50_slp0.5.csv"),
                parameters: vec!["8".into(), "50".into(), "0.5".into()],
            },
            TopologyUnit {
                path: PathBuf::from("dir/ring_ws16_bw50_slp0.5.csv"),
                parameters: vec!["16".into(), "50".into(), "0.5".into()],
            },
        ];
        // ws16 first: random ok, greedy fails; then ws8: random silent, greedy ok
        let tool = Scripted::new(vec![time(10), failed(), silent(), time(20)]);
        let algorithms = vec![Algorithm::random(), Algorithm::greedy()];
        let mut table = ResultsTable::from_writer(Vec::new(), TopologyKind::Ring).unwrap();

        let summary = aggregate(&tool, &algorithms, &units, &mut table).unwrap();
        assert_eq!(
            summary,
            AggregateSummary {
                files: 2,
                rows: 2,
                no_metric: 1,
                process_failures: 1,
            }
        );

        let text = String::from_utf8(table.into_inner().unwrap()).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "16,50,0.5,random,10");
        assert_eq!(lines[2], "8,50,0.5,greedy,20");
    }
}
