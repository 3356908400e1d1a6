//! End-to-end runs of the sweep pipeline against stub synthesis tools.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tempfile::TempDir;

use linksweep::config::{ExperimentConfig, GeneralConfig, OutputConfig, SweepConfig, SynthesisConfig};
use linksweep::orchestrator::{collect_results, generate_topologies, run_experiment};
use linksweep::sweep::{ParamValue, ParameterMap, MANIFEST_FILE_NAME};
use linksweep::synthesis::{default_algorithms, Algorithm};
use linksweep::topology::TopologyKind;

const RING_HEADER: &str = "world_size,bandwidth_ratio,slow_link_proportion,Algorithm,Synthesis Time (ps)";

/// Answers only the plain `--run` invocation with a collective time
const RANDOM_ONLY_STUB: &str = r#"#!/bin/sh
if [ "$#" -eq 4 ] && [ "$4" = "--run" ]; then
    echo "Parsing topology $3"
    echo "Synthesized Collective Time: 100 ps"
fi
exit 0
"#;

const FAILING_STUB: &str = "#!/bin/sh\necho 'cannot open topology' >&2\nexit 3\n";

const SLEEPING_STUB: &str = "#!/bin/sh\nexec sleep 5\n";

/// Reports a time and exits, leaving a background child holding stdout
const LINGERING_STUB: &str = r#"#!/bin/sh
sleep 5 &
echo "Synthesized Collective Time: 100 ps"
exit 0
"#;

fn write_stub(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, body).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn ring_config(dir: &Path, synthesis: Option<SynthesisConfig>) -> ExperimentConfig {
    let mut parameters = ParameterMap::new();
    parameters.insert("world_size".into(), vec![ParamValue::Integer(4)]);
    parameters.insert("bandwidth_ratio".into(), vec![ParamValue::Integer(50)]);
    parameters.insert("slow_link_proportion".into(), vec![ParamValue::Float(0.5)]);
    ExperimentConfig {
        general: GeneralConfig {
            seed: 11,
            log_level: None,
        },
        sweep: SweepConfig {
            topology: TopologyKind::Ring,
            parameters,
        },
        synthesis,
        output: OutputConfig {
            topology_dir: dir.join("topologies"),
            results: dir.join("results.csv"),
        },
    }
}

fn synthesis(executable: &Path, algorithms: Vec<Algorithm>) -> SynthesisConfig {
    SynthesisConfig {
        executable: executable.display().to_string(),
        timeout: None,
        algorithms,
    }
}

#[test]
fn test_run_records_only_reporting_algorithm() {
    let dir = TempDir::new().unwrap();
    let stub = write_stub(dir.path(), "tacos.sh", RANDOM_ONLY_STUB);
    let config = ring_config(dir.path(), Some(synthesis(&stub, default_algorithms())));

    let summary = run_experiment(&config).unwrap();
    assert_eq!(summary.files_written, 1);
    assert_eq!(summary.tuples_skipped, 0);
    assert_eq!(summary.rows_recorded, 1);
    assert_eq!(summary.units_without_row, 2);

    let results = fs::read_to_string(&config.output.results).unwrap();
    let lines: Vec<&str> = results.lines().collect();
    assert_eq!(lines, vec![RING_HEADER, "4,50,0.5,random,100"]);

    let topology = config.output.topology_dir.join("ring_ws4_bw50_slp0.5.csv");
    let content = fs::read_to_string(topology).unwrap();
    let mut lines = content.lines();
    assert_eq!(lines.next(), Some("4"));
    assert_eq!(lines.next(), Some("Src,Dest,Latency (ns),Bandwidth (GB/s)"));
    let slow = lines.filter(|line| line.ends_with(",1")).count();
    assert_eq!(slow, 4);
    assert!(config.output.topology_dir.join(MANIFEST_FILE_NAME).exists());
}

#[test]
fn test_failing_tool_yields_header_only() {
    let dir = TempDir::new().unwrap();
    let stub = write_stub(dir.path(), "broken.sh", FAILING_STUB);
    let config = ring_config(dir.path(), Some(synthesis(&stub, default_algorithms())));

    let summary = run_experiment(&config).unwrap();
    assert_eq!(summary.rows_recorded, 0);
    assert_eq!(summary.units_without_row, 3);

    let results = fs::read_to_string(&config.output.results).unwrap();
    assert_eq!(results.trim_end(), RING_HEADER);
}

#[test]
fn test_missing_tool_does_not_abort() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("absent.sh");
    let config = ring_config(dir.path(), Some(synthesis(&missing, vec![Algorithm::random()])));

    let summary = run_experiment(&config).unwrap();
    assert_eq!(summary.files_written, 1);
    assert_eq!(summary.rows_recorded, 0);
    assert_eq!(summary.units_without_row, 1);
}

#[test]
fn test_timeout_kills_slow_tool() {
    let dir = TempDir::new().unwrap();
    let stub = write_stub(dir.path(), "slow.sh", SLEEPING_STUB);
    let mut settings = synthesis(&stub, vec![Algorithm::random()]);
    settings.timeout = Some(Duration::from_millis(200));
    let config = ring_config(dir.path(), Some(settings));

    let started = Instant::now();
    let summary = run_experiment(&config).unwrap();
    assert!(started.elapsed() < Duration::from_secs(4));
    assert_eq!(summary.rows_recorded, 0);
    assert_eq!(summary.units_without_row, 1);
}

#[test]
fn test_timeout_bounds_lingering_descendant() {
    let dir = TempDir::new().unwrap();
    let stub = write_stub(dir.path(), "wrapper.sh", LINGERING_STUB);
    let mut settings = synthesis(&stub, vec![Algorithm::random()]);
    settings.timeout = Some(Duration::from_millis(500));
    let config = ring_config(dir.path(), Some(settings));

    let started = Instant::now();
    let summary = run_experiment(&config).unwrap();
    assert!(started.elapsed() < Duration::from_secs(3));
    assert_eq!(summary.rows_recorded, 1);
}

#[test]
fn test_repeated_sweep_value_rejected_before_io() {
    let dir = TempDir::new().unwrap();
    let stub = write_stub(dir.path(), "tacos.sh", RANDOM_ONLY_STUB);
    let mut config = ring_config(dir.path(), Some(synthesis(&stub, default_algorithms())));
    config.sweep.parameters.insert(
        "world_size".into(),
        vec![ParamValue::Integer(4), ParamValue::Integer(4)],
    );

    assert!(run_experiment(&config).is_err());
    assert!(!config.output.topology_dir.exists());
    assert!(!config.output.results.exists());
}

#[test]
fn test_collect_over_generated_directory() {
    let dir = TempDir::new().unwrap();
    let mut config = ring_config(dir.path(), None);
    config.sweep.parameters.insert(
        "world_size".into(),
        vec![ParamValue::Integer(8), ParamValue::Integer(4)],
    );
    let outcome = generate_topologies(&config).unwrap();
    assert_eq!(outcome.written.len(), 2);

    let stub = write_stub(dir.path(), "tacos.sh", RANDOM_ONLY_STUB);
    let results_path = dir.path().join("collected").join("results.csv");
    let summary = collect_results(
        &config.output.topology_dir,
        None,
        &synthesis(&stub, vec![Algorithm::random(), Algorithm::greedy()]),
        &results_path,
    )
    .unwrap();

    assert_eq!(summary.files, 2);
    assert_eq!(summary.rows, 2);
    assert_eq!(summary.no_metric, 2);

    let results = fs::read_to_string(&results_path).unwrap();
    let lines: Vec<&str> = results.lines().collect();
    assert_eq!(
        lines,
        vec![RING_HEADER, "4,50,0.5,random,100", "8,50,0.5,random,100"]
    );
}

#[test]
fn test_same_seed_reproduces_files() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    generate_topologies(&ring_config(first.path(), None)).unwrap();
    generate_topologies(&ring_config(second.path(), None)).unwrap();

    let name = "ring_ws4_bw50_slp0.5.csv";
    assert_eq!(
        fs::read(first.path().join("topologies").join(name)).unwrap(),
        fs::read(second.path().join("topologies").join(name)).unwrap()
    );
}
