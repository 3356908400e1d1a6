//! Topology file writer.
//!
//! Layout read by the synthesis tool:
//!
//! ```text
//! 4
//! Src,Dest,Latency (ns),Bandwidth (GB/s)
//! 0,1,500,50
//! 1,0,500,1
//! ```

use color_eyre::eyre::{Context, Result};
use std::fs;
use std::path::Path;

use crate::topology::types::TopologyInstance;

/// Column header of the link table
pub const TOPOLOGY_HEADER: [&str; 4] = ["Src", "Dest", "Latency (ns)", "Bandwidth (GB/s)"];

/// Render a topology to its on-disk text form
pub fn render_topology(topology: &TopologyInstance) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());

    writer.write_record([topology.node_count.to_string()])?;
    writer.write_record(TOPOLOGY_HEADER)?;
    for link in &topology.links {
        writer.write_record([
            link.src.to_string(),
            link.dest.to_string(),
            link.latency.to_string(),
            link.bandwidth.to_string(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to finish topology table: {}", e.error()))
}

/// Write a topology file, creating the parent directory if needed.
///
/// The whole table is rendered before the file is created.
pub fn write_topology(topology: &TopologyInstance, path: &Path) -> Result<()> {
    let content = render_topology(topology)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .wrap_err_with(|| format!("Failed to create directory '{}'", parent.display()))?;
        }
    }

    fs::write(path, content)
        .wrap_err_with(|| format!("Failed to write topology file '{}'", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::types::Link;
    use tempfile::TempDir;

    fn sample() -> TopologyInstance {
        TopologyInstance {
            node_count: 2,
            links: vec![Link::new(0, 1, 50.0), Link::new(1, 0, 1.0)],
        }
    }

    #[test]
    fn test_render_layout() {
        let text = String::from_utf8(render_topology(&sample()).unwrap()).unwrap();
        assert_eq!(
            text,
            "2\nSrc,Dest,Latency (ns),Bandwidth (GB/s)\n0,1,500,50\n1,0,500,1\n"
        );
    }

    #[test]
    fn test_fractional_bandwidth_is_kept() {
        let topo = TopologyInstance {
            node_count: 2,
            links: vec![Link::new(0, 1, 12.5)],
        };
        let text = String::from_utf8(render_topology(&topo).unwrap()).unwrap();
        assert!(text.ends_with("0,1,500,12.5\n"));
    }

    #[test]
    fn test_write_creates_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("ring.csv");
        write_topology(&sample(), &path).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("2\n"));
    }
}
