use std::path::Path;

use serde_derive::{Deserialize, Serialize};

/// Cluster topology agreed on by the layout servers.
#[derive(Serialize, Deserialize)]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClusterLayout {
    pub epoch: u64,

    #[serde(default)]
    pub layout_servers: Vec<String>,

    #[serde(default)]
    pub sequencers: Vec<String>,

    #[serde(default)]
    pub log_servers: Vec<String>,
}

impl ClusterLayout {
    /// Layout where a single endpoint plays every role.
    pub fn single(endpoint: &str) -> Self {
        ClusterLayout {
            epoch: 0,
            layout_servers: vec![endpoint.to_string()],
            sequencers: vec![endpoint.to_string()],
            log_servers: vec![endpoint.to_string()],
        }
    }

    /// Reads a layout from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .map_err(|error| format!("could not open {}: {}", path.display(), error))?;
        serde_json::from_reader(file)
            .map_err(|error| format!("could not parse {}: {}", path.display(), error))
    }
}

impl layout_consensus::Layout for ClusterLayout {
    fn epoch(&self) -> u64 {
        self.epoch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_partial_json() {
        let json = r#"{ "epoch": 3, "sequencers": ["localhost:9000"] }"#;
        let layout: ClusterLayout = serde_json::from_str(json).unwrap();
        assert_eq!(layout.epoch, 3);
        assert_eq!(layout.sequencers, vec!["localhost:9000".to_string()]);
        assert!(layout.log_servers.is_empty());
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layout.json");
        let layout = ClusterLayout::single("localhost:9000");
        std::fs::write(&path, serde_json::to_string(&layout).unwrap()).unwrap();
        assert_eq!(ClusterLayout::load(&path).unwrap(), layout);
        assert!(ClusterLayout::load(dir.path().join("missing.json")).is_err());
    }
}
