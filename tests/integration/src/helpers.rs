//! Test helpers for loading fixture clusters and running decisions.

use std::collections::BTreeSet;
use std::path::PathBuf;

use roster_policy::{MemoryReporter, NodeId, PolicyConfig, PolicyEngine, Snapshot};

/// A fixture inventory plus the configuration and reporter a decision
/// runs with.
pub struct TestCluster {
    pub snapshot: Snapshot,
    pub config: PolicyConfig,
    pub reporter: MemoryReporter,
}

impl TestCluster {
    /// Loads `fixtures/<name>.json` with the default configuration.
    pub fn load(name: &str) -> Self {
        Self::load_with(name, PolicyConfig::default())
    }

    pub fn load_with(name: &str, config: PolicyConfig) -> Self {
        let path = fixture_path(name);
        let snapshot = Snapshot::from_file(&path)
            .unwrap_or_else(|e| panic!("failed to load fixture {}: {e}", path.display()));
        Self {
            snapshot,
            config,
            reporter: MemoryReporter::new(),
        }
    }

    /// An engine over this cluster. Every call sees the same snapshot.
    pub fn engine(&self) -> PolicyEngine<'_> {
        PolicyEngine::new(&self.snapshot, &self.config, &self.reporter)
    }
}

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join(format!("{name}.json"))
}

pub fn ids(list: &[&str]) -> Vec<NodeId> {
    list.iter().map(|s| NodeId::from(*s)).collect()
}

pub fn id_set(list: &[&str]) -> BTreeSet<NodeId> {
    list.iter().map(|s| NodeId::from(*s)).collect()
}
