//! The policy engine.
//!
//! [`PolicyEngine`] ties a snapshot, a configuration and a reporter
//! together for the duration of one decision. The operations themselves
//! live in the `sizing`, `candidates`, `membership`, `replacement` and
//! `affected` modules as `impl PolicyEngine` blocks.

use crate::config::PolicyConfig;
use crate::error::Abort;
use crate::node::{Node, NodeId, Role};
use crate::query::Query;
use crate::report::Reporter;
use crate::snapshot::Inventory;

/// Computes membership decisions over one inventory snapshot.
///
/// Holds no mutable state: concurrent engines over the same snapshot are
/// independent of each other.
pub struct PolicyEngine<'a> {
    pub(crate) inventory: &'a dyn Inventory,
    pub(crate) config: &'a PolicyConfig,
    pub(crate) reporter: &'a dyn Reporter,
}

impl<'a> PolicyEngine<'a> {
    pub fn new(
        inventory: &'a dyn Inventory,
        config: &'a PolicyConfig,
        reporter: &'a dyn Reporter,
    ) -> Self {
        Self {
            inventory,
            config,
            reporter,
        }
    }

    pub fn config(&self) -> &PolicyConfig {
        self.config
    }

    /// Ids of the nodes matching `query`, logged at debug level.
    pub(crate) fn nodes(&self, query: &Query) -> Vec<NodeId> {
        let ids = self.inventory.query(query);
        self.reporter.debug(format_args!(
            "{} nodes match '{query}'",
            ids.len()
        ));
        ids
    }

    /// Number of nodes carrying `role`.
    pub(crate) fn count_role(&self, role: Role) -> usize {
        self.inventory.count(&Query::new().role(role))
    }

    /// Looks up a node, aborting if the snapshot does not know it.
    pub(crate) fn require(&self, id: &NodeId) -> Result<&'a Node, Abort> {
        self.inventory
            .node(id)
            .ok_or_else(|| self.abort(Abort::UnknownNode(id.clone())))
    }

    /// Reports `reason` at error level and hands it back for returning.
    pub(crate) fn abort(&self, reason: Abort) -> Abort {
        self.reporter.error(format_args!("{reason}"));
        reason
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::report::MemoryReporter;

    #[test]
    fn unknown_node_aborts_and_reports() {
        let snapshot = snapshot([booted("a", &[Role::Etcd])]);
        let config = PolicyConfig::default();
        let reporter = MemoryReporter::new();
        let engine = PolicyEngine::new(&snapshot, &config, &reporter);

        let err = engine.require(&"ghost".into()).unwrap_err();
        assert_eq!(err, Abort::UnknownNode("ghost".into()));
        assert_eq!(reporter.errors(), vec!["node ghost not found in inventory"]);
    }

    #[test]
    fn count_role() {
        let snapshot = snapshot([
            booted("a", &[Role::Etcd, Role::KubeMaster]),
            booted("b", &[Role::Etcd]),
            booted("c", &[Role::KubeMinion]),
        ]);
        let config = PolicyConfig::default();
        let reporter = MemoryReporter::new();
        let engine = PolicyEngine::new(&snapshot, &config, &reporter);

        assert_eq!(engine.count_role(Role::Etcd), 2);
        assert_eq!(engine.count_role(Role::KubeMaster), 1);
        assert_eq!(engine.count_role(Role::Admin), 0);
    }
}
