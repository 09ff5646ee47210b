//! etcd scale-up planning.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::candidates::join_ids;
use crate::engine::PolicyEngine;
use crate::node::{NodeId, Role};

/// Nodes that should start running etcd to reach the desired size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EtcdScaleUp {
    /// Current number of etcd members.
    pub current: usize,
    /// Desired number of etcd members.
    pub wanted: usize,
    /// Nodes chosen to become members, best first.
    pub members: Vec<NodeId>,
}

impl EtcdScaleUp {
    /// How many members are missing; zero when at or above the target.
    pub fn missing(&self) -> usize {
        self.wanted.saturating_sub(self.current)
    }

    /// How many missing members could not be matched with a node.
    pub fn shortfall(&self) -> usize {
        self.missing().saturating_sub(self.members.len())
    }

    pub fn is_noop(&self) -> bool {
        self.members.is_empty()
    }
}

impl PolicyEngine<'_> {
    /// Nodes that should be added to etcd to reach the desired size.
    ///
    /// Finding fewer nodes than missing is reported, not fatal.
    pub fn additional_etcd_members(&self, excluded: &BTreeSet<NodeId>) -> EtcdScaleUp {
        let current = self.count_role(Role::Etcd);
        let wanted = self.desired_etcd_size();
        let mut plan = EtcdScaleUp {
            current,
            wanted,
            members: Vec::new(),
        };
        let missing = plan.missing();
        self.reporter.debug(format_args!(
            "etcd members: current {current}, wanted {wanted}, {missing} missing"
        ));
        if missing == 0 {
            return plan;
        }

        plan.members = self.select_etcd_candidates(missing, excluded);
        if plan.shortfall() > 0 {
            self.reporter.error(format_args!(
                "cannot satisfy the {missing} etcd members missing: only found {}",
                join_ids(&plan.members)
            ));
        }
        plan
    }
}
