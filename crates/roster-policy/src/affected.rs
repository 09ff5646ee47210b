//! Nodes affected by a membership change.
//!
//! Adding or removing a node changes configuration held by other nodes:
//! etcd peers list each other and the API servers list the etcd
//! endpoints, while the load balancers on the admin node and on every
//! minion list the masters. Those nodes must be reconfigured after the
//! change.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::engine::PolicyEngine;
use crate::node::{Flag, NodeId, Role};
use crate::query::Query;
use crate::snapshot::Inventory;

/// Roles to reconfigure after `target` joins or leaves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AffectedSet {
    pub target: NodeId,
    /// Affected roles; empty when nothing needs reconfiguring.
    pub roles: Vec<Role>,
    /// Nodes never included: the target and the caller's exclusions.
    pub excluded: BTreeSet<NodeId>,
}

impl AffectedSet {
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    /// Filter selecting the affected nodes, or `None` for a no-op.
    ///
    /// Only bootstrapped nodes with nothing in progress are selected.
    pub fn query(&self) -> Option<Query> {
        if self.roles.is_empty() {
            return None;
        }
        let mut query = Query::new().flag(Flag::BootstrapComplete);
        for flag in Flag::TRANSITIONS {
            query = query.lacks_flag(flag);
        }
        Some(
            query
                .any_role(self.roles.iter().copied())
                .excluding(&self.excluded),
        )
    }

    /// Resolves the filter against an inventory.
    pub fn nodes(&self, inventory: &dyn Inventory) -> Vec<NodeId> {
        self.query()
            .map(|q| inventory.query(&q))
            .unwrap_or_default()
    }
}

/// Roles whose configuration references members of `role`.
fn dependents(role: Role) -> &'static [Role] {
    match role {
        Role::Etcd => &[Role::Etcd, Role::KubeMaster],
        Role::KubeMaster => &[Role::Admin, Role::KubeMinion],
        // /etc/hosts keeps the old entry, nothing else refers to minions
        Role::KubeMinion | Role::Admin | Role::Ca => &[],
    }
}

impl PolicyEngine<'_> {
    /// Computes the nodes that must be reconfigured after `target` changes.
    ///
    /// An unknown target affects nobody.
    pub fn affected_by(&self, target: &NodeId, excluded: &BTreeSet<NodeId>) -> AffectedSet {
        let mut roles: Vec<Role> = Vec::new();
        if let Some(node) = self.inventory.node(target) {
            for role in &node.roles {
                for dependent in dependents(*role) {
                    if !roles.contains(dependent) {
                        roles.push(*dependent);
                    }
                }
            }
        }

        let mut all_excluded = excluded.clone();
        all_excluded.insert(target.clone());
        let affected = AffectedSet {
            target: target.clone(),
            roles,
            excluded: all_excluded,
        };
        match affected.query() {
            Some(query) => self
                .reporter
                .debug(format_args!("nodes affected by {target}: '{query}'")),
            None => self
                .reporter
                .debug(format_args!("no nodes affected by {target}")),
        }
        affected
    }
}
