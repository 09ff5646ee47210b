//! etcd cluster sizing.
//!
//! etcd needs a majority of its members to make progress, so an even
//! member count buys no extra fault tolerance over the odd count below it
//! and opens the door to split votes. Sizes are always 1, 3, 5 or 7.

use crate::engine::PolicyEngine;
use crate::node::Role;
use crate::query::Query;
use crate::report::Reporter;

/// Fewest etcd members we recommend running.
pub const MIN_RECOMMENDED_MEMBER_COUNT: usize = 3;

/// Largest odd etcd size (up to 7) that `num_nodes` nodes can host.
pub fn optimal_member_count(num_nodes: usize) -> usize {
    match num_nodes {
        n if n >= 7 => 7,
        n if n >= 5 => 5,
        n if n >= 3 => 3,
        _ => 1,
    }
}

/// Desired number of etcd members.
///
/// An explicit `override_count` is respected even when it is below the
/// recommended minimum. Otherwise the size follows the number of
/// kube-masters, bumped to 3 when the cluster has enough kube nodes.
pub fn desired_etcd_size(
    override_count: Option<usize>,
    kube_masters: usize,
    kube_nodes: usize,
    reporter: &dyn Reporter,
) -> usize {
    let member_count = match override_count {
        Some(count) => {
            if count < MIN_RECOMMENDED_MEMBER_COUNT {
                reporter.warn(format_args!(
                    "etcd member count too low ({count}), consider increasing to {MIN_RECOMMENDED_MEMBER_COUNT}"
                ));
            }
            count
        }
        None => {
            let count = optimal_member_count(kube_masters);
            if count < MIN_RECOMMENDED_MEMBER_COUNT {
                // not enough masters: borrow from the rest of the kube
                // nodes, still keeping the result odd
                let increased = optimal_member_count(MIN_RECOMMENDED_MEMBER_COUNT.min(kube_nodes));
                reporter.warn(format_args!(
                    "etcd member count too low ({kube_masters}), increasing to {increased}"
                ));
                increased
            } else {
                count
            }
        }
    };

    let member_count = member_count.max(1);
    reporter.debug(format_args!("using etcd member count = {member_count}"));
    member_count
}

impl PolicyEngine<'_> {
    /// Desired etcd size for the inventory, honoring `etcd.masters`.
    pub fn desired_etcd_size(&self) -> usize {
        let kube_masters = self.count_role(Role::KubeMaster);
        let kube_nodes = self
            .inventory
            .count(&Query::new().any_role([Role::KubeMaster, Role::KubeMinion]));
        desired_etcd_size(
            self.config.etcd.masters,
            kube_masters,
            kube_nodes,
            self.reporter,
        )
    }
}
