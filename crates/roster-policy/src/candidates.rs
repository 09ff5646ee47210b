//! Candidate selection.
//!
//! Picks the nodes that should be promoted into a role domain. Every
//! candidate passes a base filter (not already in the domain, not admin
//! or ca, nothing in progress on it, not excluded); within that, nodes are
//! taken tier by tier so that the least disruptive promotions come first.
//! Nodes that have not been bootstrapped yet are always preferred over
//! their bootstrapped counterparts: they can be provisioned with the new
//! role directly.

use std::collections::BTreeSet;
use std::fmt;

use crate::engine::PolicyEngine;
use crate::node::{Flag, NodeId, Role, RoleDomain};
use crate::query::Query;

/// What a tier asks of a node's current roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TierRoles {
    /// Neither kube-master nor kube-minion.
    NoKubeRole,
    /// No etcd and no kube role at all.
    NoRole,
    KubeMaster,
    KubeMinion,
    /// etcd, and no kube role.
    EtcdOnly,
}

/// One step of the candidate preference order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tier {
    pub roles: TierRoles,
    /// Only nodes that have not completed bootstrap.
    pub fresh_only: bool,
}

impl Tier {
    const fn new(roles: TierRoles, fresh_only: bool) -> Self {
        Self { roles, fresh_only }
    }

    /// Narrows the base filter down to this tier.
    pub fn refine(&self) -> Query {
        let kube = [Role::KubeMaster, Role::KubeMinion];
        let query = match self.roles {
            TierRoles::NoKubeRole => Query::new().lacks_any_role(kube),
            TierRoles::NoRole => {
                Query::new().lacks_any_role([Role::Etcd, Role::KubeMaster, Role::KubeMinion])
            }
            TierRoles::KubeMaster => Query::new().role(Role::KubeMaster),
            TierRoles::KubeMinion => Query::new().role(Role::KubeMinion),
            TierRoles::EtcdOnly => Query::new().role(Role::Etcd).lacks_any_role(kube),
        };
        if self.fresh_only {
            query.lacks_flag(Flag::BootstrapComplete)
        } else {
            query
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let roles = match self.roles {
            TierRoles::NoKubeRole => "no kube role",
            TierRoles::NoRole => "no role",
            TierRoles::KubeMaster => "kube-master",
            TierRoles::KubeMinion => "kube-minion",
            TierRoles::EtcdOnly => "etcd only",
        };
        if self.fresh_only {
            write!(f, "{roles}, not bootstrapped")
        } else {
            write!(f, "{roles}")
        }
    }
}

/// Preference order for new etcd members.
pub const ETCD_TIERS: [Tier; 6] = [
    Tier::new(TierRoles::NoKubeRole, true),
    Tier::new(TierRoles::NoKubeRole, false),
    Tier::new(TierRoles::KubeMaster, true),
    Tier::new(TierRoles::KubeMaster, false),
    Tier::new(TierRoles::KubeMinion, true),
    Tier::new(TierRoles::KubeMinion, false),
];

/// Preference order for new kube-masters and kube-minions.
pub const KUBE_TIERS: [Tier; 4] = [
    Tier::new(TierRoles::NoRole, true),
    Tier::new(TierRoles::NoRole, false),
    Tier::new(TierRoles::EtcdOnly, true),
    Tier::new(TierRoles::EtcdOnly, false),
];

/// Tiers used for `domain`, most preferred first.
pub fn tiers(domain: RoleDomain) -> &'static [Tier] {
    match domain {
        RoleDomain::Etcd => &ETCD_TIERS,
        RoleDomain::KubeMaster | RoleDomain::KubeMinion => &KUBE_TIERS,
    }
}

/// Filter every candidate for `domain` must pass, before exclusions.
pub fn base_filter(domain: RoleDomain) -> Query {
    let mut query = Query::new()
        .lacks_role(domain.role())
        .lacks_any_role([Role::Admin, Role::Ca]);
    if domain != RoleDomain::Etcd {
        // a node is either a master or a minion, never both
        query = query.lacks_any_role([Role::KubeMaster, Role::KubeMinion]);
    }
    for flag in Flag::TRANSITIONS {
        query = query.lacks_flag(flag);
    }
    query
}

impl PolicyEngine<'_> {
    /// Up to `n` nodes that could start running etcd.
    pub fn select_etcd_candidates(&self, n: usize, excluded: &BTreeSet<NodeId>) -> Vec<NodeId> {
        self.select_candidates(RoleDomain::Etcd, n, excluded)
    }

    /// Up to `n` nodes that could be promoted into `domain`.
    ///
    /// A short result is not an error: the caller decides whether the
    /// shortfall matters.
    pub fn select_candidates(
        &self,
        domain: RoleDomain,
        n: usize,
        excluded: &BTreeSet<NodeId>,
    ) -> Vec<NodeId> {
        let mut selected: Vec<NodeId> = Vec::with_capacity(n);
        if n == 0 {
            return selected;
        }

        let base = base_filter(domain).excluding(excluded);
        for tier in tiers(domain) {
            let query = base.clone().and(tier.refine());
            // later tiers are supersets of earlier ones; skip what we have
            let found: Vec<NodeId> = self
                .nodes(&query)
                .into_iter()
                .filter(|id| !selected.contains(id))
                .collect();

            if found.is_empty() {
                self.reporter
                    .debug(format_args!("no {domain} candidates with {tier}"));
                continue;
            }

            let remaining = n - selected.len();
            self.reporter.debug(format_args!(
                "{} {domain} candidates with {tier}: {}",
                found.len(),
                join_ids(&found)
            ));
            selected.extend(found.into_iter().take(remaining));

            if selected.len() >= n {
                break;
            }
        }

        if selected.len() < n {
            self.reporter.warn(format_args!(
                "looking for {n} {domain} candidates, only {} found",
                selected.len()
            ));
        }
        selected
    }
}

pub(crate) fn join_ids(ids: &[NodeId]) -> String {
    ids.iter().map(NodeId::as_str).collect::<Vec<_>>().join(",")
}
