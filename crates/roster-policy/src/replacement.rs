//! Replacement resolution.
//!
//! When a node is removed, every role domain it belonged to either gets a
//! replacement node or shrinks by one. The domains are handled in a fixed
//! order (etcd, kube-master, kube-minion) and a replacement accepted for
//! one domain is offered to the next ones, so a removed etcd+master node
//! is normally replaced by a single node taking both roles.
//!
//! A replacement given by the user is never silently swapped for another
//! one: if it does not fit a domain, the whole removal is aborted. A
//! replacement the engine found on its own is simply dropped for that
//! domain, not for the whole removal: it keeps the roles earlier domains
//! granted it and is only forgotten when it has not been granted anything
//! yet.
//!
//! A candidate is only refused for a domain it already belongs to once it
//! has bootstrapped. Roles can be assigned ahead of time, so a fresh node
//! already tagged with the role is still a valid replacement.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::engine::PolicyEngine;
use crate::error::{Abort, Conflict};
use crate::node::{Node, NodeId, Role, RoleDomain};

/// A request to remove `target`, optionally naming its replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplacementRequest {
    pub target: NodeId,
    pub replacement: Option<NodeId>,
    /// Nodes that must not be picked as replacement.
    pub excluded: BTreeSet<NodeId>,
}

impl ReplacementRequest {
    pub fn new(target: impl Into<NodeId>) -> Self {
        Self {
            target: target.into(),
            replacement: None,
            excluded: BTreeSet::new(),
        }
    }

    pub fn with_replacement(mut self, replacement: impl Into<NodeId>) -> Self {
        self.replacement = Some(replacement.into());
        self
    }

    pub fn excluding(mut self, ids: impl IntoIterator<Item = NodeId>) -> Self {
        self.excluded.extend(ids);
        self
    }
}

/// The outcome of a removal that may go ahead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Replacement {
    pub target: NodeId,
    /// Node taking over some of the target's roles, if any.
    pub replacement: Option<NodeId>,
    /// Roles newly granted to the replacement, in resolution order.
    pub roles: Vec<RoleDomain>,
    /// Domains that lose a member with nobody taking its place.
    pub reduced: Vec<RoleDomain>,
}

impl Replacement {
    /// True when the target is removed and nobody is promoted.
    pub fn is_plain_removal(&self) -> bool {
        self.replacement.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    User,
    Discovered,
}

#[derive(Debug, Clone)]
struct Candidate {
    id: NodeId,
    source: Source,
}

/// State carried from one domain pass to the next.
struct Resolution<'n> {
    target: &'n Node,
    candidate: Option<Candidate>,
    roles: Vec<RoleDomain>,
    reduced: Vec<RoleDomain>,
}

impl PolicyEngine<'_> {
    /// Decides who replaces `request.target` in each of its role domains.
    pub fn resolve_replacement(&self, request: &ReplacementRequest) -> Result<Replacement, Abort> {
        let target = self.require(&request.target)?;
        if target.is_protected() {
            return Err(self.abort(Abort::ProtectedTarget(target.id.clone())));
        }

        let candidate = match &request.replacement {
            Some(id) => {
                let node = self.require(id)?;
                if node.is_protected() {
                    return Err(self.abort(Abort::ProtectedReplacement {
                        target: target.id.clone(),
                        replacement: node.id.clone(),
                    }));
                }
                Some(Candidate {
                    id: node.id.clone(),
                    source: Source::User,
                })
            }
            None => None,
        };

        // the target and the user's exclusions are never candidates
        let mut excluded = request.excluded.clone();
        excluded.insert(target.id.clone());

        let mut state = Resolution {
            target,
            candidate,
            roles: Vec::new(),
            reduced: Vec::new(),
        };
        for domain in RoleDomain::ALL {
            if target.has_role(domain.role()) {
                self.resolve_domain(domain, &mut state, &excluded)?;
            }
        }

        if let Some(candidate) = &state.candidate {
            if state.roles.is_empty() {
                return Err(self.abort(Abort::NoRoleGranted {
                    target: target.id.clone(),
                    replacement: candidate.id.clone(),
                }));
            }
        }

        Ok(Replacement {
            target: target.id.clone(),
            replacement: state.candidate.map(|c| c.id),
            roles: state.roles,
            reduced: state.reduced,
        })
    }

    fn resolve_domain(
        &self,
        domain: RoleDomain,
        state: &mut Resolution<'_>,
        excluded: &BTreeSet<NodeId>,
    ) -> Result<(), Abort> {
        let node: &Node = state.target;
        let target = &node.id;

        if state.candidate.is_none() && self.discovers(domain) {
            state.candidate = self
                .select_candidates(domain, 1, excluded)
                .into_iter()
                .next()
                .map(|id| Candidate {
                    id,
                    source: Source::Discovered,
                });
        }

        let accepted = match state.candidate.clone() {
            Some(candidate) => match self.conflict(domain, &candidate.id, &state.roles) {
                None => Some(candidate),
                Some(conflict) if candidate.source == Source::User => {
                    return Err(self.abort(Abort::RejectedReplacement {
                        target: target.clone(),
                        replacement: candidate.id,
                        domain,
                        conflict,
                    }));
                }
                Some(conflict) => {
                    self.reporter.warn(format_args!(
                        "will not replace the {domain} {target} with {}: {conflict}",
                        candidate.id
                    ));
                    if state.roles.is_empty() {
                        state.candidate = None;
                    }
                    None
                }
            },
            None => None,
        };

        match accepted {
            Some(candidate) => {
                self.reporter.debug(format_args!(
                    "setting {} as the replacement for the {domain} {target}",
                    candidate.id
                ));
                state.roles.push(domain);
            }
            None => {
                self.check_reduction(domain, target)?;
                state.reduced.push(domain);
            }
        }
        Ok(())
    }

    /// Whether the engine looks for a replacement in `domain` by itself.
    fn discovers(&self, domain: RoleDomain) -> bool {
        match domain {
            RoleDomain::Etcd => true,
            RoleDomain::KubeMaster | RoleDomain::KubeMinion => self.config.kube.discover_replacements,
        }
    }

    /// Why `candidate` cannot join `domain`, if it cannot.
    fn conflict(
        &self,
        domain: RoleDomain,
        candidate: &NodeId,
        granted: &[RoleDomain],
    ) -> Option<Conflict> {
        let node = self.inventory.node(candidate)?;
        if node.has_role(domain.role()) && node.is_bootstrapped() {
            return Some(Conflict::AlreadyMember(domain));
        }
        match domain {
            RoleDomain::Etcd => None,
            RoleDomain::KubeMaster if node.has_role(Role::KubeMinion) => {
                Some(Conflict::IsKubeMinion)
            }
            RoleDomain::KubeMaster => None,
            RoleDomain::KubeMinion if node.has_role(Role::KubeMaster) => {
                Some(Conflict::IsKubeMaster)
            }
            RoleDomain::KubeMinion if granted.contains(&RoleDomain::KubeMaster) => {
                Some(Conflict::ScheduledKubeMaster)
            }
            RoleDomain::KubeMinion => None,
        }
    }

    /// Checks that `domain` can lose `target` with nobody taking its place.
    fn check_reduction(&self, domain: RoleDomain, target: &NodeId) -> Result<(), Abort> {
        let remaining = self.count_role(domain.role()).saturating_sub(1);
        if remaining < self.config.min_after_removal(domain) {
            return Err(self.abort(Abort::TooFewMembers {
                domain,
                target: target.clone(),
            }));
        }
        if domain == RoleDomain::Etcd && self.config.etcd.enforce_odd_size && remaining % 2 == 0 {
            return Err(self.abort(Abort::EvenEtcdSize {
                target: target.clone(),
                remaining,
            }));
        }
        self.reporter.warn(format_args!(
            "number of {domain} members will be reduced to {remaining}, as no replacement for {target} has been found (or provided)"
        ));
        Ok(())
    }
}
