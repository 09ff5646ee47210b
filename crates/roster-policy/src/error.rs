//! Error types for membership decisions.

use crate::node::{NodeId, RoleDomain};

/// Why a candidate was refused as the replacement for some role domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conflict {
    /// The candidate has already bootstrapped with the domain's role.
    AlreadyMember(RoleDomain),
    /// A kube-master cannot also be a kube-minion.
    IsKubeMaster,
    /// A kube-minion cannot also be a kube-master.
    IsKubeMinion,
    /// The candidate was granted kube-master earlier in the same resolution.
    ScheduledKubeMaster,
}

impl std::fmt::Display for Conflict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Conflict::AlreadyMember(domain) => write!(f, "it is already running as {domain}"),
            Conflict::IsKubeMaster => write!(f, "it is already a kube-master"),
            Conflict::IsKubeMinion => write!(f, "it is a kube-minion"),
            Conflict::ScheduledKubeMaster => {
                write!(f, "it is already scheduled for being a new kube-master")
            }
        }
    }
}

/// A decision that must not go ahead.
///
/// Every variant names the offending node (see [`Abort::node`]) so callers
/// can tell the abort paths apart without parsing messages.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Abort {
    /// The node is not part of the inventory snapshot.
    #[error("node {0} not found in inventory")]
    UnknownNode(NodeId),

    /// The admin node and the CA are never removed.
    #[error("{0} cannot be removed: it has a \"ca\" or \"admin\" role")]
    ProtectedTarget(NodeId),

    /// The admin node and the CA never take over another node's roles.
    #[error("{target} cannot be replaced by {replacement}: the replacement has a \"ca\" or \"admin\" role")]
    ProtectedReplacement {
        target: NodeId,
        replacement: NodeId,
    },

    /// A user-provided replacement failed validation for some domain.
    #[error("the replacement {replacement} provided for {target} cannot be used as {domain}: {conflict}")]
    RejectedReplacement {
        target: NodeId,
        replacement: NodeId,
        domain: RoleDomain,
        conflict: Conflict,
    },

    /// Removing the target would leave the domain under its minimum.
    #[error("cannot remove {domain} member {target}: too few {domain} members, and no replacement found or provided")]
    TooFewMembers { domain: RoleDomain, target: NodeId },

    /// Removing the target would leave an even number of etcd members.
    #[error("cannot remove etcd member {target}: too few etcd members to keep an odd-sized cluster ({remaining} would remain), and no replacement found or provided")]
    EvenEtcdSize { target: NodeId, remaining: usize },

    /// A replacement was settled on but gained no role.
    #[error("{target} cannot be replaced by {replacement}: the replacement would not get any new role")]
    NoRoleGranted {
        target: NodeId,
        replacement: NodeId,
    },
}

impl Abort {
    /// Returns the node that caused the abort.
    pub fn node(&self) -> &NodeId {
        match self {
            Abort::UnknownNode(id) | Abort::ProtectedTarget(id) => id,
            Abort::ProtectedReplacement { replacement, .. }
            | Abort::RejectedReplacement { replacement, .. }
            | Abort::NoRoleGranted { replacement, .. } => replacement,
            Abort::TooFewMembers { target, .. } | Abort::EvenEtcdSize { target, .. } => target,
        }
    }

    /// Returns the role domain the abort is about, if any.
    pub fn domain(&self) -> Option<RoleDomain> {
        match self {
            Abort::RejectedReplacement { domain, .. } | Abort::TooFewMembers { domain, .. } => {
                Some(*domain)
            }
            Abort::EvenEtcdSize { .. } => Some(RoleDomain::Etcd),
            _ => None,
        }
    }
}

/// Errors building etcd client endpoints.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EndpointError {
    /// No etcd-tagged node is left after exclusions.
    #[error("no etcd members available")]
    NoServers,
}

/// Errors loading an inventory snapshot.
#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    #[error("failed to read inventory: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse inventory: {0}")]
    Parse(#[from] serde_json::Error),

    /// Two nodes share the same id.
    #[error("duplicate node id {0} in inventory")]
    DuplicateNode(NodeId),
}

/// Errors loading or validating the policy configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abort_names_offending_node() {
        let target = NodeId::from("t");
        let replacement = NodeId::from("r");

        assert_eq!(Abort::ProtectedTarget(target.clone()).node(), &target);
        assert_eq!(
            Abort::ProtectedReplacement {
                target: target.clone(),
                replacement: replacement.clone(),
            }
            .node(),
            &replacement
        );
        assert_eq!(
            Abort::TooFewMembers {
                domain: RoleDomain::KubeMaster,
                target: target.clone(),
            }
            .node(),
            &target
        );
    }

    #[test]
    fn too_few_members_message() {
        let abort = Abort::TooFewMembers {
            domain: RoleDomain::Etcd,
            target: NodeId::from("e1"),
        };
        assert!(abort.to_string().contains("too few etcd members"));
        assert_eq!(abort.domain(), Some(RoleDomain::Etcd));
    }

    #[test]
    fn rejected_replacement_message() {
        let abort = Abort::RejectedReplacement {
            target: NodeId::from("m1"),
            replacement: NodeId::from("w1"),
            domain: RoleDomain::KubeMaster,
            conflict: Conflict::IsKubeMinion,
        };
        assert_eq!(
            abort.to_string(),
            "the replacement w1 provided for m1 cannot be used as kube-master: it is a kube-minion"
        );
    }
}
