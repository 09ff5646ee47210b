//! Node model.
//!
//! Defines the nodes of a cluster as the inventory reports them: their
//! identity, the roles they carry and the lifecycle flags that tell us
//! whether some orchestration step is currently running on them.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Stable, opaque identifier of an inventory node (a machine id).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    /// Creates a node id from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A role tag a node can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    /// Member of the etcd cluster.
    Etcd,
    /// Kubernetes control plane node.
    KubeMaster,
    /// Kubernetes worker node.
    KubeMinion,
    /// The administration node. Never removed or promoted.
    Admin,
    /// The certificate authority. Never removed or promoted.
    Ca,
}

impl Role {
    /// Returns true for the fixed infrastructure roles (`admin`, `ca`).
    pub fn is_protected(&self) -> bool {
        matches!(self, Role::Admin | Role::Ca)
    }

    /// Returns true for the kubernetes roles.
    pub fn is_kube(&self) -> bool {
        matches!(self, Role::KubeMaster | Role::KubeMinion)
    }

    /// Tag used for this role in inventories and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Etcd => "etcd",
            Role::KubeMaster => "kube-master",
            Role::KubeMinion => "kube-minion",
            Role::Admin => "admin",
            Role::Ca => "ca",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "etcd" => Ok(Role::Etcd),
            "kube-master" => Ok(Role::KubeMaster),
            "kube-minion" => Ok(Role::KubeMinion),
            "admin" => Ok(Role::Admin),
            "ca" => Ok(Role::Ca),
            _ => Err(format!(
                "unknown role '{s}'. valid options: etcd, kube-master, kube-minion, admin, ca"
            )),
        }
    }
}

/// One of the roles whose membership changes when nodes come and go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoleDomain {
    Etcd,
    KubeMaster,
    KubeMinion,
}

impl RoleDomain {
    /// All domains, in the order replacements are resolved.
    pub const ALL: [RoleDomain; 3] = [
        RoleDomain::Etcd,
        RoleDomain::KubeMaster,
        RoleDomain::KubeMinion,
    ];

    /// The role tag carried by members of this domain.
    pub fn role(&self) -> Role {
        match self {
            RoleDomain::Etcd => Role::Etcd,
            RoleDomain::KubeMaster => Role::KubeMaster,
            RoleDomain::KubeMinion => Role::KubeMinion,
        }
    }
}

impl From<RoleDomain> for Role {
    fn from(domain: RoleDomain) -> Self {
        domain.role()
    }
}

impl std::fmt::Display for RoleDomain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.role().fmt(f)
    }
}

impl std::str::FromStr for RoleDomain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<Role>() {
            Ok(Role::Etcd) => Ok(RoleDomain::Etcd),
            Ok(Role::KubeMaster) => Ok(RoleDomain::KubeMaster),
            Ok(Role::KubeMinion) => Ok(RoleDomain::KubeMinion),
            _ => Err(format!(
                "unknown role domain '{s}'. valid options: etcd, kube-master, kube-minion"
            )),
        }
    }
}

/// A single lifecycle flag, used when querying the inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Flag {
    BootstrapComplete,
    BootstrapInProgress,
    UpdateInProgress,
    RemovalInProgress,
    AdditionInProgress,
}

impl Flag {
    /// Flags marking an orchestration step that is still running.
    pub const TRANSITIONS: [Flag; 4] = [
        Flag::BootstrapInProgress,
        Flag::UpdateInProgress,
        Flag::RemovalInProgress,
        Flag::AdditionInProgress,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Flag::BootstrapComplete => "bootstrap_complete",
            Flag::BootstrapInProgress => "bootstrap_in_progress",
            Flag::UpdateInProgress => "update_in_progress",
            Flag::RemovalInProgress => "removal_in_progress",
            Flag::AdditionInProgress => "addition_in_progress",
        }
    }
}

impl std::fmt::Display for Flag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle flags for a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleFlags {
    /// Initial provisioning finished.
    pub bootstrap_complete: bool,
    /// Initial provisioning is running.
    pub bootstrap_in_progress: bool,
    /// An update is being applied.
    pub update_in_progress: bool,
    /// The node is being removed from the cluster.
    pub removal_in_progress: bool,
    /// The node is being added to the cluster.
    pub addition_in_progress: bool,
}

impl LifecycleFlags {
    /// Flags of a node that finished bootstrapping and is idle.
    pub fn bootstrapped() -> Self {
        Self {
            bootstrap_complete: true,
            ..Self::default()
        }
    }

    pub fn get(&self, flag: Flag) -> bool {
        match flag {
            Flag::BootstrapComplete => self.bootstrap_complete,
            Flag::BootstrapInProgress => self.bootstrap_in_progress,
            Flag::UpdateInProgress => self.update_in_progress,
            Flag::RemovalInProgress => self.removal_in_progress,
            Flag::AdditionInProgress => self.addition_in_progress,
        }
    }

    pub fn set(&mut self, flag: Flag, value: bool) {
        let slot = match flag {
            Flag::BootstrapComplete => &mut self.bootstrap_complete,
            Flag::BootstrapInProgress => &mut self.bootstrap_in_progress,
            Flag::UpdateInProgress => &mut self.update_in_progress,
            Flag::RemovalInProgress => &mut self.removal_in_progress,
            Flag::AdditionInProgress => &mut self.addition_in_progress,
        };
        *slot = value;
    }

    /// Returns true if any orchestration step is running on the node.
    pub fn in_transition(&self) -> bool {
        Flag::TRANSITIONS.iter().any(|f| self.get(*f))
    }
}

impl std::fmt::Display for LifecycleFlags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let flags: Vec<&str> = [Flag::BootstrapComplete]
            .iter()
            .chain(Flag::TRANSITIONS.iter())
            .filter(|flag| self.get(**flag))
            .map(|flag| flag.as_str())
            .collect();
        if flags.is_empty() {
            write!(f, "-")
        } else {
            write!(f, "{}", flags.join(","))
        }
    }
}

/// A node as reported by the inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Stable machine id.
    pub id: NodeId,
    /// Host name, used when building endpoints. Defaults to the id.
    #[serde(default)]
    pub name: String,
    /// Role tags assigned to the node.
    #[serde(default)]
    pub roles: BTreeSet<Role>,
    /// Lifecycle flags.
    #[serde(default)]
    pub flags: LifecycleFlags,
}

impl Node {
    /// Creates a node with no roles and no flags, named after its id.
    pub fn new(id: impl Into<NodeId>) -> Self {
        let id = id.into();
        Self {
            name: id.0.clone(),
            id,
            roles: BTreeSet::new(),
            flags: LifecycleFlags::default(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.roles.insert(role);
        self
    }

    pub fn with_roles(mut self, roles: impl IntoIterator<Item = Role>) -> Self {
        self.roles.extend(roles);
        self
    }

    pub fn with_flag(mut self, flag: Flag) -> Self {
        self.flags.set(flag, true);
        self
    }

    /// Shorthand for `with_flag(Flag::BootstrapComplete)`.
    pub fn bootstrapped(self) -> Self {
        self.with_flag(Flag::BootstrapComplete)
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// Returns true if the node is the admin node or the CA.
    pub fn is_protected(&self) -> bool {
        self.roles.iter().any(Role::is_protected)
    }

    /// Returns true if the node has completed its initial provisioning.
    pub fn is_bootstrapped(&self) -> bool {
        self.flags.bootstrap_complete
    }
}
