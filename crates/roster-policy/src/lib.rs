//! roster-policy: etcd and kubernetes role membership decisions.
//!
//! This crate decides how the control plane of a cluster should change
//! when nodes come and go. It never touches a node itself: every
//! operation reads an inventory snapshot and returns a decision for the
//! orchestrator to carry out.
//!
//! # Operations
//!
//! - **Sizing**: how many etcd members the cluster should run
//! - **Candidate selection**: which nodes to promote, best first
//! - **Scale-up**: which nodes should join etcd to reach the desired size
//! - **Replacement**: who takes over the roles of a node being removed,
//!   and whether the removal is safe at all
//! - **Affected set**: which nodes need reconfiguring after a change
//!
//! # Quick Start
//!
//! ```rust
//! use roster_policy::{
//!     MemoryReporter, Node, PolicyConfig, PolicyEngine, ReplacementRequest, Role, RoleDomain,
//!     Snapshot,
//! };
//!
//! let snapshot = Snapshot::new([
//!     Node::new("a").with_roles([Role::Etcd, Role::KubeMaster]).bootstrapped(),
//!     Node::new("b").with_roles([Role::Etcd, Role::KubeMaster]).bootstrapped(),
//!     Node::new("c").with_role(Role::Etcd).bootstrapped(),
//!     Node::new("d").with_role(Role::KubeMinion).bootstrapped(),
//!     Node::new("f"),
//! ])
//! .unwrap();
//! let config = PolicyConfig::default();
//! let reporter = MemoryReporter::new();
//! let engine = PolicyEngine::new(&snapshot, &config, &reporter);
//!
//! let decision = engine.resolve_replacement(&ReplacementRequest::new("a")).unwrap();
//! assert_eq!(decision.replacement, Some("f".into()));
//! assert_eq!(decision.roles, vec![RoleDomain::Etcd, RoleDomain::KubeMaster]);
//! ```

mod affected;
mod candidates;
mod config;
mod endpoints;
mod engine;
mod error;
mod membership;
mod node;
mod query;
mod replacement;
mod report;
mod sizing;
mod snapshot;

pub use affected::AffectedSet;
pub use candidates::{base_filter, tiers, Tier, TierRoles, ETCD_TIERS, KUBE_TIERS};
pub use config::{EtcdConfig, KubeConfig, PolicyConfig, TlsConfig, ETCD_CLIENT_PORT};
pub use endpoints::{
    etcd_endpoints, etcdctl_args, member_id_from_list, member_url, EndpointOptions,
};
pub use engine::PolicyEngine;
pub use error::{Abort, ConfigError, Conflict, EndpointError, InventoryError};
pub use membership::EtcdScaleUp;
pub use node::{Flag, LifecycleFlags, Node, NodeId, Role, RoleDomain};
pub use query::{Query, Term};
pub use replacement::{Replacement, ReplacementRequest};
pub use report::{Entry, MemoryReporter, Reporter, TracingReporter};
pub use sizing::{desired_etcd_size, optimal_member_count, MIN_RECOMMENDED_MEMBER_COUNT};
pub use snapshot::{Inventory, Snapshot};
