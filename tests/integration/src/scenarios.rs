//! The reference removal and sizing scenarios.

use roster_policy::{Abort, Conflict, ReplacementRequest, Role, RoleDomain};

use crate::helpers::{ids, TestCluster};

#[test]
fn remove_etcd_master_with_free_node() {
    let cluster = TestCluster::load("small");
    let engine = cluster.engine();

    let decision = engine
        .resolve_replacement(&ReplacementRequest::new("a"))
        .unwrap();
    assert_eq!(decision.replacement, Some("f".into()));
    assert_eq!(decision.roles, vec![RoleDomain::Etcd, RoleDomain::KubeMaster]);
    assert!(decision.reduced.is_empty());
    assert!(cluster.reporter.errors().is_empty());
}

#[test]
fn explicit_replacement_is_idempotent_with_discovery() {
    let cluster = TestCluster::load("small");
    let engine = cluster.engine();

    let discovered = engine
        .resolve_replacement(&ReplacementRequest::new("a"))
        .unwrap();
    let explicit = engine
        .resolve_replacement(&ReplacementRequest::new("a").with_replacement("f"))
        .unwrap();
    assert_eq!(explicit.roles, discovered.roles);
    assert_eq!(explicit.replacement, discovered.replacement);
}

#[test]
fn removal_from_three_members_without_candidates_aborts() {
    let cluster = TestCluster::load("quorum");
    let engine = cluster.engine();

    for target in ["a", "c"] {
        let err = engine
            .resolve_replacement(&ReplacementRequest::new(target))
            .unwrap_err();
        assert!(matches!(err, Abort::EvenEtcdSize { remaining: 2, .. }), "{err:?}");
        assert!(err.to_string().contains("too few etcd members"));
        assert_eq!(err.node().as_str(), target);
        assert_eq!(err.domain(), Some(RoleDomain::Etcd));
    }
    // every abort is reported before it is returned
    assert_eq!(cluster.reporter.errors().len(), 2);
}

#[test]
fn even_reduction_allowed_when_configured() {
    let mut config = roster_policy::PolicyConfig::default();
    config.etcd.enforce_odd_size = false;
    let cluster = TestCluster::load_with("quorum", config);

    let decision = cluster
        .engine()
        .resolve_replacement(&ReplacementRequest::new("c"))
        .unwrap();
    assert!(decision.is_plain_removal());
    assert_eq!(decision.reduced, vec![RoleDomain::Etcd]);
    assert!(cluster
        .reporter
        .warnings()
        .iter()
        .any(|w| w.contains("reduced to 2")));
}

#[test]
fn six_masters_want_five_members() {
    let cluster = TestCluster::load("masters");
    assert_eq!(cluster.engine().desired_etcd_size(), 5);
    assert!(cluster.reporter.warnings().is_empty());
}

#[test]
fn user_minion_cannot_replace_master() {
    let cluster = TestCluster::load("small");
    let err = cluster
        .engine()
        .resolve_replacement(&ReplacementRequest::new("a").with_replacement("d"))
        .unwrap_err();
    assert_eq!(
        err,
        Abort::RejectedReplacement {
            target: "a".into(),
            replacement: "d".into(),
            domain: RoleDomain::KubeMaster,
            conflict: Conflict::IsKubeMinion,
        }
    );
    assert_eq!(err.node().as_str(), "d");
}

#[test]
fn minion_removal_is_plain() {
    let cluster = TestCluster::load("small");
    let engine = cluster.engine();

    let decision = engine
        .resolve_replacement(&ReplacementRequest::new("d"))
        .unwrap();
    assert_eq!(decision.replacement, None);
    assert!(decision.roles.is_empty());
    assert_eq!(decision.reduced, vec![RoleDomain::KubeMinion]);

    let affected = engine.affected_by(&"d".into(), &Default::default());
    assert!(affected.is_empty());
    assert!(affected.query().is_none());
    assert!(affected.nodes(&cluster.snapshot).is_empty());
}

#[test]
fn removed_etcd_master_affects_both_domains() {
    let cluster = TestCluster::load("small");
    let affected = cluster.engine().affected_by(&"a".into(), &Default::default());
    assert!(affected.roles.contains(&Role::Etcd));
    assert!(affected.roles.contains(&Role::KubeMaster));
    assert_eq!(
        affected.nodes(&cluster.snapshot),
        ids(&["admin", "b", "c", "d", "e"])
    );
}
