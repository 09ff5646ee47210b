//! Multi-step flows: scale-up, then remove, resolve and reconfigure.

use roster_policy::{
    etcd_endpoints, etcdctl_args, EndpointOptions, PolicyConfig, ReplacementRequest, RoleDomain,
};

use crate::helpers::{id_set, ids, TestCluster};

#[test]
fn scale_up_prefers_fresh_nodes_then_masters() {
    let cluster = TestCluster::load("masters");
    let plan = cluster.engine().additional_etcd_members(&id_set(&[]));
    assert_eq!(plan.current, 3);
    assert_eq!(plan.wanted, 5);
    assert_eq!(plan.members, ids(&["n0", "m3"]));
    assert_eq!(plan.shortfall(), 0);
}

#[test]
fn scale_up_honors_exclusions() {
    let cluster = TestCluster::load("masters");
    let plan = cluster
        .engine()
        .additional_etcd_members(&id_set(&["n0", "m3"]));
    assert_eq!(plan.members, ids(&["m4", "m5"]));
}

#[test]
fn scale_up_is_a_noop_at_size() {
    let cluster = TestCluster::load("small");
    let plan = cluster.engine().additional_etcd_members(&id_set(&[]));
    assert!(plan.is_noop());
    assert_eq!(plan.missing(), 0);
}

#[test]
fn remove_resolve_and_reconfigure() {
    let cluster = TestCluster::load("masters");
    let engine = cluster.engine();

    let request = ReplacementRequest::new("m0");
    let decision = engine.resolve_replacement(&request).unwrap();
    assert_eq!(decision.replacement, Some("n0".into()));
    assert_eq!(decision.roles, vec![RoleDomain::Etcd, RoleDomain::KubeMaster]);

    // the replacement is not bootstrapped yet, so it is configured by its
    // own bootstrap rather than reconfigured
    let affected = engine.affected_by(&decision.target, &request.excluded);
    assert_eq!(
        affected.nodes(&cluster.snapshot),
        ids(&["admin", "m1", "m2", "m3", "m4", "m5", "w0", "w1", "w2", "w3"])
    );
}

#[test]
fn discovered_master_keeps_etcd_role_only() {
    let cluster = TestCluster::load("masters");
    let engine = cluster.engine();

    let decision = engine
        .resolve_replacement(&ReplacementRequest::new("m0").excluding(id_set(&["n0"])))
        .unwrap();
    // m3 is the best etcd candidate left but already runs kube-master
    assert_eq!(decision.replacement, Some("m3".into()));
    assert_eq!(decision.roles, vec![RoleDomain::Etcd]);
    assert_eq!(decision.reduced, vec![RoleDomain::KubeMaster]);
    assert!(cluster
        .reporter
        .warnings()
        .iter()
        .any(|w| w.contains("will not replace")));
}

#[test]
fn kube_discovery_finds_minion_replacement() {
    let mut config = PolicyConfig::default();
    config.kube.discover_replacements = true;
    let cluster = TestCluster::load_with("small", config);

    let decision = cluster
        .engine()
        .resolve_replacement(&ReplacementRequest::new("d"))
        .unwrap();
    assert_eq!(decision.replacement, Some("f".into()));
    assert_eq!(decision.roles, vec![RoleDomain::KubeMinion]);
    assert!(decision.reduced.is_empty());
}

#[test]
fn endpoints_use_host_names() {
    let cluster = TestCluster::load("small");
    assert_eq!(
        etcd_endpoints(&cluster.snapshot, &EndpointOptions::default()).unwrap(),
        "https://master-0:2379,https://master-1:2379,https://etcd-0:2379"
    );

    let args = etcdctl_args(&cluster.snapshot, &cluster.config.etcd, Some("etcd-0")).unwrap();
    assert_eq!(
        args.last().map(String::as_str),
        Some("https://master-0:2379,https://master-1:2379")
    );
}

#[test]
fn snapshot_survives_reserialization() {
    let cluster = TestCluster::load("quorum");
    let json = cluster.snapshot.to_json().unwrap();
    let reloaded = roster_policy::Snapshot::from_json(&json).unwrap();
    assert_eq!(
        reloaded.nodes().collect::<Vec<_>>(),
        cluster.snapshot.nodes().collect::<Vec<_>>()
    );
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["nodes"][5]["flags"]["update_in_progress"], true);
}
