//! etcd client endpoints.
//!
//! Helpers for talking to the etcd cluster described by the inventory:
//! the endpoint list handed to clients, the `etcdctl` argument list, and
//! extracting a member id from `etcdctl member list` output.

use crate::config::{EtcdConfig, ETCD_CLIENT_PORT};
use crate::error::EndpointError;
use crate::node::{Flag, Role};
use crate::query::Query;
use crate::snapshot::Inventory;

/// How to render the endpoint list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointOptions {
    /// Prefix every endpoint with `<node id>=`, as etcd's
    /// `--initial-cluster` expects.
    pub with_id: bool,
    /// Leave out the node with this name (usually the local node).
    pub skip_name: Option<String>,
    /// Leave out nodes being removed.
    pub skip_removed: bool,
    pub scheme: String,
    pub port: u16,
    pub separator: String,
}

impl Default for EndpointOptions {
    fn default() -> Self {
        Self {
            with_id: false,
            skip_name: None,
            skip_removed: false,
            scheme: "https".into(),
            port: ETCD_CLIENT_PORT,
            separator: ",".into(),
        }
    }
}

impl EndpointOptions {
    /// Options taking scheme and port from the etcd configuration.
    pub fn from_config(cfg: &EtcdConfig) -> Self {
        Self {
            scheme: cfg.scheme.clone(),
            port: cfg.client_port,
            ..Self::default()
        }
    }
}

/// Renders the endpoints of every etcd member.
pub fn etcd_endpoints(
    inventory: &dyn Inventory,
    opts: &EndpointOptions,
) -> Result<String, EndpointError> {
    let mut query = Query::new().role(Role::Etcd);
    if opts.skip_removed {
        query = query.lacks_flag(Flag::RemovalInProgress);
    }

    let endpoints: Vec<String> = inventory
        .query(&query)
        .iter()
        .filter_map(|id| inventory.node(id))
        .filter(|node| opts.skip_name.as_deref() != Some(node.name.as_str()))
        .map(|node| {
            let url = member_url(&opts.scheme, &node.name, opts.port);
            if opts.with_id {
                format!("{}={url}", node.id)
            } else {
                url
            }
        })
        .collect();

    if endpoints.is_empty() {
        return Err(EndpointError::NoServers);
    }
    Ok(endpoints.join(&opts.separator))
}

/// URL of a single member.
pub fn member_url(scheme: &str, host: &str, port: u16) -> String {
    format!("{scheme}://{host}:{port}")
}

/// Arguments for `etcdctl`: TLS credentials followed by `--endpoints`.
pub fn etcdctl_args(
    inventory: &dyn Inventory,
    cfg: &EtcdConfig,
    skip_name: Option<&str>,
) -> Result<Vec<String>, EndpointError> {
    let opts = EndpointOptions {
        skip_name: skip_name.map(str::to_string),
        ..EndpointOptions::from_config(cfg)
    };
    let endpoints = etcd_endpoints(inventory, &opts)?;
    Ok(vec![
        "--ca-file".into(),
        cfg.tls.ca_file.clone(),
        "--key-file".into(),
        cfg.tls.key_file.clone(),
        "--cert-file".into(),
        cfg.tls.cert_file.clone(),
        "--endpoints".into(),
        endpoints,
    ])
}

/// Finds the member id advertising `url` in `etcdctl member list` output.
///
/// Lines look like `8e9e05c52164694d: name=node1 peerURLs=... clientURLs=https://node1:2379`.
pub fn member_id_from_list(output: &str, url: &str) -> Option<String> {
    output
        .lines()
        .filter(|line| line.contains(url))
        .find_map(|line| line.split(':').next())
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
}
