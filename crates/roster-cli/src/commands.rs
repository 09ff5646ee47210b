//! Subcommands and their execution.
//!
//! Each subcommand runs exactly one decision against one snapshot and
//! prints the result. Warnings and errors raised while deciding go through
//! `tracing` to stderr; stdout only carries the result.

use std::collections::BTreeSet;
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Subcommand;
use colored::Colorize;
use roster_policy::{
    etcd_endpoints, etcdctl_args, member_id_from_list, member_url, EndpointOptions, NodeId,
    PolicyConfig, PolicyEngine, ReplacementRequest, RoleDomain, Snapshot, TracingReporter,
};
use serde::Serialize;

use crate::format;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the desired number of etcd members.
    Size,

    /// List nodes that could be promoted into a role domain, best first.
    Candidates {
        /// How many candidates to look for.
        count: usize,
        /// Role domain to select for.
        #[arg(long, default_value = "etcd")]
        domain: RoleDomain,
        /// Node id that must not be selected (repeatable).
        #[arg(long = "exclude", value_name = "ID")]
        excluded: Vec<String>,
    },

    /// List the nodes that should join etcd to reach the desired size.
    ScaleUp {
        /// Node id that must not be selected (repeatable).
        #[arg(long = "exclude", value_name = "ID")]
        excluded: Vec<String>,
    },

    /// Decide who replaces a node being removed.
    Replace {
        /// Node being removed.
        target: String,
        /// Node that should take over the target's roles.
        #[arg(long)]
        replacement: Option<String>,
        /// Node id that must not be selected (repeatable).
        #[arg(long = "exclude", value_name = "ID")]
        excluded: Vec<String>,
    },

    /// List the nodes to reconfigure after a node joins or leaves.
    Affected {
        /// Node joining or leaving.
        target: String,
        /// Node id that must not be included (repeatable).
        #[arg(long = "exclude", value_name = "ID")]
        excluded: Vec<String>,
    },

    /// Print the client endpoints of the etcd members.
    Endpoints {
        /// Prefix each endpoint with `<id>=`.
        #[arg(long)]
        with_id: bool,
        /// Leave out the node with this name.
        #[arg(long, value_name = "NAME")]
        skip_name: Option<String>,
        /// Leave out nodes being removed.
        #[arg(long)]
        skip_removed: bool,
        /// Separator between endpoints.
        #[arg(long = "sep", default_value = ",")]
        separator: String,
    },

    /// Print the arguments `etcdctl` needs to reach the cluster.
    EtcdctlArgs {
        /// Leave out the node with this name.
        #[arg(long, value_name = "NAME")]
        skip_name: Option<String>,
    },

    /// Find a member id in `etcdctl member list` output.
    MemberId {
        /// Name of the member's host.
        name: String,
        /// File holding the output; stdin when omitted.
        #[arg(long, value_name = "FILE")]
        list: Option<PathBuf>,
    },
}

impl Command {
    pub fn needs_inventory(&self) -> bool {
        !matches!(self, Command::MemberId { .. })
    }
}

fn id_set(ids: &[String]) -> BTreeSet<NodeId> {
    ids.iter().map(|id| NodeId::from(id.as_str())).collect()
}

/// Prints `value` as pretty JSON, or its human rendering.
fn emit<T: Serialize>(json: bool, value: &T, human: impl FnOnce() -> String) -> ExitCode {
    if !json {
        println!("{}", human());
        return ExitCode::SUCCESS;
    }
    match serde_json::to_string_pretty(value) {
        Ok(out) => {
            println!("{out}");
            ExitCode::SUCCESS
        }
        Err(e) => fail(format!("failed to serialize result: {e}")),
    }
}

fn fail(msg: impl std::fmt::Display) -> ExitCode {
    eprintln!("{}", format!("error: {msg}").red());
    ExitCode::FAILURE
}

#[derive(Serialize)]
struct Size {
    size: usize,
}

#[derive(Serialize)]
struct Affected<'a> {
    #[serde(flatten)]
    set: &'a roster_policy::AffectedSet,
    query: Option<String>,
    nodes: Vec<NodeId>,
}

#[derive(Serialize)]
struct Replace<'a> {
    decision: &'a roster_policy::Replacement,
    affected: Affected<'a>,
}

pub fn run(command: &Command, snapshot: &Snapshot, cfg: &PolicyConfig, json: bool) -> ExitCode {
    let reporter = TracingReporter;
    let engine = PolicyEngine::new(snapshot, cfg, &reporter);

    match command {
        Command::Size => {
            let size = engine.desired_etcd_size();
            emit(json, &Size { size }, || size.to_string())
        }

        Command::Candidates {
            count,
            domain,
            excluded,
        } => {
            let selected = engine.select_candidates(*domain, *count, &id_set(excluded));
            emit(json, &selected, || format::id_list(&selected))
        }

        Command::ScaleUp { excluded } => {
            let plan = engine.additional_etcd_members(&id_set(excluded));
            emit(json, &plan, || format::scale_up(&plan))
        }

        Command::Replace {
            target,
            replacement,
            excluded,
        } => {
            let mut request = ReplacementRequest::new(target.as_str())
                .excluding(id_set(excluded));
            if let Some(r) = replacement {
                request = request.with_replacement(r.as_str());
            }
            let decision = match engine.resolve_replacement(&request) {
                Ok(decision) => decision,
                Err(abort) => return fail(format!("aborted: {abort}")),
            };

            let set = engine.affected_by(&decision.target, &request.excluded);
            let nodes = set.nodes(snapshot);
            let out = Replace {
                decision: &decision,
                affected: Affected {
                    set: &set,
                    query: set.query().map(|q| q.to_string()),
                    nodes: nodes.clone(),
                },
            };
            emit(json, &out, || {
                format!(
                    "{}\n{}",
                    format::replacement(&decision),
                    format::affected(&set, &nodes)
                )
            })
        }

        Command::Affected { target, excluded } => {
            let set = engine.affected_by(&NodeId::from(target.as_str()), &id_set(excluded));
            let nodes = set.nodes(snapshot);
            let out = Affected {
                set: &set,
                query: set.query().map(|q| q.to_string()),
                nodes: nodes.clone(),
            };
            emit(json, &out, || format::affected(&set, &nodes))
        }

        Command::Endpoints {
            with_id,
            skip_name,
            skip_removed,
            separator,
        } => {
            let opts = EndpointOptions {
                with_id: *with_id,
                skip_name: skip_name.clone(),
                skip_removed: *skip_removed,
                separator: separator.clone(),
                ..EndpointOptions::from_config(&cfg.etcd)
            };
            match etcd_endpoints(snapshot, &opts) {
                Ok(endpoints) => emit(json, &endpoints, || endpoints.clone()),
                Err(e) => fail(e),
            }
        }

        Command::EtcdctlArgs { skip_name } => {
            match etcdctl_args(snapshot, &cfg.etcd, skip_name.as_deref()) {
                Ok(args) => emit(json, &args, || args.join(" ")),
                Err(e) => fail(e),
            }
        }

        Command::MemberId { name, list } => {
            let output = match read_list(list.as_ref()) {
                Ok(output) => output,
                Err(e) => return fail(format!("failed to read member list: {e}")),
            };
            let url = member_url(&cfg.etcd.scheme, name, cfg.etcd.client_port);
            match member_id_from_list(&output, &url) {
                Some(id) => emit(json, &id, || id.clone()),
                None => fail(format!("no etcd member with client url {url}")),
            }
        }
    }
}

fn read_list(path: Option<&PathBuf>) -> std::io::Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path),
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}
