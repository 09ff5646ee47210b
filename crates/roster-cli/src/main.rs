//! roster: command-line driver for the roster membership policy.
//!
//! Loads an inventory snapshot and the policy configuration, runs a single
//! decision and prints it, either colorized for a terminal or as JSON for
//! the orchestration layer. Aborted decisions exit with a failure status
//! and the abort reason on stderr.

mod commands;
mod format;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use roster_policy::{PolicyConfig, Snapshot};

use crate::commands::Command;

#[derive(Parser)]
#[command(name = "roster", version, about = "etcd and kubernetes membership policy")]
struct Args {
    /// path to TOML configuration file
    #[arg(short = 'c', long, env = "ROSTER_CONFIG")]
    config: Option<PathBuf>,

    /// print default configuration as TOML and exit
    #[arg(long)]
    config_template: bool,

    /// path to the JSON inventory snapshot
    #[arg(short = 'i', long, env = "ROSTER_INVENTORY")]
    inventory: Option<PathBuf>,

    /// explicit etcd member count, overriding the config file
    #[arg(long, env = "ROSTER_ETCD_MEMBERS")]
    etcd_members: Option<usize>,

    /// print results as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

/// Prints `msg` in red to stderr and exits with code 1.
fn exit_err(msg: impl std::fmt::Display) -> ! {
    eprintln!("{}", msg.to_string().red());
    std::process::exit(1);
}

/// Applies command-line and environment overrides on top of the file config.
fn apply_args(cfg: &mut PolicyConfig, args: &Args) {
    if let Some(n) = args.etcd_members {
        cfg.etcd.masters = Some(n);
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "roster=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    // --config-template: dump defaults and exit
    if args.config_template {
        return match PolicyConfig::default().to_toml() {
            Ok(toml) => {
                println!("{toml}");
                ExitCode::SUCCESS
            }
            Err(e) => exit_err(format!("failed to generate config template: {e}")),
        };
    }

    let Some(command) = &args.command else {
        exit_err("no command given, see --help");
    };

    // defaults → TOML file → CLI/env overrides
    let mut cfg = match &args.config {
        Some(path) => PolicyConfig::from_file(path).unwrap_or_else(|e| exit_err(e)),
        None => PolicyConfig::default(),
    };
    apply_args(&mut cfg, &args);
    if let Err(e) = cfg.validate() {
        exit_err(e);
    }

    // member-id parses etcdctl output and needs no inventory
    let snapshot = if command.needs_inventory() {
        let Some(path) = &args.inventory else {
            exit_err("no inventory given, use -i or ROSTER_INVENTORY");
        };
        let snapshot = Snapshot::from_file(path).unwrap_or_else(|e| exit_err(e));
        tracing::debug!(nodes = snapshot.len(), path = %path.display(), "loaded inventory");
        snapshot
    } else {
        Snapshot::default()
    };

    commands::run(command, &snapshot, &cfg, args.json)
}
