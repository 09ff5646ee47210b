//! Human-readable rendering of decisions.
//!
//! Node ids are green, counts yellow, anything missing or degraded red,
//! and empty results dimmed.

use colored::Colorize;
use roster_policy::{AffectedSet, EtcdScaleUp, NodeId, Replacement, RoleDomain};

/// Strips ANSI escape sequences and other control characters from
/// inventory-supplied strings before they reach the terminal.
fn sanitize(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(ch) = chars.next() {
        if ch == '\x1b' {
            // CSI sequences run until a letter; other escapes are one char
            if chars.next() == Some('[') {
                for c in chars.by_ref() {
                    if c.is_ascii_alphabetic() {
                        break;
                    }
                }
            }
        } else if !ch.is_control() {
            out.push(ch);
        }
    }
    out
}

/// Node ids joined by `sep`, or a dimmed `(none)`.
fn join_ids(ids: &[NodeId], sep: &str) -> String {
    if ids.is_empty() {
        return "(none)".dimmed().to_string();
    }
    ids.iter()
        .map(|id| sanitize(id.as_str()).green().to_string())
        .collect::<Vec<_>>()
        .join(sep)
}

/// One node id per line.
pub fn id_list(ids: &[NodeId]) -> String {
    join_ids(ids, "\n")
}

fn domains(list: &[RoleDomain]) -> String {
    list.iter()
        .map(RoleDomain::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn scale_up(plan: &EtcdScaleUp) -> String {
    let mut lines = vec![format!(
        "etcd members: {} current, {} wanted",
        plan.current.to_string().yellow(),
        plan.wanted.to_string().yellow()
    )];
    if plan.missing() == 0 {
        lines.push("nothing to add".dimmed().to_string());
        return lines.join("\n");
    }
    lines.push(format!("add: {}", join_ids(&plan.members, ", ")));
    if plan.shortfall() > 0 {
        lines.push(
            format!("{} more member(s) could not be found", plan.shortfall())
                .red()
                .to_string(),
        );
    }
    lines.join("\n")
}

pub fn replacement(decision: &Replacement) -> String {
    let mut lines = vec![format!(
        "remove: {}",
        sanitize(decision.target.as_str()).yellow()
    )];
    match &decision.replacement {
        Some(id) => lines.push(format!(
            "replacement: {} ({})",
            sanitize(id.as_str()).green(),
            domains(&decision.roles)
        )),
        None => lines.push(format!("replacement: {}", "(none)".dimmed())),
    }
    if !decision.reduced.is_empty() {
        lines.push(format!("reduced: {}", domains(&decision.reduced).red()));
    }
    lines.join("\n")
}

pub fn affected(set: &AffectedSet, nodes: &[NodeId]) -> String {
    match set.query() {
        None => format!("affected: {}", "(none)".dimmed()),
        Some(query) => format!(
            "affected: {}\n  {}",
            join_ids(nodes, ", "),
            sanitize(&query.to_string()).dimmed()
        ),
    }
}
