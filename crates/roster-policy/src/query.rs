//! Typed inventory queries.
//!
//! A [`Query`] is a conjunction of [`Term`]s. The engine only ever asks
//! the inventory for conjunctions, so an inventory backend can index on
//! roles and flags without having to evaluate arbitrary boolean trees.

use std::collections::BTreeSet;
use std::fmt;

use crate::node::{Flag, Node, NodeId, Role};

/// A single predicate over a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    /// Node carries the role.
    HasRole(Role),
    /// Node carries at least one of the roles.
    HasAnyRole(BTreeSet<Role>),
    /// Node's flag equals `set`.
    Flag { flag: Flag, set: bool },
    /// Node id is not in the set.
    NotIn(BTreeSet<NodeId>),
    /// Negation of the inner term.
    Not(Box<Term>),
}

impl Term {
    pub fn matches(&self, node: &Node) -> bool {
        match self {
            Term::HasRole(role) => node.has_role(*role),
            Term::HasAnyRole(roles) => roles.iter().any(|r| node.has_role(*r)),
            Term::Flag { flag, set } => node.flags.get(*flag) == *set,
            Term::NotIn(ids) => !ids.contains(&node.id),
            Term::Not(inner) => !inner.matches(node),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::HasRole(role) => write!(f, "roles:{role}"),
            Term::HasAnyRole(roles) => {
                let names: Vec<&str> = roles.iter().map(Role::as_str).collect();
                write!(f, "roles:({})", names.join("|"))
            }
            Term::Flag { flag, set: true } => write!(f, "{flag}"),
            Term::Flag { flag, set: false } => write!(f, "not {flag}"),
            Term::NotIn(ids) => {
                let ids: Vec<&str> = ids.iter().map(NodeId::as_str).collect();
                write!(f, "not id in [{}]", ids.join(","))
            }
            Term::Not(inner) => write!(f, "not {inner}"),
        }
    }
}

/// A conjunction of terms. The empty query matches every node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    terms: Vec<Term>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn term(mut self, term: Term) -> Self {
        self.terms.push(term);
        self
    }

    pub fn role(self, role: Role) -> Self {
        self.term(Term::HasRole(role))
    }

    pub fn any_role(self, roles: impl IntoIterator<Item = Role>) -> Self {
        self.term(Term::HasAnyRole(roles.into_iter().collect()))
    }

    pub fn lacks_role(self, role: Role) -> Self {
        self.term(Term::Not(Box::new(Term::HasRole(role))))
    }

    pub fn lacks_any_role(self, roles: impl IntoIterator<Item = Role>) -> Self {
        self.term(Term::Not(Box::new(Term::HasAnyRole(
            roles.into_iter().collect(),
        ))))
    }

    pub fn flag(self, flag: Flag) -> Self {
        self.term(Term::Flag { flag, set: true })
    }

    pub fn lacks_flag(self, flag: Flag) -> Self {
        self.term(Term::Flag { flag, set: false })
    }

    /// Excludes the given ids. An empty set adds no term.
    pub fn excluding<'a>(self, ids: impl IntoIterator<Item = &'a NodeId>) -> Self {
        let ids: BTreeSet<NodeId> = ids.into_iter().cloned().collect();
        if ids.is_empty() {
            self
        } else {
            self.term(Term::NotIn(ids))
        }
    }

    /// Appends every term of `other`.
    pub fn and(mut self, other: Query) -> Self {
        self.terms.extend(other.terms);
        self
    }

    pub fn matches(&self, node: &Node) -> bool {
        self.terms.iter().all(|t| t.matches(node))
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.terms.is_empty() {
            return write!(f, "*");
        }
        for (i, term) in self.terms.iter().enumerate() {
            if i > 0 {
                write!(f, " and ")?;
            }
            write!(f, "{term}")?;
        }
        Ok(())
    }
}
