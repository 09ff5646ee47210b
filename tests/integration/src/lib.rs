//! Scenario tests that drive roster-policy over whole-cluster fixtures.
//!
//! Fixtures live in `fixtures/` as inventory snapshots in the same JSON
//! format the `roster` binary reads.

#[cfg(test)]
mod helpers;
#[cfg(test)]
mod lifecycle;
#[cfg(test)]
mod scenarios;
