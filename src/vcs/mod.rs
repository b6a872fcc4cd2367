//! Repository commit delivery.
//!
//! Turns a change set into a branch, a single commit, and a pull request on
//! a hosting service, one remote step at a time:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
