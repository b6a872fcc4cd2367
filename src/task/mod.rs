//! Task delivery for devpilot projects.
//!
//! A task run asks a text generator for code, extracts the proposed files,
//! and delivers them either as a pull request on the project's hosted
//! repository or as a direct merge into a local project's file table. The
//! context also reviews delivered pull requests and summarises projects.
//! The module follows hexagonal architecture:
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
