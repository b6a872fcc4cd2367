//! Devpilot: task-driven code delivery.
//!
//! This crate turns a natural-language task into code changes on a project.
//! A text generator proposes an implementation, the proposed files are
//! extracted from its reply, and the result is delivered as a branch, a
//! single commit, and a pull request on the project's hosting service, or
//! merged straight into a local project's file table.
//!
//! # Architecture
//!
//! Devpilot follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (hosting APIs, model
//!   endpoints, in-memory stores)
//!
//! # Modules
//!
//! - [`change_set`]: Extraction of file edits from generated text
//! - [`vcs`]: Branch, commit, and pull-request delivery on a hosting service
//! - [`task`]: Task runs, pull-request review, and project analysis
//! - [`config`]: Layered runtime settings
//! - [`telemetry`]: Tracing subscriber setup

pub mod change_set;
pub mod config;
pub mod task;
pub mod telemetry;
pub mod vcs;
