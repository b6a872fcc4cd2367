//! Step definitions for task delivery scenarios.

pub mod given;
pub mod then;
pub mod when;
pub mod world;
