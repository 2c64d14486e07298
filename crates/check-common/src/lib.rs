//! Shared building blocks for the environment health-check suite.
//!
//! This crate holds the pieces every check needs but no check owns:
//! reading expectations from the process environment, comparing version
//! strings against optional bounds, and aggregating labeled sub-check
//! results within one logical check.

/// Module for reading required/optional settings from the environment
pub mod config;

/// Module for labeled sub-check aggregation
pub mod report;

/// Module for version parsing and bound comparison
pub mod version;
