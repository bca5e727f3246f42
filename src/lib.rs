//! Hive Mock Coordination API Library
//!
//! A stand-in coordination backend for agents that claim tasks across
//! repositories. Provides the task catalog, lease-based claim registry,
//! lifecycle rules, activity logging and the HTTP surface over them.

pub mod api;
pub mod config;
pub mod coordination;
pub mod domain;
pub mod infrastructure;
