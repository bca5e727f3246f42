// Infrastructure layer module
// Contains in-memory stores, activity sinks, and the seed catalog
// Follows Hexagonal Architecture

pub mod activity;
pub mod clock;
pub mod repositories;
pub mod seed;
