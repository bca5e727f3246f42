// Activity sink adapters

pub mod jsonl_sink;
pub mod memory_sink;

pub use jsonl_sink::JsonlActivitySink;
pub use memory_sink::{InMemoryActivitySink, NoopActivitySink};
