// Task domain module
// Contains the task entity, its value objects, and lifecycle events

#![allow(clippy::module_inception)]

pub mod events;
pub mod task;
pub mod value_objects;

pub use events::LifecycleEvent;
pub use task::Task;
pub use value_objects::{AgentId, Dependency, TaskKey, TaskState, TaskStatus};
