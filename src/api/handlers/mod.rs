// HTTP handlers, one module per resource

pub mod activity;
pub mod health;
pub mod projects;
pub mod tasks;
