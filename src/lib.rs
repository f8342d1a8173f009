// Public API for integration tests and potential library usage

pub mod api;
pub mod config;
pub mod error;
pub mod jira;
pub mod service;
pub mod state;
pub mod types;
