// ABOUTME: Library root for kubeship - exposes public types for testing.
// ABOUTME: The main binary is in main.rs.

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod hooks;
pub mod output;
pub mod rollout;
pub mod tools;
pub mod types;
