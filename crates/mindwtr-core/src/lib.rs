//! Shared configuration, error and vocabulary types for the Mindwtr
//! recurrence workspace.

pub mod config;
pub mod error;
pub mod types;
