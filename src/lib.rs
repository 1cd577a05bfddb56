//! # commit-buddy
//!
//! An AI-powered git commit assistant.
//!
//! commit-buddy reads your staged (or unstaged) changes, sends a summary of
//! them to a local or remote LLM backend, and proposes a conventional commit
//! message that you can accept, regenerate, or reject.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod backend;
pub mod cli;
pub mod config;
pub mod git;
pub mod message;

pub use crate::cli::Cli;

/// The current version of commit-buddy.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
