//! Xbitodowin - filter, browse and manage remote task lists
//!
//! This library provides the core functionality for Xbitodowin, including:
//! - Normalization of remote task records into a keyed task pool
//! - The named date filters (today, next 7 days, overdue, recently completed)
//! - Presentation rows with search, and the selection/details synchronizer
//! - A session controller serializing refreshes and mutations
//! - The task service contract, a JSON snapshot implementation and exports
//! - The SQLite-backed session feedback log and countdown timer
//! - CLI command parsing and execution
//!
//! # Example
//!
//! ```no_run
//! use xbito::cli::run;
//!
//! fn main() {
//!     if let Err(e) = run() {
//!         eprintln!("Error: {}", e);
//!         std::process::exit(1);
//!     }
//! }
//! ```

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod feedback;
pub mod filter;
pub mod models;
pub mod pool;
pub mod repo;
pub mod service;
pub mod session;
pub mod utils;
pub mod view;
