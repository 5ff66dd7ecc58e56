//! # compa-cli: Compensation Engine Command-Line Interface
//!
//! A clap-based front end over the engine crates. Every subcommand builds an
//! in-process matrix store (from a matrix file or the default table), runs
//! one operation, and prints the outcome.
//!
//! ## Subcommands
//!
//! - `calc`: Single-record salary adjustment
//! - `batch`: Process an uploaded sheet and export results
//! - `matrix`: Default table, validation, and band lookup
//! - `rating`: Convert a rating between scales
//!
//! ## Crate Policy
//!
//! - Argument parsing is separated from business logic.
//! - Handlers delegate to domain crates; no computation happens here.
//! - Handlers return an exit code; errors carry `anyhow` context.

pub mod batch;
pub mod calc;
pub mod config;
pub mod matrix;
pub mod rating;
