//! cashbook: a personal cash expense ledger.
//!
//! The core is pure and synchronous: `summary::summarize` aggregates a snapshot of expenses over a
//! `calendar::DateRange`, `export::to_csv` renders the same snapshot as CSV and `history` filters
//! and groups it by day. Around that sit the JSON record store, the config file and the command
//! handlers used by the `cashbook` binary.

pub mod args;
pub mod calendar;
pub mod commands;
mod config;
mod error;
pub mod export;
pub mod history;
pub mod model;
pub mod money;
mod store;
pub mod summary;
mod utils;

#[cfg(test)]
mod test;

pub use config::Config;
pub use error::Error;
pub use error::Result;
