//! Command-line tooling for quorum operators.
//!
//! Lets an operator validate a config file, print its canonical hash, see
//! which on-chain updates a proposed config would produce, and check whether
//! a signed envelope has gathered the required signatures, all without a
//! running node.

mod command;
mod config;
mod error;

pub use command::{approve, check, diff, hash, Command, Outcome};
pub use config::{CliConfig, DEFAULT_LOG_FILTER};
pub use error::{CliError, Result};
