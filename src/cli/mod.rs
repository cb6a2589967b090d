//! CLI module for bugrescue - command-line flags and their mapping onto config.

pub mod commands;

pub use commands::Cli;
