//! CLI module for copytune - command-line interface and subcommands.

pub mod commands;

pub use commands::Cli;
