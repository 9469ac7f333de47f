//! Command-line interface for beacon.
//!
//! This module provides the CLI structure and command handlers for the
//! `beacon` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AlertCommand, ConfigCommand, ContactsCommand, StatusCommand, ThemeCommand, ThemeModeArg,
};

/// beacon - emergency alerts for when it matters
///
/// Triggers a cancellable SOS countdown and then fans an alert message with
/// your live location out to your emergency contacts over every channel
/// available.
#[derive(Debug, Parser)]
#[command(name = "beacon")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Trigger the emergency alert flow
    #[command(subcommand)]
    Alert(AlertCommand),

    /// Manage emergency contacts
    #[command(subcommand)]
    Contacts(ContactsCommand),

    /// View or change the theme preference
    #[command(subcommand)]
    Theme(ThemeCommand),

    /// Show session status
    Status(StatusCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}
