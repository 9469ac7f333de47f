//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::theme::ThemeMode;

/// Alert commands.
#[derive(Debug, Subcommand)]
pub enum AlertCommand {
    /// Trigger the emergency alert countdown (Ctrl-C cancels)
    Trigger {
        /// Latitude to report (overrides configured location)
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,

        /// Longitude to report (overrides configured location)
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Emergency contact commands.
#[derive(Debug, Subcommand)]
pub enum ContactsCommand {
    /// List the contacts available to this session
    List {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Validate a new contact and print a config snippet for it
    Add {
        /// Contact name
        #[arg(short, long)]
        name: String,

        /// Phone number
        #[arg(short, long)]
        phone: String,

        /// Relationship (e.g. Family, Friend)
        #[arg(short, long)]
        relationship: Option<String>,
    },
}

/// Theme preference commands.
#[derive(Debug, Subcommand)]
pub enum ThemeCommand {
    /// Show the active theme
    Show,

    /// Set the theme preference
    Set {
        /// Theme mode to persist
        #[arg(value_enum)]
        mode: ThemeModeArg,
    },

    /// Flip between light and dark
    Toggle,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Theme mode argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ThemeModeArg {
    /// Light appearance
    Light,
    /// Dark appearance
    Dark,
}

impl From<ThemeModeArg> for ThemeMode {
    fn from(arg: ThemeModeArg) -> Self {
        match arg {
            ThemeModeArg::Light => Self::Light,
            ThemeModeArg::Dark => Self::Dark,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_mode_arg_conversion() {
        assert_eq!(ThemeMode::from(ThemeModeArg::Light), ThemeMode::Light);
        assert_eq!(ThemeMode::from(ThemeModeArg::Dark), ThemeMode::Dark);
    }

    #[test]
    fn test_alert_command_debug() {
        let cmd = AlertCommand::Trigger {
            lat: Some(12.9716),
            lon: Some(77.5946),
            yes: true,
        };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("Trigger"));
        assert!(debug_str.contains("12.9716"));
    }

    #[test]
    fn test_contacts_command_debug() {
        let cmd = ContactsCommand::List { json: true };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("List"));
    }

    #[test]
    fn test_theme_command_debug() {
        let cmd = ThemeCommand::Set {
            mode: ThemeModeArg::Dark,
        };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("Dark"));
    }

    #[test]
    fn test_status_command_debug() {
        let cmd = StatusCommand { json: true };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("json"));
    }

    #[test]
    fn test_config_command_debug() {
        let cmd = ConfigCommand::Show { json: false };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("Show"));
    }
}
