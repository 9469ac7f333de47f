//! Configuration management for beacon.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::location::Coordinates;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default config directory name.
const CONFIG_DIR_NAME: &str = "beacon";

/// File holding the persisted theme preference.
const THEME_FILE_NAME: &str = "theme";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `BEACON_`)
/// 2. TOML config file at `~/.config/beacon/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Alert countdown configuration.
    pub alert: AlertConfig,
    /// Dispatch configuration.
    pub dispatch: DispatchConfig,
    /// Emergency contacts seeded at startup.
    pub contacts: ContactsConfig,
    /// Location configuration.
    pub location: LocationConfig,
}

/// Alert countdown configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Number of countdown ticks before dispatch fires.
    pub countdown_ticks: u32,
    /// Interval between countdown ticks in milliseconds.
    pub tick_interval_ms: u64,
}

/// Dispatch configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Delay between the text channel and the chat-link channel for one
    /// contact, in milliseconds.
    pub inter_channel_delay_ms: u64,
    /// Attempt the chat-app deep link after the text channel.
    pub chat_links_enabled: bool,
}

/// Seed contacts available in every session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactsConfig {
    /// Contacts registered before the user adds any of their own.
    pub seed: Vec<SeedContact>,
}

/// One seeded emergency contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedContact {
    /// Display name.
    pub name: String,
    /// Phone number as entered (normalized at dispatch time).
    pub phone: String,
    /// Relationship label.
    #[serde(default = "default_relationship")]
    pub relationship: String,
}

/// Location configuration.
///
/// Desktop machines have no location capability, so coordinates may be
/// pinned here instead.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    /// Fixed latitude in degrees.
    pub latitude: Option<f64>,
    /// Fixed longitude in degrees.
    pub longitude: Option<f64>,
}

fn default_relationship() -> String {
    "Contact".to_string()
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            countdown_ticks: 5,
            tick_interval_ms: 1_000,
        }
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            inter_channel_delay_ms: 1_000,
            chat_links_enabled: true,
        }
    }
}

impl Default for ContactsConfig {
    fn default() -> Self {
        Self {
            seed: default_seed_contacts(),
        }
    }
}

/// Default emergency helplines seeded into every session.
fn default_seed_contacts() -> Vec<SeedContact> {
    vec![
        SeedContact {
            name: "Emergency Helpline".to_string(),
            phone: "100".to_string(),
            relationship: "Police".to_string(),
        },
        SeedContact {
            name: "Women Helpline".to_string(),
            phone: "1098".to_string(),
            relationship: "Support".to_string(),
        },
    ]
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Configuration is loaded in this order (later sources override earlier):
    /// 1. Default values
    /// 2. TOML config file (if exists)
    /// 3. Environment variables (prefixed with `BEACON_`)
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file).nested())
            .merge(Env::prefixed("BEACON_").split("_"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        Self::config_dir().join(CONFIG_FILE_NAME)
    }

    /// Get the path of the persisted theme preference file.
    #[must_use]
    pub fn theme_preference_path() -> PathBuf {
        Self::config_dir().join(THEME_FILE_NAME)
    }

    fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(CONFIG_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.alert.countdown_ticks == 0 {
            return Err(Error::ConfigValidation {
                message: "countdown_ticks must be greater than 0".to_string(),
            });
        }

        if self.alert.tick_interval_ms == 0 {
            return Err(Error::ConfigValidation {
                message: "tick_interval_ms must be greater than 0".to_string(),
            });
        }

        for contact in &self.contacts.seed {
            if contact.name.trim().is_empty() {
                return Err(Error::ConfigValidation {
                    message: "seed contact with empty name".to_string(),
                });
            }
            if !contact.phone.chars().any(|c| c.is_ascii_digit()) {
                return Err(Error::ConfigValidation {
                    message: format!(
                        "seed contact '{}' has no dialable phone number",
                        contact.name
                    ),
                });
            }
        }

        // Both or neither coordinate must be pinned.
        match (self.location.latitude, self.location.longitude) {
            (Some(_), None) | (None, Some(_)) => {
                return Err(Error::ConfigValidation {
                    message: "location requires both latitude and longitude".to_string(),
                });
            }
            (Some(lat), Some(lon)) => {
                if !(-90.0..=90.0).contains(&lat) {
                    return Err(Error::ConfigValidation {
                        message: format!("latitude {lat} out of range [-90, 90]"),
                    });
                }
                if !(-180.0..=180.0).contains(&lon) {
                    return Err(Error::ConfigValidation {
                        message: format!("longitude {lon} out of range [-180, 180]"),
                    });
                }
            }
            (None, None) => {}
        }

        Ok(())
    }

    /// Get the pinned coordinates, if both are configured.
    #[must_use]
    pub fn fixed_location(&self) -> Option<Coordinates> {
        match (self.location.latitude, self.location.longitude) {
            (Some(lat), Some(lon)) => Some(Coordinates::new(lat, lon)),
            _ => None,
        }
    }

    /// Get the countdown tick interval as a Duration.
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.alert.tick_interval_ms)
    }

    /// Get the inter-channel delay as a Duration.
    #[must_use]
    pub fn inter_channel_delay(&self) -> Duration {
        Duration::from_millis(self.dispatch.inter_channel_delay_ms)
    }
}
