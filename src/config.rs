//src/config.rs
use comfy_table::Color;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use strum::IntoEnumIterator;
use strum_macros::EnumIter;
use thiserror::Error;

const CONFIG_FILE_NAME: &str = "config.toml";
const APP_CONFIG_DIR: &str = "workout-log";
const CONFIG_ENV_VAR: &str = "WORKOUT_LOG_CONFIG_DIR"; // Environment variable name

#[derive(Error, Debug)]
pub enum Error {
    #[error("Could not determine configuration directory.")]
    CannotDetermineConfigDir,
    #[error("I/O error accessing config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file (TOML): {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("Failed to serialize config data (TOML): {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error("Invalid color name: {0}")]
    InvalidColor(String),
}

// Define standard colors using strum for easy iteration/parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum StandardColor {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    DarkGrey,
    DarkRed,
    DarkGreen,
    DarkYellow,
    DarkBlue,
    DarkMagenta,
    DarkCyan,
    Grey,
}

impl From<StandardColor> for Color {
    fn from(value: StandardColor) -> Self {
        match value {
            StandardColor::Black => Self::Black,
            StandardColor::Red => Self::Red,
            StandardColor::Green => Self::Green,
            StandardColor::Yellow => Self::Yellow,
            StandardColor::Blue => Self::Blue,
            StandardColor::Magenta => Self::Magenta,
            StandardColor::Cyan => Self::Cyan,
            StandardColor::White => Self::White,
            StandardColor::DarkGrey => Self::DarkGrey,
            StandardColor::DarkRed => Self::DarkRed,
            StandardColor::DarkGreen => Self::DarkGreen,
            StandardColor::DarkYellow => Self::DarkYellow,
            StandardColor::DarkBlue => Self::DarkBlue,
            StandardColor::DarkMagenta => Self::DarkMagenta,
            StandardColor::DarkCyan => Self::DarkCyan,
            StandardColor::Grey => Self::Grey,
        }
    }
}

/// Parses a case-insensitive color name such as `"darkcyan"`.
pub fn parse_color(color_str: &str) -> Result<StandardColor, Error> {
    StandardColor::iter()
        .find(|color| format!("{color:?}").eq_ignore_ascii_case(color_str.trim()))
        .ok_or_else(|| Error::InvalidColor(color_str.to_string()))
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Theme {
    pub header_color: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            header_color: "Green".to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)] // Ensure defaults are used if fields are missing
pub struct Config {
    /// Overrides the database location under the data directory.
    pub database_path: Option<PathBuf>,
    /// Roll back a whole logging transaction when storage fails part way through.
    pub atomic_logging: bool,
    /// Re-prompt for an empty target muscle group instead of storing it.
    pub require_muscle_group: bool,
    /// Ask before clearing every log.
    pub confirm_clear: bool,
    pub theme: Theme,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: None,
            atomic_logging: false,
            require_muscle_group: false,
            confirm_clear: true,
            theme: Theme::default(),
        }
    }
}

/// Determines the path to the configuration file, honouring `WORKOUT_LOG_CONFIG_DIR`.
pub fn get_config_path() -> Result<PathBuf, Error> {
    let config_dir_path = match std::env::var(CONFIG_ENV_VAR).ok() {
        Some(path_str) => PathBuf::from(path_str),
        None => dirs::config_dir()
            .ok_or(Error::CannotDetermineConfigDir)?
            .join(APP_CONFIG_DIR),
    };

    if !config_dir_path.exists() {
        fs::create_dir_all(&config_dir_path)?;
    }

    Ok(config_dir_path.join(CONFIG_FILE_NAME))
}

/// Loads the configuration, writing a default file first if none exists.
pub fn load(config_path: &Path) -> Result<Config, Error> {
    if !config_path.exists() {
        let default_config = Config::default();
        save(config_path, &default_config)?;
        return Ok(default_config);
    }
    let config_content = fs::read_to_string(config_path)?;
    let config: Config = toml::from_str(&config_content)?;
    Ok(config)
}

pub fn save(config_path: &Path, config: &Config) -> Result<(), Error> {
    if let Some(parent_dir) = config_path.parent() {
        if !parent_dir.as_os_str().is_empty() && !parent_dir.exists() {
            fs::create_dir_all(parent_dir)?;
        }
    }
    let config_content = toml::to_string_pretty(config)?;
    fs::write(config_path, config_content)?;
    Ok(())
}
