use directories::ProjectDirs;
use rand::distributions::{Alphanumeric, DistString};
use serde_derive::{Deserialize, Serialize};
use std::fmt::Display;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

use super::{CLI_NAME, ENCORE_ENV};

static DEFAULT_CONFIG_FILE: &str = "config.toml";
static DEFAULT_DB_FILE: &str = "encore.db";
static DEFAULT_LOG_FILE: &str = "error.log";

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("No configuration directory found for the current user")]
    NoConfigDirectory,

    #[error("Unknown settings profile: {0}")]
    UnknownProfile(String),

    #[error("The {0} profile is not populated, fill in its values in the configuration file")]
    Incomplete(Profile),

    #[error("Could not read the configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not parse the configuration file: {0}")]
    Deserialize(#[from] toml::de::Error),

    #[error("Could not serialize the configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// The environment a process runs as, selected with `ENCORE_ENV`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    Development,
    Production,
    Testing,
}

impl Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Profile::Development => write!(f, "development"),
            Profile::Production => write!(f, "production"),
            Profile::Testing => write!(f, "testing"),
        }
    }
}

impl FromStr for Profile {
    type Err = SettingsError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "development" => Ok(Profile::Development),
            "production" => Ok(Profile::Production),
            "testing" => Ok(Profile::Testing),
            s => Err(SettingsError::UnknownProfile(s.to_string())),
        }
    }
}

impl Profile {
    pub fn from_env() -> Result<Self, SettingsError> {
        match std::env::var(ENCORE_ENV) {
            Ok(v) => v.parse(),
            Err(_) => Ok(Profile::Development),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub db: String,
    #[serde(default)]
    pub secret_key: String,
    #[serde(default = "default_listen_address")]
    pub listen_address: String,
    #[serde(default)]
    pub debug: bool,
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            db: String::new(),
            secret_key: String::new(),
            listen_address: default_listen_address(),
            debug: false,
            log_file: default_log_file(),
        }
    }
}

fn default_listen_address() -> String {
    "127.0.0.1:5000".to_string()
}

fn default_log_file() -> PathBuf {
    PathBuf::from(DEFAULT_LOG_FILE)
}

/// One [Settings] block per profile. Only the development profile carries
/// generated defaults; production and testing stay placeholders until filled
/// in by hand.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Profiles {
    #[serde(default)]
    pub development: Settings,
    #[serde(default)]
    pub production: Settings,
    #[serde(default)]
    pub testing: Settings,
}

impl Profiles {
    pub fn select(self, profile: Profile) -> Result<Settings, SettingsError> {
        let settings = match profile {
            Profile::Development => self.development,
            Profile::Production => self.production,
            Profile::Testing => self.testing,
        };
        if settings.db.is_empty() {
            return Err(SettingsError::Incomplete(profile));
        }
        Ok(settings)
    }
}

/// Builds the default configuration, with a populated development profile:
/// an sqlite database in the user data directory and a freshly generated
/// secret key.
pub fn generate_default() -> Result<Profiles, SettingsError> {
    let dirs =
        ProjectDirs::from("com", "", CLI_NAME).ok_or(SettingsError::NoConfigDirectory)?;
    let db_path = dirs.data_dir().join(DEFAULT_DB_FILE);
    let development = Settings {
        db: format!("sqlite://{}?mode=rwc", db_path.to_string_lossy()),
        secret_key: Alphanumeric.sample_string(&mut rand::thread_rng(), 32),
        debug: true,
        ..Settings::default()
    };
    Ok(Profiles {
        development,
        ..Profiles::default()
    })
}

fn default_config_path() -> Result<PathBuf, SettingsError> {
    let dirs =
        ProjectDirs::from("com", "", CLI_NAME).ok_or(SettingsError::NoConfigDirectory)?;
    Ok(dirs.config_dir().join(DEFAULT_CONFIG_FILE))
}

/// Loads the settings for the profile selected by `ENCORE_ENV`. When no
/// configuration file exists the development profile falls back to generated
/// defaults; any other profile must be configured explicitly.
pub fn load(path: Option<PathBuf>) -> Result<Settings, SettingsError> {
    let profile = Profile::from_env()?;
    let path = match path {
        Some(path) => path,
        None => default_config_path()?,
    };
    tracing::trace! {?path, %profile, "Loading settings"};
    if !path.exists() {
        if profile == Profile::Development {
            return generate_default()?.select(profile);
        }
        return Err(SettingsError::Incomplete(profile));
    }
    let content = fs::read_to_string(path)?;
    let profiles: Profiles = toml::from_str(content.as_str())?;
    profiles.select(profile)
}
