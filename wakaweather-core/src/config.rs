use anyhow::{Context, Result, anyhow, bail};
use directories::ProjectDirs;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

use crate::model::ConfidenceQuery;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Location the confidence dashboard asks about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub city: String,
    pub lat: f64,
    pub lon: f64,
}

impl Default for Location {
    fn default() -> Self {
        Self {
            city: "Suva".to_string(),
            lat: -18.1248,
            lon: 178.4501,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub const fn all() -> &'static [Theme] {
        &[Theme::Light, Theme::Dark]
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        })
    }
}

/// Display preferences, read once at startup and handed to whoever renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub theme: Theme,
    /// BCP 47 tag, forwarded to the backend as `Accept-Language`.
    #[serde(default = "default_language")]
    pub language: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            language: default_language(),
        }
    }
}

fn default_language() -> String {
    "en".to_string()
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// base_url = "http://127.0.0.1:8000"
///
/// [location]
/// city = "Suva"
/// lat = -18.1248
/// lon = 178.4501
///
/// [preferences]
/// theme = "dark"
/// language = "en"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub location: Location,
    #[serde(default)]
    pub preferences: Preferences,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            location: Location::default(),
            preferences: Preferences::default(),
        }
    }
}

impl Config {
    /// Load config from disk, or return defaults if it doesn't exist yet.
    ///
    /// Only parses; callers `validate()` once command-line overrides are applied.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.validate()?;
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("fj", "wakaweather", "wakaweather")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.base_url)
            .with_context(|| format!("Invalid base_url '{}'", self.base_url))?;
        if url.cannot_be_a_base() {
            bail!("Invalid base_url '{}': not a hierarchical URL", self.base_url);
        }

        let Location { lat, lon, .. } = self.location;
        if !(-90.0..=90.0).contains(&lat) {
            bail!("Latitude {lat} is outside -90..=90");
        }
        if !(-180.0..=180.0).contains(&lon) {
            bail!("Longitude {lon} is outside -180..=180");
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn confidence_query(&self) -> ConfidenceQuery {
        ConfidenceQuery {
            city: self.location.city.clone(),
            lat: self.location.lat,
            lon: self.location.lon,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_suva() {
        let cfg = Config::default();
        let query = cfg.confidence_query();

        assert_eq!(query.city, "Suva");
        assert_eq!(query.lat, -18.1248);
        assert_eq!(cfg.request_timeout(), Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn minimal_toml_fills_in_defaults() {
        let cfg = Config::from_toml(r#"base_url = "https://api.example.com/waka""#)
            .expect("minimal config must parse");

        assert_eq!(cfg.base_url, "https://api.example.com/waka");
        assert_eq!(cfg.location, Location::default());
        assert_eq!(cfg.preferences.theme, Theme::Dark);
        assert_eq!(cfg.preferences.language, "en");
    }

    #[test]
    fn full_toml_roundtrip() {
        let mut cfg = Config::default();
        cfg.location.city = "Lautoka".into();
        cfg.preferences.theme = Theme::Light;
        cfg.preferences.language = "fj".into();

        let text = toml::to_string_pretty(&cfg).unwrap();
        let parsed = Config::from_toml(&text).unwrap();

        assert_eq!(parsed, cfg);
    }

    #[test]
    fn rejects_unparseable_base_url() {
        let cfg = Config::from_toml(r#"base_url = "not a url""#).expect("parsing does not validate");
        assert!(cfg.validate().unwrap_err().to_string().contains("Invalid base_url"));

        let cfg = Config::from_toml(r#"base_url = "mailto:someone@example.com""#).unwrap();
        assert!(cfg.validate().unwrap_err().to_string().contains("not a hierarchical URL"));
    }

    #[test]
    fn out_of_range_file_still_parses() {
        let cfg = Config::from_toml(
            r#"
            base_url = "http://127.0.0.1:8000"

            [location]
            city = "Suva"
            lat = 95.0
            lon = 178.4501
            "#,
        )
        .expect("invalid values must not block parsing");

        assert_eq!(cfg.location.lat, 95.0);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn broken_toml_is_an_error() {
        assert!(Config::from_toml("base_url = ").is_err());
    }

    #[test]
    fn rejects_out_of_range_coordinates() {
        let mut cfg = Config::default();
        cfg.location.lat = 95.0;
        assert!(cfg.validate().unwrap_err().to_string().contains("Latitude"));

        cfg.location.lat = 0.0;
        cfg.location.lon = -181.0;
        assert!(cfg.validate().unwrap_err().to_string().contains("Longitude"));
    }
}
