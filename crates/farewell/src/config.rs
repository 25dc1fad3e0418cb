use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::envelope::DEFAULT_OPEN_DELAY;

const FILENAME: &str = "config.yaml";
const APP_DIR: &str = "farewell";

pub const URL_ENV: &str = "FAREWELL_SUPABASE_URL";
pub const ANON_KEY_ENV: &str = "FAREWELL_SUPABASE_ANON_KEY";

const DEFAULT_TABLE: &str = "items";
const DEFAULT_TIMEOUT_SECS: u64 = 20;
const DEFAULT_KICKER: &str = "From all of us";
const DEFAULT_HEADING: &str = "Farewell!";

pub const VALID_KEYS: &[&str] = &[
    "source.url",
    "source.anon_key",
    "source.table",
    "source.timeout_secs",
    "card.kicker",
    "card.heading",
    "defaults.theme",
    "defaults.transition",
    "defaults.open_delay_ms",
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card: Option<CardConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultsConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Project URL, e.g. https://abc.supabase.co. Falls back to FAREWELL_SUPABASE_URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Public anon key. Falls back to FAREWELL_SUPABASE_ANON_KEY.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anon_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CardConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kicker: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_delay_ms: Option<u64>,
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}

fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

impl SourceConfig {
    /// Resolve the project URL from config or environment variable.
    pub fn resolve_url(&self) -> Option<String> {
        non_empty(&self.url).or_else(|| env_non_empty(URL_ENV))
    }

    /// Resolve the anon key from config or environment variable.
    pub fn resolve_anon_key(&self) -> Option<String> {
        non_empty(&self.anon_key).or_else(|| env_non_empty(ANON_KEY_ENV))
    }

    pub fn table(&self) -> &str {
        self.table
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_TABLE)
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)
    }
}

impl Config {
    pub fn path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|d| d.join(APP_DIR).join(FILENAME))
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
    }

    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                anyhow::anyhow!("No config found. Run `farewell config show` to see defaults.")
            } else {
                anyhow::anyhow!("Failed to read config: {e}")
            }
        })?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(config) => config,
            Err(e) => {
                tracing::debug!("using default config: {e}");
                Self::default()
            }
        }
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(self)?;
        let contents = format!("# Farewell card configuration\n{yaml}");
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn source(&self) -> SourceConfig {
        self.source.clone().unwrap_or_default()
    }

    pub fn kicker(&self) -> String {
        self.card
            .as_ref()
            .and_then(|c| c.kicker.clone())
            .unwrap_or_else(|| DEFAULT_KICKER.to_string())
    }

    pub fn heading(&self) -> String {
        self.card
            .as_ref()
            .and_then(|c| c.heading.clone())
            .unwrap_or_else(|| DEFAULT_HEADING.to_string())
    }

    pub fn theme_name(&self) -> &str {
        self.defaults
            .as_ref()
            .and_then(|d| d.theme.as_deref())
            .unwrap_or("peach")
    }

    pub fn transition_name(&self) -> &str {
        self.defaults
            .as_ref()
            .and_then(|d| d.transition.as_deref())
            .unwrap_or("flip")
    }

    pub fn open_delay(&self) -> Duration {
        self.defaults
            .as_ref()
            .and_then(|d| d.open_delay_ms)
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_OPEN_DELAY)
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "source.url" => {
                if !value.starts_with("http://") && !value.starts_with("https://") {
                    anyhow::bail!("Invalid url: {value}. Must start with http:// or https://.");
                }
                self.source.get_or_insert_with(SourceConfig::default).url =
                    Some(value.trim_end_matches('/').to_string());
            }
            "source.anon_key" => {
                self.source.get_or_insert_with(SourceConfig::default).anon_key =
                    Some(value.to_string());
            }
            "source.table" => {
                if value.is_empty()
                    || !value
                        .chars()
                        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
                {
                    anyhow::bail!(
                        "Invalid table: {value}. Use letters, digits, '_' or '-' only."
                    );
                }
                self.source.get_or_insert_with(SourceConfig::default).table =
                    Some(value.to_string());
            }
            "source.timeout_secs" => {
                let secs: u64 = value.parse().map_err(|_| {
                    anyhow::anyhow!("Invalid timeout_secs: {value}. Must be a whole number.")
                })?;
                if secs == 0 {
                    anyhow::bail!("Invalid timeout_secs: 0. Must be at least 1.");
                }
                self.source
                    .get_or_insert_with(SourceConfig::default)
                    .timeout_secs = Some(secs);
            }
            "card.kicker" => {
                self.card.get_or_insert_with(CardConfig::default).kicker = Some(value.to_string());
            }
            "card.heading" => {
                self.card.get_or_insert_with(CardConfig::default).heading =
                    Some(value.to_string());
            }
            "defaults.theme" => {
                match value {
                    "peach" | "night" => {}
                    _ => anyhow::bail!("Invalid theme: {value}. Must be 'peach' or 'night'."),
                }
                self.defaults
                    .get_or_insert_with(DefaultsConfig::default)
                    .theme = Some(value.to_string());
            }
            "defaults.transition" => {
                match value {
                    "flip" | "slide" | "fade" | "none" => {}
                    _ => anyhow::bail!(
                        "Invalid transition: {value}. Must be 'flip', 'slide', 'fade', or 'none'."
                    ),
                }
                self.defaults
                    .get_or_insert_with(DefaultsConfig::default)
                    .transition = Some(value.to_string());
            }
            "defaults.open_delay_ms" => {
                let ms: u64 = value.parse().map_err(|_| {
                    anyhow::anyhow!("Invalid open_delay_ms: {value}. Must be a whole number.")
                })?;
                self.defaults
                    .get_or_insert_with(DefaultsConfig::default)
                    .open_delay_ms = Some(ms);
            }
            _ => anyhow::bail!(
                "Unknown config key: {key}. Valid keys: {}",
                VALID_KEYS.join(", ")
            ),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_file() {
        let config = Config::default();
        assert_eq!(config.kicker(), "From all of us");
        assert_eq!(config.heading(), "Farewell!");
        assert_eq!(config.theme_name(), "peach");
        assert_eq!(config.transition_name(), "flip");
        assert_eq!(config.open_delay(), Duration::from_millis(900));
        assert_eq!(config.source().table(), "items");
        assert_eq!(config.source().timeout_secs(), 20);
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = "\
source:
  url: https://abc.supabase.co
  anon_key: secret
  table: wishes
card:
  heading: Farewell, Taha!
defaults:
  transition: slide
  open_delay_ms: 1200
";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        let source = config.source();
        assert_eq!(source.resolve_url().as_deref(), Some("https://abc.supabase.co"));
        assert_eq!(source.resolve_anon_key().as_deref(), Some("secret"));
        assert_eq!(source.table(), "wishes");
        assert_eq!(config.heading(), "Farewell, Taha!");
        assert_eq!(config.kicker(), "From all of us");
        assert_eq!(config.transition_name(), "slide");
        assert_eq!(config.open_delay(), Duration::from_millis(1200));
    }

    #[test]
    fn test_set_validates_values() {
        let mut config = Config::default();
        assert!(config.set("defaults.theme", "night").is_ok());
        assert!(config.set("defaults.theme", "neon").is_err());
        assert!(config.set("defaults.transition", "fade").is_ok());
        assert!(config.set("defaults.transition", "spin").is_err());
        assert!(config.set("source.url", "ftp://nope").is_err());
        assert!(config.set("source.table", "bad table").is_err());
        assert!(config.set("source.timeout_secs", "0").is_err());
        assert!(config.set("defaults.open_delay_ms", "soon").is_err());
        assert!(config.set("nonsense", "x").is_err());
        assert_eq!(config.theme_name(), "night");
        assert_eq!(config.transition_name(), "fade");
    }

    #[test]
    fn test_set_trims_url_slash() {
        let mut config = Config::default();
        config.set("source.url", "https://abc.supabase.co/").unwrap();
        assert_eq!(
            config.source().url.as_deref(),
            Some("https://abc.supabase.co")
        );
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = std::env::temp_dir().join(format!("farewell-config-{}", std::process::id()));
        let path = dir.join(FILENAME);
        let mut config = Config::default();
        config.set("card.kicker", "With love").unwrap();
        config.set("source.table", "wishes").unwrap();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.kicker(), "With love");
        assert_eq!(loaded.source().table(), "wishes");
        assert!(loaded.defaults.is_none());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_file_message() {
        let err = Config::load_from(Path::new("/no/such/farewell.yaml")).unwrap_err();
        assert!(err.to_string().contains("No config found"));
    }
}
