use std::path::{Path, PathBuf};

use anyhow::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid source_pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub apple_music: AppleMusicConfig,
    #[serde(default)]
    pub misskey: MisskeyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Helper executable, run with no arguments.
    #[serde(default = "default_helper")]
    pub helper: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            helper: default_helper(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppleMusicConfig {
    /// Append the catalog URL when the session comes from Apple Music.
    #[serde(default = "default_true")]
    pub append_url: bool,
    #[serde(default = "default_country_code")]
    pub country_code: String,
    /// Regex matched against the start of the session `Id`.
    #[serde(default = "default_source_pattern")]
    pub source_pattern: String,
    #[serde(default = "default_search_base")]
    pub search_base: String,
}

impl Default for AppleMusicConfig {
    fn default() -> Self {
        Self {
            append_url: true,
            country_code: default_country_code(),
            source_pattern: default_source_pattern(),
            search_base: default_search_base(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MisskeyConfig {
    #[serde(default = "default_server")]
    pub server: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,
}

impl Default for MisskeyConfig {
    fn default() -> Self {
        Self {
            server: default_server(),
            token: None,
            visibility: None,
        }
    }
}

impl MisskeyConfig {
    pub fn is_configured(&self) -> bool {
        !self.server.is_empty() && self.token.as_ref().is_some_and(|s| !s.is_empty())
    }
}

fn default_helper() -> PathBuf {
    PathBuf::from("SMTC_NowPlaying.exe")
}

fn default_true() -> bool {
    true
}

fn default_country_code() -> String {
    "jp".to_string()
}

fn default_source_pattern() -> String {
    "AppleInc".to_string()
}

fn default_search_base() -> String {
    "https://music.apple.com".to_string()
}

fn default_server() -> String {
    "https://misskey.io".to_string()
}

/// Matches session ids that belong to the composite-field source.
#[derive(Debug, Clone)]
pub struct SourceMatcher {
    regex: Regex,
}

impl SourceMatcher {
    /// Compiles `pattern` anchored at the start of the id.
    pub fn new(pattern: &str) -> Result<Self, ConfigError> {
        let regex = Regex::new(&format!("^(?:{})", pattern)).map_err(|source| {
            ConfigError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            }
        })?;
        Ok(Self { regex })
    }

    pub fn matches(&self, id: &str) -> bool {
        self.regex.is_match(id)
    }
}

pub fn config_path() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home)
        .join(".config")
        .join("nowplaying-note")
        .join("config.toml")
}

/// Loads the config at `path`. A missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn save_config(path: &Path, config: &Config) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_yields_defaults() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let cfg = load_config(&dir.path().join("absent.toml"))?;

        assert_eq!(cfg.session.helper, PathBuf::from("SMTC_NowPlaying.exe"));
        assert!(cfg.apple_music.append_url);
        assert_eq!(cfg.apple_music.country_code, "jp");
        assert_eq!(cfg.apple_music.source_pattern, "AppleInc");
        assert_eq!(cfg.misskey.server, "https://misskey.io");
        assert!(!cfg.misskey.is_configured());
        Ok(())
    }

    #[test]
    fn test_parse_partial_config_toml() -> anyhow::Result<()> {
        let toml_str = r#"
[apple_music]
append_url = false
country_code = "us"

[misskey]
server = "https://example.social"
token = "abc"
visibility = "home"
"#;

        let cfg: Config = toml::from_str(toml_str)?;

        assert!(!cfg.apple_music.append_url);
        assert_eq!(cfg.apple_music.country_code, "us");
        assert_eq!(cfg.apple_music.source_pattern, "AppleInc");
        assert_eq!(cfg.misskey.server, "https://example.social");
        assert_eq!(cfg.misskey.visibility.as_deref(), Some("home"));
        assert!(cfg.misskey.is_configured());
        assert_eq!(cfg.session.helper, PathBuf::from("SMTC_NowPlaying.exe"));
        Ok(())
    }

    #[test]
    fn test_malformed_file_is_an_error() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[misskey\nserver = ")?;

        assert!(matches!(
            load_config(&path),
            Err(ConfigError::Parse { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_save_then_load() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.misskey.token = Some("secret".to_string());
        save_config(&path, &cfg)?;

        let loaded = load_config(&path)?;
        assert_eq!(loaded.misskey.token.as_deref(), Some("secret"));
        assert_eq!(loaded.misskey.visibility, None);
        Ok(())
    }

    #[test]
    fn test_source_matcher_is_anchored() -> anyhow::Result<()> {
        let matcher = SourceMatcher::new("AppleInc")?;
        assert!(matcher.matches("AppleInc.AppleMusicWin_nzyj5cx40ttqa!App"));
        assert!(!matcher.matches("Spotify.exe"));
        assert!(!matcher.matches("NotAppleInc"));
        Ok(())
    }

    #[test]
    fn test_invalid_source_pattern() {
        assert!(matches!(
            SourceMatcher::new("Apple("),
            Err(ConfigError::InvalidPattern { .. })
        ));
    }
}
