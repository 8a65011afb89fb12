//! Process settings
//!
//! Settings come from, in increasing precedence: built-in defaults, an
//! optional YAML config file, then command-line flags and environment
//! variables (merged by the binary).

use std::path::Path;

use serde::Deserialize;

use crate::bridge::config::DEFAULT_BASE_URL;
use crate::bridge::BridgeConfig;
use crate::error::{Error, Result};

/// Config file read when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "/etc/ntfy/bot.yml";

/// Placeholder token shipped in the sample config
const TOKEN_PLACEHOLDER: &str = "MUST_BE_SET";

/// Chat platform, derived from the token format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// In-process console chat, for local testing
    Mem,
    /// Slack bot token (`xoxb-...`)
    Slack,
    /// Anything else
    Discord,
}

impl Platform {
    /// Guess the platform from a bot token
    pub fn from_token(token: &str) -> Self {
        if token.starts_with("mem") {
            Platform::Mem
        } else if token.starts_with("xoxb-") {
            Platform::Slack
        } else {
            Platform::Discord
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::Mem => write!(f, "mem"),
            Platform::Slack => write!(f, "slack"),
            Platform::Discord => write!(f, "discord"),
        }
    }
}

/// Contents of the YAML config file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileSettings {
    pub bot_token: Option<String>,
    pub base_url: Option<String>,
    pub debug: Option<bool>,
}

impl FileSettings {
    /// Load the config file
    ///
    /// A missing file is only an error when the path was given explicitly.
    pub fn load(path: &Path, explicit: bool) -> Result<Self> {
        if !path.exists() {
            if explicit {
                return Err(Error::config(format!(
                    "config file {} does not exist",
                    path.display()
                )));
            }
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Parse YAML config text; an empty document yields defaults
    pub fn parse(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }
}

/// Fully resolved settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub token: String,
    pub base_url: String,
    pub debug: bool,
}

impl Settings {
    /// Merge command-line values over file values and validate
    pub fn resolve(
        file: FileSettings,
        token: Option<String>,
        base_url: Option<String>,
        debug: bool,
    ) -> Result<Self> {
        let token = token.or(file.bot_token).unwrap_or_default();
        if token.is_empty() || token == TOKEN_PLACEHOLDER {
            return Err(Error::config(
                "missing bot token, pass --bot-token, set NTFY_BOT_TOKEN env variable or bot-token config option",
            ));
        }

        Ok(Self {
            token,
            base_url: base_url
                .or(file.base_url)
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            debug: debug || file.debug.unwrap_or(false),
        })
    }

    /// Chat platform for the configured token
    pub fn platform(&self) -> Platform {
        Platform::from_token(&self.token)
    }

    /// Bridge configuration for these settings
    pub fn bridge_config(&self) -> BridgeConfig {
        BridgeConfig::with_base_url(self.base_url.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_platform_from_token() {
        assert_eq!(Platform::from_token("mem"), Platform::Mem);
        assert_eq!(Platform::from_token("xoxb-123"), Platform::Slack);
        assert_eq!(Platform::from_token("MTIz.abc"), Platform::Discord);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bot.yml");

        assert_eq!(FileSettings::load(&path, false).unwrap(), FileSettings::default());

        let err = FileSettings::load(&path, true).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "bot-token: mem-test").unwrap();
        writeln!(file, "base-url: https://ntfy.example.com").unwrap();
        writeln!(file, "debug: true").unwrap();

        let settings = FileSettings::load(file.path(), true).unwrap();

        assert_eq!(settings.bot_token.as_deref(), Some("mem-test"));
        assert_eq!(settings.base_url.as_deref(), Some("https://ntfy.example.com"));
        assert_eq!(settings.debug, Some(true));
    }

    #[test]
    fn test_parse_rejects_unknown_keys() {
        assert!(matches!(
            FileSettings::parse("bot-tokn: x"),
            Err(Error::ConfigFormat(_))
        ));
        assert_eq!(FileSettings::parse("").unwrap(), FileSettings::default());
    }

    #[test]
    fn test_resolve_precedence() {
        let file = FileSettings {
            bot_token: Some("file-token".into()),
            base_url: Some("https://file.example.com".into()),
            debug: Some(true),
        };

        let settings = Settings::resolve(file.clone(), Some("cli-token".into()), None, false).unwrap();
        assert_eq!(settings.token, "cli-token");
        assert_eq!(settings.base_url, "https://file.example.com");
        assert!(settings.debug);

        let settings = Settings::resolve(FileSettings::default(), Some("mem".into()), None, false).unwrap();
        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
        assert!(!settings.debug);
        assert_eq!(settings.platform(), Platform::Mem);
    }

    #[test]
    fn test_resolve_requires_token() {
        assert!(Settings::resolve(FileSettings::default(), None, None, false).is_err());
        assert!(Settings::resolve(
            FileSettings::default(),
            Some(TOKEN_PLACEHOLDER.into()),
            None,
            false
        )
        .is_err());
    }
}
