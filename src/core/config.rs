//! Configuration system: TOML file + env var overrides + smart defaults.

#![allow(missing_docs)]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::catalog::ComboKey;
use crate::catalog::loader::DeckSource;
use crate::core::errors::{PgError, Result};
use crate::engine::controller::SessionOptions;

/// Full prompt-grid configuration model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Config {
    pub deck: DeckConfig,
    pub session: SessionConfig,
    pub display: DisplayConfig,
    pub logging: LoggingConfig,
    pub paths: PathsConfig,
}

/// Where prompts come from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct DeckConfig {
    /// Deck file (`.toml` / `.json`). `None` uses the built-in deck.
    pub path: Option<PathBuf>,
}

/// Startup filter and RNG behavior.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct SessionConfig {
    /// Fixed RNG seed for reproducible sessions.
    pub seed: Option<u64>,
    /// Combos (`"category:level"`) switched off before the first draw.
    pub initially_disabled: Vec<String>,
}

/// Presentation knobs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DisplayConfig {
    /// Show the "press Enter/Space" hint under the prompt.
    pub show_hints: bool,
    /// Row header prefix, e.g. "Level" → "Level 2".
    pub level_label: String,
    /// Colored output. Also disabled by `NO_COLOR` or `--no-color`.
    pub color: bool,
}

/// Activity log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    pub enabled: bool,
    pub activity_log: PathBuf,
    pub max_size_bytes: u64,
    pub max_rotated_files: u32,
}

/// Filesystem paths used by prompt-grid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PathsConfig {
    pub config_file: PathBuf,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_hints: true,
            level_label: "Level".to_string(),
            color: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            activity_log: home_dir()
                .join(".local")
                .join("share")
                .join("prompt-grid")
                .join("activity.jsonl"),
            max_size_bytes: 10 * 1024 * 1024,
            max_rotated_files: 3,
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            config_file: home_dir()
                .join(".config")
                .join("prompt-grid")
                .join("config.toml"),
        }
    }
}

fn home_dir() -> PathBuf {
    env::var_os("HOME").map_or_else(
        || {
            eprintln!("[PGR-CONFIG] WARNING: HOME not set, falling back to /tmp for data paths");
            PathBuf::from("/tmp")
        },
        PathBuf::from,
    )
}

impl Config {
    /// Default configuration path.
    #[must_use]
    pub fn default_path() -> PathBuf {
        PathsConfig::default().config_file
    }

    /// Load config from default or explicit path, then apply env overrides.
    ///
    /// Missing config file is not an error when loading from default path; defaults are used.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path_buf = path.map_or_else(Self::default_path, Path::to_path_buf);
        let is_explicit_path = path.is_some();

        let mut cfg = if path_buf.exists() {
            let raw = fs::read_to_string(&path_buf).map_err(|source| PgError::Io {
                path: path_buf.clone(),
                source,
            })?;
            let mut parsed: Self = toml::from_str(&raw)?;
            parsed.resolve_relative_deck(&path_buf);
            parsed
        } else if is_explicit_path {
            return Err(PgError::MissingConfig { path: path_buf });
        } else {
            Self::default()
        };

        cfg.paths.config_file = path_buf;
        cfg.apply_env_overrides_from(env_var)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// A relative `deck.path` in a config file is relative to that file.
    fn resolve_relative_deck(&mut self, config_file: &Path) {
        if let Some(deck) = &self.deck.path
            && deck.is_relative()
            && let Some(dir) = config_file.parent()
        {
            self.deck.path = Some(dir.join(deck));
        }
    }

    /// Deterministic hash of the effective config for the activity log.
    ///
    /// FNV-1a, stable across processes and Rust releases.
    pub fn stable_hash(&self) -> Result<String> {
        let canonical = serde_json::to_string(self)?;
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in canonical.as_bytes() {
            hash ^= u64::from(*byte);
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
        Ok(format!("{hash:016x}"))
    }

    /// Render the effective config as TOML.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    #[must_use]
    pub fn deck_source(&self) -> DeckSource {
        DeckSource::from_option(self.deck.path.clone())
    }

    /// Parsed `session.initially_disabled` combos.
    pub fn initially_disabled(&self) -> Result<Vec<ComboKey>> {
        self.session
            .initially_disabled
            .iter()
            .map(|raw| raw.parse::<ComboKey>())
            .collect()
    }

    /// Controller startup options derived from the `[session]` section.
    pub fn session_options(&self) -> Result<SessionOptions> {
        Ok(SessionOptions {
            seed: self.session.seed,
            initially_disabled: self.initially_disabled()?,
        })
    }

    fn apply_env_overrides_from<F>(&mut self, mut lookup: F) -> Result<()>
    where
        F: FnMut(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("PGRID_DECK_PATH") {
            self.deck.path = Some(PathBuf::from(raw));
        }
        if let Some(raw) = lookup("PGRID_SESSION_SEED") {
            self.session.seed = Some(parse_env_u64("PGRID_SESSION_SEED", &raw)?);
        }
        if let Some(raw) = lookup("PGRID_DISPLAY_SHOW_HINTS") {
            self.display.show_hints = parse_env_bool("PGRID_DISPLAY_SHOW_HINTS", &raw)?;
        }
        if let Some(raw) = lookup("PGRID_DISPLAY_COLOR") {
            self.display.color = parse_env_bool("PGRID_DISPLAY_COLOR", &raw)?;
        }
        if let Some(raw) = lookup("PGRID_LOGGING_ENABLED") {
            self.logging.enabled = parse_env_bool("PGRID_LOGGING_ENABLED", &raw)?;
        }
        if let Some(raw) = lookup("PGRID_LOGGING_ACTIVITY_LOG") {
            self.logging.activity_log = PathBuf::from(raw);
        }
        // Honour the NO_COLOR convention regardless of value.
        if lookup("NO_COLOR").is_some() {
            self.display.color = false;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.display.level_label.trim().is_empty() {
            return Err(PgError::InvalidConfig {
                details: "display.level_label must not be empty".to_string(),
            });
        }

        if let Some(path) = &self.deck.path
            && path.as_os_str().is_empty()
        {
            return Err(PgError::InvalidConfig {
                details: "deck.path must not be empty when set".to_string(),
            });
        }

        for raw in &self.session.initially_disabled {
            raw.parse::<ComboKey>()
                .map_err(|e| PgError::InvalidConfig {
                    details: format!("session.initially_disabled: {e}"),
                })?;
        }

        if self.logging.enabled && self.logging.max_size_bytes < 1024 {
            return Err(PgError::InvalidConfig {
                details: format!(
                    "logging.max_size_bytes ({}) must be >= 1024",
                    self.logging.max_size_bytes
                ),
            });
        }

        Ok(())
    }
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|raw| !raw.trim().is_empty())
}

fn parse_env_u64(name: &str, raw: &str) -> Result<u64> {
    raw.trim().parse::<u64>().map_err(|error| PgError::ConfigParse {
        context: "env",
        details: format!("{name}={raw:?}: {error}"),
    })
}

fn parse_env_bool(name: &str, raw: &str) -> Result<bool> {
    raw.trim().parse::<bool>().map_err(|error| PgError::ConfigParse {
        context: "env",
        details: format!("{name}={raw:?}: {error}"),
    })
}
