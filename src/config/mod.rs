//! User settings stored in the per-user config directory.
//!
//! Settings live in `config.toml`. Values are validated through the same
//! [`Config::apply`] path whether they come from the file or from
//! `config set KEY=VALUE`, so the file can never hold something the commit
//! flow would reject later.

use std::env;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::{debug, warn};

use crate::error::ConfigError;

/// Environment variable that overrides the config directory.
pub const CONFIG_DIR_ENV_VAR: &str = "AI_COMMIT_CONFIG_DIR";

/// Environment variable consulted when no API key is stored.
pub const API_KEY_ENV_VAR: &str = "GEMINI_API_KEY";

/// Upper bound on candidates per request, imposed by the model API.
pub const MAX_CANDIDATES: u8 = 8;

const CONFIG_FILE: &str = "config.toml";
const APP_DIR: &str = "ai-commit";

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_LOCALE: &str = "en";
const DEFAULT_MAX_LENGTH: usize = 50;

const API_KEY_HINT: &str =
    "Please set your Gemini API key via `ai-commit config set apiKey=<your token>`";

/// Classification rubric applied to generated messages and branch names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CommitType {
    Conventional,
}

impl CommitType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommitType::Conventional => "conventional",
        }
    }

    /// Parse a stored `type` value. Empty means "no rubric".
    fn parse_optional(value: &str) -> Result<Option<Self>, String> {
        match value.trim() {
            "" => Ok(None),
            "conventional" => Ok(Some(CommitType::Conventional)),
            other => Err(format!("unsupported type '{other}' (expected: conventional)")),
        }
    }
}

impl fmt::Display for CommitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to do when branch-name generation cannot produce a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BranchPolicy {
    /// Use `ai-branch-<millis>` and continue.
    #[default]
    Fallback,
    /// Abort the run.
    Strict,
}

impl BranchPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            BranchPolicy::Fallback => "fallback",
            BranchPolicy::Strict => "strict",
        }
    }
}

impl FromStr for BranchPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "fallback" => Ok(BranchPolicy::Fallback),
            "strict" => Ok(BranchPolicy::Strict),
            other => Err(format!("unsupported policy '{other}' (expected: fallback, strict)")),
        }
    }
}

/// Recognized keys in `config.toml`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    ApiKey,
    Locale,
    Type,
    Generate,
    Model,
    MaxLength,
    Timeout,
    BranchPolicy,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 8] = [
        ConfigKey::ApiKey,
        ConfigKey::Locale,
        ConfigKey::Type,
        ConfigKey::Generate,
        ConfigKey::Model,
        ConfigKey::MaxLength,
        ConfigKey::Timeout,
        ConfigKey::BranchPolicy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigKey::ApiKey => "apiKey",
            ConfigKey::Locale => "locale",
            ConfigKey::Type => "type",
            ConfigKey::Generate => "generate",
            ConfigKey::Model => "model",
            ConfigKey::MaxLength => "maxLength",
            ConfigKey::Timeout => "timeout",
            ConfigKey::BranchPolicy => "branchPolicy",
        }
    }

    /// Keys stored as TOML integers rather than strings.
    fn is_integer(&self) -> bool {
        matches!(
            self,
            ConfigKey::Generate | ConfigKey::MaxLength | ConfigKey::Timeout
        )
    }

    /// Keys whose empty value means "unset" and removes the entry.
    fn is_clearable(&self) -> bool {
        matches!(self, ConfigKey::ApiKey | ConfigKey::Timeout)
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConfigKey::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Effective settings for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_key: Option<String>,
    pub locale: String,
    pub commit_type: Option<CommitType>,
    pub generate: u8,
    pub model: String,
    pub max_length: usize,
    /// Request deadline in milliseconds.
    pub timeout: Option<u64>,
    pub branch_policy: BranchPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            locale: DEFAULT_LOCALE.to_string(),
            commit_type: Some(CommitType::Conventional),
            generate: 1,
            model: DEFAULT_MODEL.to_string(),
            max_length: DEFAULT_MAX_LENGTH,
            timeout: None,
            branch_policy: BranchPolicy::Fallback,
        }
    }
}

impl Config {
    /// Validate and apply a single textual value.
    pub fn apply(&mut self, key: ConfigKey, value: &str) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            reason,
        };

        match key {
            ConfigKey::ApiKey => {
                let trimmed = value.trim();
                self.api_key = (!trimmed.is_empty()).then(|| trimmed.to_string());
            }
            ConfigKey::Locale => {
                if value.trim().is_empty() {
                    return Err(invalid("locale must not be empty".into()));
                }
                self.locale = value.trim().to_string();
            }
            ConfigKey::Type => {
                self.commit_type = CommitType::parse_optional(value).map_err(invalid)?;
            }
            ConfigKey::Generate => {
                self.generate = parse_generate(value).map_err(invalid)?;
            }
            ConfigKey::Model => {
                if value.trim().is_empty() {
                    return Err(invalid("model must not be empty".into()));
                }
                self.model = value.trim().to_string();
            }
            ConfigKey::MaxLength => {
                let n: usize = value
                    .trim()
                    .parse()
                    .map_err(|_| invalid("expected a positive integer".into()))?;
                if n == 0 {
                    return Err(invalid("must be greater than 0".into()));
                }
                self.max_length = n;
            }
            ConfigKey::Timeout => {
                let trimmed = value.trim();
                self.timeout = if trimmed.is_empty() {
                    None
                } else {
                    let ms: u64 = trimmed
                        .parse()
                        .map_err(|_| invalid("expected milliseconds as an integer".into()))?;
                    Some(ms)
                };
            }
            ConfigKey::BranchPolicy => {
                self.branch_policy = value.parse().map_err(invalid)?;
            }
        }

        Ok(())
    }

    /// Fail fast when the API key is missing. Must run before any model call.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        validate_required(
            ConfigKey::ApiKey,
            self.api_key.is_some(),
            API_KEY_HINT,
        )?;
        Ok(self.api_key.as_deref().unwrap_or_default())
    }

    /// Render a value for display, masking the API key.
    pub fn display_value(&self, key: ConfigKey) -> String {
        match key {
            ConfigKey::ApiKey => self
                .api_key
                .as_deref()
                .map(mask_secret)
                .unwrap_or_default(),
            ConfigKey::Locale => self.locale.clone(),
            ConfigKey::Type => self
                .commit_type
                .map(|t| t.to_string())
                .unwrap_or_default(),
            ConfigKey::Generate => self.generate.to_string(),
            ConfigKey::Model => self.model.clone(),
            ConfigKey::MaxLength => self.max_length.to_string(),
            ConfigKey::Timeout => self.timeout.map(|t| t.to_string()).unwrap_or_default(),
            ConfigKey::BranchPolicy => self.branch_policy.as_str().to_string(),
        }
    }
}

/// Fail with a user-facing message if a required setting is absent.
pub fn validate_required(
    key: ConfigKey,
    is_present: bool,
    message: &str,
) -> Result<(), ConfigError> {
    if is_present {
        return Ok(());
    }
    Err(ConfigError::MissingRequired {
        key: key.to_string(),
        message: message.to_string(),
    })
}

/// Parse a candidate count, enforcing the API range.
pub fn parse_generate(value: &str) -> Result<u8, String> {
    let n: u8 = value
        .trim()
        .parse()
        .map_err(|_| format!("expected an integer between 1 and {MAX_CANDIDATES}"))?;
    if !(1..=MAX_CANDIDATES).contains(&n) {
        return Err(format!("must be between 1 and {MAX_CANDIDATES}"));
    }
    Ok(n)
}

fn mask_secret(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    if secret.chars().count() <= 4 {
        "****".to_string()
    } else {
        format!("{visible}****")
    }
}

/// Split `KEY=VALUE` on the first `=`.
pub fn parse_assignment(raw: &str) -> Result<(ConfigKey, String), ConfigError> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| ConfigError::MalformedAssignment(raw.to_string()))?;
    Ok((key.trim().parse()?, value.to_string()))
}

/// Resolve the per-user config directory.
///
/// Uses `AI_COMMIT_CONFIG_DIR` when set, otherwise `<config dir>/ai-commit`.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    match env::var(CONFIG_DIR_ENV_VAR) {
        Ok(dir) if !dir.is_empty() => Ok(PathBuf::from(dir)),
        _ => dirs::config_dir()
            .map(|d| d.join(APP_DIR))
            .ok_or(ConfigError::NoConfigDir),
    }
}

/// Reads and writes `config.toml` inside a config directory.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    dir: PathBuf,
}

impl ConfigStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store rooted at [`config_dir`].
    pub fn locate() -> Result<Self, ConfigError> {
        Ok(Self::new(config_dir()?))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(CONFIG_FILE)
    }

    /// Load defaults merged with stored values.
    ///
    /// A missing file yields defaults. `GEMINI_API_KEY` fills in the API key
    /// when none is stored.
    pub fn load(&self) -> Result<Config, ConfigError> {
        let path = self.path();
        let mut config = Config::default();

        if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
                path: path.clone(),
                source,
            })?;
            let table: toml::Table =
                toml::from_str(&content).map_err(|e| ConfigError::Parse {
                    path: path.clone(),
                    reason: e.to_string(),
                })?;

            for (raw_key, value) in &table {
                let key = match raw_key.parse::<ConfigKey>() {
                    Ok(key) => key,
                    Err(_) => {
                        warn!("Ignoring unknown key '{}' in {}", raw_key, path.display());
                        continue;
                    }
                };
                config.apply(key, &toml_value_to_string(value))?;
            }
            debug!("Loaded config from {}", path.display());
        } else {
            debug!("No config file at {}, using defaults", path.display());
        }

        if config.api_key.is_none()
            && let Ok(key) = env::var(API_KEY_ENV_VAR)
            && !key.trim().is_empty()
        {
            debug!("Using API key from {}", API_KEY_ENV_VAR);
            config.api_key = Some(key.trim().to_string());
        }

        Ok(config)
    }

    /// Validate and persist `KEY=VALUE` assignments.
    ///
    /// Edits the existing document in place so user comments and ordering
    /// survive, then replaces the file atomically.
    pub fn set(&self, assignments: &[(ConfigKey, String)]) -> Result<(), ConfigError> {
        let path = self.path();
        let content = if path.exists() {
            std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
                path: path.clone(),
                source,
            })?
        } else {
            String::new()
        };

        let mut doc = content
            .parse::<toml_edit::DocumentMut>()
            .map_err(|e| ConfigError::Parse {
                path: path.clone(),
                reason: e.to_string(),
            })?;

        // Validate every value before touching the document.
        let mut scratch = Config::default();
        for (key, value) in assignments {
            scratch.apply(*key, value)?;
        }

        for (key, value) in assignments {
            let trimmed = value.trim();
            if trimmed.is_empty() && key.is_clearable() {
                doc.remove(key.as_str());
            } else if key.is_integer() {
                let n: i64 = trimmed.parse().map_err(|_| ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: value.clone(),
                    reason: "expected an integer".into(),
                })?;
                doc[key.as_str()] = toml_edit::value(n);
            } else {
                doc[key.as_str()] = toml_edit::value(trimmed);
            }
        }

        write_atomic(&self.dir, &path, doc.to_string().as_bytes())
    }
}

fn toml_value_to_string(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn write_atomic(dir: &Path, path: &Path, bytes: &[u8]) -> Result<(), ConfigError> {
    let write_err = |source: std::io::Error| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    };

    std::fs::create_dir_all(dir).map_err(write_err)?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(bytes).map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}
