use std::path::{Path, PathBuf};

use serde::Deserialize;

pub const DEFAULT_API_BASE: &str = "https://new-api.aihehuo.com";
/// Default for secrets and identifiers meaning "not configured yet".
pub const PLACEHOLDER: &str = "REPLACE_ME";

pub const DEFAULT_NEW_USERS_PAGES: u32 = 10;
pub const DEFAULT_NEW_USERS_PER_PAGE: u32 = 200;

/// Process configuration, resolved once at startup and passed down explicitly.
#[derive(Debug, Clone)]
pub struct Config {
    pub mode: String, // "stdio" or "server"
    pub port: u16,
    pub api: ApiConfig,
    pub scratch_dir: PathBuf,
    pub new_users: PageSweep,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
    pub api_key: String,
    pub current_user_id: String,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, current_user_id: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), api_key: api_key.into(), current_user_id: current_user_id.into() }
    }

    /// The configured current user, or `None` while it is still the placeholder.
    pub fn current_user(&self) -> Option<&str> {
        is_configured(&self.current_user_id).then_some(self.current_user_id.as_str())
    }

    pub fn has_api_key(&self) -> bool {
        is_configured(&self.api_key)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE, PLACEHOLDER, PLACEHOLDER)
    }
}

/// Fixed page sweep used by the new-users listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSweep {
    pub pages: u32,
    pub per_page: u32,
}

impl Default for PageSweep {
    fn default() -> Self {
        Self { pages: DEFAULT_NEW_USERS_PAGES, per_page: DEFAULT_NEW_USERS_PER_PAGE }
    }
}

pub fn is_configured(value: &str) -> bool {
    let v = value.trim();
    !v.is_empty() && v != PLACEHOLDER
}

/// Optional TOML overlay named by `AIHEHUO_CONFIG`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub api: FileApi,
    pub export: FileExport,
    pub new_users: FileNewUsers,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FileApi {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub current_user_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FileExport {
    pub scratch_dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FileNewUsers {
    pub pages: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read { path: String, source: std::io::Error },
    #[error("invalid config file {path}: {source}")]
    Parse { path: String, source: toml::de::Error },
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let shown = path.display().to_string();
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: shown.clone(), source })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse { path: shown, source })
    }
}

fn env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_u32(key: &str) -> Option<u32> {
    env(key).and_then(|s| s.parse::<u32>().ok()).filter(|n| *n > 0)
}

impl Config {
    pub fn from_env() -> Self {
        Self::layered(FileConfig::default())
    }

    /// Environment over the optional `AIHEHUO_CONFIG` TOML file over defaults.
    pub fn from_env_and_toml() -> Result<Self, ConfigError> {
        let file = match env("AIHEHUO_CONFIG") {
            Some(p) => FileConfig::load(Path::new(&p))?,
            None => FileConfig::default(),
        };
        Ok(Self::layered(file))
    }

    fn layered(file: FileConfig) -> Self {
        let mode = env("MODE").unwrap_or_else(|| "stdio".into());
        let port = env("PORT")
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(8080);

        let api = ApiConfig {
            base_url: env("AIHEHUO_API_BASE")
                .or(file.api.base_url)
                .unwrap_or_else(|| DEFAULT_API_BASE.into()),
            api_key: env("AIHEHUO_API_KEY")
                .or(file.api.api_key)
                .unwrap_or_else(|| PLACEHOLDER.into()),
            current_user_id: env("CURRENT_USER_ID")
                .or(file.api.current_user_id)
                .unwrap_or_else(|| PLACEHOLDER.into()),
        };

        let scratch_dir = env("AIHEHUO_SCRATCH_DIR")
            .map(PathBuf::from)
            .or(file.export.scratch_dir)
            .unwrap_or_else(std::env::temp_dir);

        let defaults = PageSweep::default();
        let new_users = PageSweep {
            pages: env_u32("AIHEHUO_NEW_USERS_PAGES")
                .or(file.new_users.pages.filter(|n| *n > 0))
                .unwrap_or(defaults.pages),
            per_page: env_u32("AIHEHUO_NEW_USERS_PER_PAGE")
                .or(file.new_users.per_page.filter(|n| *n > 0))
                .unwrap_or(defaults.per_page),
        };

        Self { mode, port, api, scratch_dir, new_users }
    }

    /// Configuration for tests and embedding: given API settings, defaults elsewhere.
    pub fn with_api(api: ApiConfig) -> Self {
        Self {
            mode: "stdio".into(),
            port: 8080,
            api,
            scratch_dir: std::env::temp_dir(),
            new_users: PageSweep::default(),
        }
    }
}
