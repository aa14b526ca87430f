//! src/config.rs
//! ============================================================================
//! # Config: Registration Form Configuration Loader and Saver
//!
//! Holds the page-level settings the form controller depends on: where the
//! region lookup lives, which placeholder texts the region selector shows,
//! avatar limits, the initial page state and logging. Loaded from and saved
//! to TOML in the platform config dir via
//! [`directories`](https://docs.rs/directories).
//!
//! ## Example
//! ```rust,ignore
//! let config = Config::load().await?;
//! let endpoint = config.lookup.endpoint()?;
//! ```

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;
use url::Url;

use tokio::fs as TokioFs;

use crate::AppError;
use crate::logging::LoggerConfig;
use crate::model::form_state::RegistrationTab;

/// Lookup path used when the page does not configure one.
pub const DEFAULT_API_URL: &str = "/users/api/regions";

/// Query parameter carrying the country id.
pub const DEFAULT_QUERY_PARAM: &str = "country_id";

/// Region lookup endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    /// Origin the lookup path is resolved against.
    pub base_url: String,

    /// Lookup path or absolute URL; blank or absent means
    /// [`DEFAULT_API_URL`].
    pub api_url: Option<String>,

    pub query_param: String,

    #[serde(with = "humantime_serde")]
    pub timeout: Duration,

    /// Serve regions from a JSON file instead of HTTP.
    pub fixture_path: Option<PathBuf>,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000/".to_string(),
            api_url: None,
            query_param: DEFAULT_QUERY_PARAM.to_string(),
            timeout: Duration::from_secs(10),
            fixture_path: None,
        }
    }
}

impl LookupConfig {
    pub fn api_url(&self) -> &str {
        match self.api_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => url,
            _ => DEFAULT_API_URL,
        }
    }

    /// Fully resolved lookup URL, without the query string.
    pub fn endpoint(&self) -> Result<Url, AppError> {
        let base = Url::parse(&self.base_url)
            .map_err(|e| AppError::invalid_input("lookup.base_url", e.to_string()))?;
        base.join(self.api_url())
            .map_err(|e| AppError::invalid_input("lookup.api_url", e.to_string()))
    }
}

/// Placeholder entries of the region selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionLabels {
    pub loading: String,
    pub choose_country_first: String,
    pub choose_region: String,
    pub no_regions: String,
    pub load_failed: String,
}

impl Default for RegionLabels {
    fn default() -> Self {
        Self {
            loading: "Loading...".to_string(),
            choose_country_first: "Choose a country first".to_string(),
            choose_region: "Choose a region".to_string(),
            no_regions: "This country has no regions".to_string(),
            load_failed: "Failed to load regions".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AvatarConfig {
    /// Files above this size are rejected before reading.
    pub max_bytes: u64,

    /// Lowercase extensions accepted as images.
    pub extensions: Vec<String>,
}

impl Default for AvatarConfig {
    fn default() -> Self {
        Self {
            max_bytes: 5 * 1024 * 1024,
            extensions: ["png", "jpg", "jpeg", "gif", "webp", "bmp", "svg"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

/// Page state as rendered before the controller initializes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    pub initial_tab: RegistrationTab,
    pub fop_checked: bool,
    pub initial_country: Option<String>,
    pub initial_region: Option<String>,
}

/// Main configuration struct for the application.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub lookup: LookupConfig,

    #[serde(default)]
    pub labels: RegionLabels,

    #[serde(default)]
    pub avatar: AvatarConfig,

    #[serde(default)]
    pub form: FormConfig,

    #[serde(default)]
    pub logging: LoggerConfig,
}

impl Config {
    /// Loads config from TOML file at the platform config dir, or writes
    /// and returns defaults.
    pub async fn load() -> Result<Self, AppError> {
        let path = Self::config_path()?;
        if path.exists() {
            Self::from_path(&path).await
        } else {
            info!(
                "No config file found at {}, using default configuration. Creating it now.",
                path.display()
            );

            let default_config = Self::default();
            default_config.save_to(&path).await?;

            Ok(default_config)
        }
    }

    /// Loads config from an explicit TOML file.
    pub async fn from_path(path: &Path) -> Result<Self, AppError> {
        info!("Loading config from {}", path.display());
        let text = TokioFs::read_to_string(path)
            .await
            .map_err(|source| AppError::ConfigIo {
                path: path.to_path_buf(),
                source,
            })?;
        let cfg: Self = toml::from_str(&text)?;
        cfg.lookup.endpoint()?;

        Ok(cfg)
    }

    pub async fn save_to(&self, path: &Path) -> Result<(), AppError> {
        info!("Saving config to {}", path.display());

        if let Some(parent) = path.parent() {
            TokioFs::create_dir_all(parent).await?;
        }

        let toml_str = toml::to_string_pretty(self)?;
        TokioFs::write(path, toml_str).await?;

        Ok(())
    }

    /// Returns the canonical config file path using `directories::ProjectDirs`.
    pub fn config_path() -> Result<PathBuf, AppError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    pub fn config_dir() -> Result<PathBuf, AppError> {
        let proj_dirs = ProjectDirs::from("org", "example", "RegForm")
            .ok_or_else(|| AppError::Other("Could not determine config directory.".into()))?;
        Ok(proj_dirs.config_dir().to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_api_url_falls_back_to_default() {
        let mut lookup = LookupConfig::default();
        assert_eq!(lookup.api_url(), DEFAULT_API_URL);

        lookup.api_url = Some("   ".into());
        assert_eq!(lookup.api_url(), DEFAULT_API_URL);

        lookup.api_url = Some("/api/v2/regions".into());
        assert_eq!(
            lookup.endpoint().unwrap().as_str(),
            "http://127.0.0.1:8000/api/v2/regions"
        );
    }

    #[test]
    fn test_absolute_api_url_overrides_base() {
        let lookup = LookupConfig {
            api_url: Some("https://geo.example.com/regions".into()),
            ..LookupConfig::default()
        };
        assert_eq!(
            lookup.endpoint().unwrap().as_str(),
            "https://geo.example.com/regions"
        );
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            [lookup]
            timeout = "250ms"

            [labels]
            loading = "Загрузка..."

            [form]
            initial_tab = "individual"
            fop_checked = true
            "#,
        )
        .unwrap();

        assert_eq!(cfg.lookup.timeout, Duration::from_millis(250));
        assert_eq!(cfg.lookup.query_param, DEFAULT_QUERY_PARAM);
        assert_eq!(cfg.labels.loading, "Загрузка...");
        assert_eq!(cfg.labels.choose_region, RegionLabels::default().choose_region);
        assert_eq!(cfg.form.initial_tab, RegistrationTab::Individual);
        assert!(cfg.form.fop_checked);
        assert_eq!(cfg.avatar.max_bytes, 5 * 1024 * 1024);
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.lookup.api_url = Some("/geo/regions".into());
        cfg.form.initial_country = Some("UA".into());
        cfg.save_to(&path).await.unwrap();

        let loaded = Config::from_path(&path).await.unwrap();
        assert_eq!(loaded.lookup.api_url(), "/geo/regions");
        assert_eq!(loaded.form.initial_country.as_deref(), Some("UA"));
    }

    #[tokio::test]
    async fn test_missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        match Config::from_path(&path).await {
            Err(AppError::ConfigIo { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected ConfigIo, got {other:?}"),
        }
    }
}
