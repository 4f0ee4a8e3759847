use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use reelmatch_api::{MediaKind, Settings, SettingsProvider};

use crate::commit::CommitTarget;
use crate::error::CoreError;
use crate::reconcile::ReconcileOptions;
use crate::scorer::ScoringPolicy;

const DEFAULT_CONFIG: &str = include_str!("../../../config/default.toml");

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub reconcile: ReconcileConfig,
    pub scoring: ScoringPolicy,
    pub library: LibraryConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileConfig {
    pub concurrency: usize,
    pub wave_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryConfig {
    pub default_profile: Option<u64>,
    pub auto_search: bool,
    pub movie_root: Option<String>,
    pub series_root: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub filter: String,
    /// Also write daily log files here when set.
    pub directory: Option<PathBuf>,
}

impl AppConfig {
    /// Load config: user file (if exists) merged over built-in defaults.
    pub fn load() -> Result<Self, CoreError> {
        Self::load_from(&Self::config_path())
    }

    /// Load `path` merged over built-in defaults; a missing file yields the
    /// defaults.
    pub fn load_from(path: &Path) -> Result<Self, CoreError> {
        let mut merged: toml::Table =
            toml::from_str(DEFAULT_CONFIG).map_err(|e| CoreError::Config(e.to_string()))?;

        if path.exists() {
            let user_str = std::fs::read_to_string(path)?;
            let user: toml::Table =
                toml::from_str(&user_str).map_err(|e| CoreError::Config(e.to_string()))?;
            merge(&mut merged, user);
        }

        toml::Value::Table(merged)
            .try_into::<Self>()
            .map_err(|e| CoreError::Config(e.to_string()))
    }

    /// Path to user config file (XDG on Linux, AppData on Windows).
    pub fn config_path() -> PathBuf {
        Self::project_dirs()
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", "reelmatch")
    }

    pub fn reconcile_options(&self, kind: MediaKind) -> ReconcileOptions {
        ReconcileOptions {
            kind,
            concurrency: self.reconcile.concurrency,
            wave_delay: Duration::from_millis(self.reconcile.wave_delay_ms),
            policy: self.scoring.clone(),
        }
    }

    pub fn root_for(&self, kind: MediaKind) -> Option<&str> {
        match kind {
            MediaKind::Movie => self.library.movie_root.as_deref(),
            MediaKind::Series => self.library.series_root.as_deref(),
        }
    }

    pub fn commit_target(&self, kind: MediaKind) -> CommitTarget {
        CommitTarget {
            kind,
            profile_id: self.library.default_profile,
            root_folder: self.root_for(kind).map(str::to_string),
            search_on_add: self.library.auto_search,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("built-in default config is valid TOML")
    }
}

impl SettingsProvider for AppConfig {
    fn settings(&self) -> Settings {
        Settings {
            concurrency_limit: self.reconcile.concurrency,
            default_profile: self.library.default_profile,
            auto_search: self.library.auto_search,
        }
    }
}

/// Overlay `user` onto `base`, descending into tables.
fn merge(base: &mut toml::Table, user: toml::Table) {
    for (key, value) in user {
        let value = match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(base_table)), toml::Value::Table(user_table)) => {
                merge(base_table, user_table);
                continue;
            }
            (_, value) => value,
        };
        base.insert(key, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_parses() {
        let config = AppConfig::default();
        assert_eq!(config.reconcile.concurrency, 5);
        assert_eq!(config.reconcile.wave_delay_ms, 250);
        assert_eq!(config.scoring, ScoringPolicy::default());
        assert_eq!(config.library.default_profile, None);
        assert!(!config.library.auto_search);
        assert_eq!(config.logging.filter, "reelmatch=info");
    }

    #[test]
    fn test_missing_user_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.reconcile.concurrency, 5);
    }

    #[test]
    fn test_partial_user_file_merges() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[reconcile]\nconcurrency = 12\n\n[library]\ndefault_profile = 3\nmovie_root = \"/srv/movies\""
        )
        .unwrap();

        let config = AppConfig::load_from(file.path()).unwrap();
        assert_eq!(config.reconcile.concurrency, 12);
        assert_eq!(config.reconcile.wave_delay_ms, 250);
        assert_eq!(config.scoring.base_confidence, 70);
        assert_eq!(config.root_for(MediaKind::Movie), Some("/srv/movies"));
        assert_eq!(config.root_for(MediaKind::Series), None);

        let settings = config.settings();
        assert_eq!(settings.concurrency_limit, 12);
        assert_eq!(settings.default_profile, Some(3));
    }

    #[test]
    fn test_invalid_user_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[reconcile]\nconcurrency = \"many\"").unwrap();
        assert!(matches!(
            AppConfig::load_from(file.path()),
            Err(CoreError::Config(_))
        ));
    }

    #[test]
    fn test_reconcile_options() {
        let mut config = AppConfig::default();
        config.reconcile.concurrency = 50;
        let options = config.reconcile_options(MediaKind::Series);
        assert_eq!(options.wave_size(), 20);
        assert_eq!(options.wave_delay, Duration::from_millis(250));
        assert_eq!(options.kind, MediaKind::Series);
    }

    #[test]
    fn test_commit_target() {
        let mut config = AppConfig::default();
        config.library.default_profile = Some(1);
        config.library.series_root = Some("/srv/tv".into());
        let target = config.commit_target(MediaKind::Series);
        assert_eq!(target.profile_id, Some(1));
        assert_eq!(target.root_folder.as_deref(), Some("/srv/tv"));
    }
}
