use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::Level;

const CONFIG_FILE: &str = "config.json";

const CONFIG_TEMPLATE: &str = r#"{
  "database": {
    "url": "sqlite://cardnorm.db?mode=rwc"
  },
  "analysis": {
    "batch_limit": 500,
    "time_budget_secs": 300,
    "page_size": 200
  },
  "logging": {
    "level": "info"
  }
}"#;

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    #[serde(default = "DatabaseConfig::default_url")]
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: Self::default_url(),
        }
    }
}

impl DatabaseConfig {
    fn default_url() -> String {
        "sqlite://cardnorm.db?mode=rwc".to_string()
    }
}

/// Batch sizing. `None` means unbounded.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AnalysisConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_limit: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_budget_secs: Option<u64>,
    /// Pending records read per query.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u64>,
}

impl AnalysisConfig {
    #[must_use]
    pub fn time_budget(&self) -> Option<Duration> {
        self.time_budget_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
        }
    }
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_string()
    }

    /// The configured level, falling back to `INFO` for unrecognized names.
    #[must_use]
    pub fn max_level(&self) -> Level {
        self.level.parse().unwrap_or(Level::INFO)
    }
}

impl Config {
    /// `~/cardnorm`
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        Ok(dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
            .join("cardnorm"))
    }

    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_dir()?.join(CONFIG_FILE))
    }

    pub fn load_from(config_path: &Path) -> anyhow::Result<Self> {
        if !config_path.exists() {
            anyhow::bail!(
                "Config file not found at: {}. Please run 'cardnorm init' to create config.",
                config_path.display()
            );
        }

        let content = std::fs::read_to_string(config_path)?;
        let config: Self = serde_json::from_str(&content)?;

        Ok(config)
    }

    /// Like [`Config::load`], but a missing file yields the defaults.
    pub fn load_or_default() -> anyhow::Result<Self> {
        let config_path = Self::config_dir()?.join(CONFIG_FILE);
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn ensure_config_dir() -> anyhow::Result<PathBuf> {
        let config_dir = Self::config_dir()?;
        std::fs::create_dir_all(&config_dir)?;
        Ok(config_dir)
    }

    pub fn create_config() -> anyhow::Result<()> {
        let config_path = Self::create_config_in(&Self::ensure_config_dir()?)?;

        println!("✅ Created config file at: {}", config_path.display());
        println!();
        println!("📝 Next steps:");
        println!("   1. Point database.url at your SQLite file or PostgreSQL server");
        println!("   2. Run 'cardnorm info' to check the connection");
        println!("   3. Run 'cardnorm analyze' to normalize pending records");
        println!();
        Ok(())
    }

    /// Write the template config into `config_dir`, refusing to overwrite.
    pub fn create_config_in(config_dir: &Path) -> anyhow::Result<PathBuf> {
        let config_path = config_dir.join(CONFIG_FILE);

        if config_path.exists() {
            anyhow::bail!(
                "Config file already exists at: {}. Please edit it directly.",
                config_path.display()
            );
        }

        std::fs::write(&config_path, CONFIG_TEMPLATE)?;
        Ok(config_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "cardnorm-config-{name}-{}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        let _ = std::fs::create_dir_all(&dir);
        dir
    }

    #[test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    fn template_parses() {
        let config: Config = serde_json::from_str(CONFIG_TEMPLATE).expect("template is valid");
        assert_eq!(config.analysis.batch_limit, Some(500));
        assert_eq!(config.analysis.time_budget(), Some(Duration::from_secs(300)));
        assert_eq!(config.analysis.page_size, Some(200));
        assert_eq!(config.logging.max_level(), Level::INFO);
    }

    #[test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    fn missing_sections_use_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"logging": {"level": "debug"}}"#).expect("partial config");
        assert_eq!(config.database.url, DatabaseConfig::default_url());
        assert_eq!(config.analysis.batch_limit, None);
        assert_eq!(config.analysis.time_budget(), None);
        assert_eq!(config.analysis.page_size, None);
        assert_eq!(config.logging.max_level(), Level::DEBUG);
    }

    #[test]
    fn unknown_level_falls_back_to_info() {
        let logging = LoggingConfig {
            level: "chatty".to_string(),
        };
        assert_eq!(logging.max_level(), Level::INFO);
    }

    #[test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    fn create_then_load() {
        let dir = scratch_dir("create");
        let path = Config::create_config_in(&dir).expect("first create");
        assert!(Config::create_config_in(&dir).is_err());

        let config = Config::load_from(&path).expect("load created config");
        assert_eq!(config.database.url, "sqlite://cardnorm.db?mode=rwc");
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = scratch_dir("missing");
        let err = Config::load_from(&dir.join(CONFIG_FILE))
            .err()
            .map(|e| e.to_string())
            .unwrap_or_default();
        assert!(err.contains("cardnorm init"));
    }
}
