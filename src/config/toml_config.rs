use crate::config::settings::MergeSettings;
use crate::core::timer::TimerSchedule;
use crate::domain::ports::ConfigurationSource;
use crate::utils::error::{MergeUserError, Result};
use crate::utils::validation::Validate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub job: JobConfig,
    pub schedule: Option<ScheduleConfig>,
    pub store: StoreConfig,
    #[serde(default)]
    pub settings: BTreeMap<String, toml::Value>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    pub interval_minutes: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub path: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    #[serde(default)]
    pub format: LogFormat,
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("static regex is valid"))
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);
        Ok(toml::from_str(&processed_content)?)
    }

    /// 替換環境變數 (例如 ${DEFAULT_USER})，找不到的變數保留原樣
    fn substitute_env_vars(content: &str) -> String {
        env_var_pattern()
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn schedule(&self) -> TimerSchedule {
        TimerSchedule::from_config(self.schedule.as_ref().and_then(|s| s.interval_minutes))
    }

    pub fn store_path(&self) -> &str {
        &self.store.path
    }

    pub fn log_format(&self) -> LogFormat {
        self.logging.as_ref().map(|l| l.format).unwrap_or_default()
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        crate::utils::validation::validate_path("store.path", &self.store.path)?;

        if let Some(minutes) = self.schedule.as_ref().and_then(|s| s.interval_minutes) {
            crate::utils::validation::validate_range("schedule.interval_minutes", minutes, 1, 1440)?;
        }

        // 設定值在每次執行時都會重新讀取，這裡先確認啟動時就是可用的
        MergeSettings::load(self)?;

        Ok(())
    }
}

fn setting_to_string(value: &toml::Value) -> Option<String> {
    match value {
        toml::Value::String(s) => Some(s.clone()),
        toml::Value::Integer(i) => Some(i.to_string()),
        toml::Value::Float(f) => Some(f.to_string()),
        toml::Value::Boolean(b) => Some(b.to_string()),
        _ => None,
    }
}

impl ConfigurationSource for TomlConfig {
    fn get_setting(&self, name: &str) -> Result<Option<String>> {
        match self.settings.get(name) {
            None => Ok(None),
            Some(value) => setting_to_string(value).map(Some).ok_or_else(|| {
                MergeUserError::InvalidSettingError {
                    name: name.to_string(),
                    value: value.to_string(),
                    reason: "Settings must be plain strings, numbers or booleans".to_string(),
                }
            }),
        }
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

/// Reads `[settings]` from the config file on every lookup, so edits made
/// while the job is running apply from the next run on.
#[derive(Debug, Clone)]
pub struct SettingsFile {
    path: PathBuf,
}

impl SettingsFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigurationSource for SettingsFile {
    fn get_setting(&self, name: &str) -> Result<Option<String>> {
        TomlConfig::from_file(&self.path)?.get_setting(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::{DEFAULT_USER, DISABLED_FOR_DAYS};
    use std::io::Write;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    const BASIC: &str = r#"
[job]
name = "merge-user"

[schedule]
interval_minutes = 15

[store]
path = "./accounts.json"

[settings]
disabledForDays = 30
defaultUser = "admin"
"#;

    #[test]
    fn test_parse_basic_toml_config() {
        let config = TomlConfig::from_toml_str(BASIC).unwrap();

        assert_eq!(config.job.name, "merge-user");
        assert_eq!(config.store_path(), "./accounts.json");
        assert_eq!(config.schedule().as_duration(), Duration::from_secs(15 * 60));
        assert_eq!(config.log_format(), LogFormat::Compact);
        assert_eq!(
            config.get_setting(DISABLED_FOR_DAYS).unwrap().as_deref(),
            Some("30")
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_schedule_defaults_to_five_minutes() {
        let toml_content = r#"
[job]
name = "merge-user"

[store]
path = "./accounts.json"

[settings]
disabledForDays = "10"
defaultUser = "admin"

[logging]
format = "json"
"#;
        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.schedule(), TimerSchedule::default());
        assert_eq!(config.schedule().as_duration(), Duration::from_secs(300));
        assert_eq!(config.log_format(), LogFormat::Json);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("MERGE_USER_TEST_DEFAULT", "service-desk");

        let toml_content = r#"
[job]
name = "merge-user"

[store]
path = "./accounts.json"

[settings]
disabledForDays = "30"
defaultUser = "${MERGE_USER_TEST_DEFAULT}"
untouched = "${MERGE_USER_TEST_NOT_SET}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(
            config.get_setting(DEFAULT_USER).unwrap().as_deref(),
            Some("service-desk")
        );
        assert_eq!(
            config.get_setting("untouched").unwrap().as_deref(),
            Some("${MERGE_USER_TEST_NOT_SET}")
        );

        std::env::remove_var("MERGE_USER_TEST_DEFAULT");
    }

    #[test]
    fn test_config_validation() {
        let bad_threshold = BASIC.replace("disabledForDays = 30", "disabledForDays = \"soon\"");
        let config = TomlConfig::from_toml_str(&bad_threshold).unwrap();
        assert!(config.validate().is_err());

        let bad_interval = BASIC.replace("interval_minutes = 15", "interval_minutes = 0");
        let config = TomlConfig::from_toml_str(&bad_interval).unwrap();
        assert!(config.validate().is_err());

        let nested = BASIC.replace("defaultUser = \"admin\"", "defaultUser = [\"admin\"]");
        let config = TomlConfig::from_toml_str(&nested).unwrap();
        assert!(config.get_setting(DEFAULT_USER).is_err());
    }

    #[test]
    fn test_settings_file_rereads_on_lookup() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(BASIC.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let source = SettingsFile::new(temp_file.path());
        assert_eq!(source.get_setting(DISABLED_FOR_DAYS).unwrap().as_deref(), Some("30"));

        std::fs::write(
            temp_file.path(),
            BASIC.replace("disabledForDays = 30", "disabledForDays = 60"),
        )
        .unwrap();
        assert_eq!(source.get_setting(DISABLED_FOR_DAYS).unwrap().as_deref(), Some("60"));
    }
}
