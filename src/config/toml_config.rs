use crate::domain::selectors::DEFAULT_LOGIN_URL;
use crate::utils::error::{PortalError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_positive_number, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Optional settings file; every section and key has a default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub portal: PortalConfig,
    pub browser: BrowserConfig,
    pub timeouts: TimeoutConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    pub login_url: String,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            login_url: DEFAULT_LOGIN_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub headless: bool,
    pub chrome_path: Option<PathBuf>,
    pub window_width: u32,
    pub window_height: u32,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: false,
            chrome_path: None,
            window_width: 1920,
            window_height: 1080,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    pub login_secs: u64,
    pub navigation_secs: u64,
    pub form_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            login_secs: 60,
            navigation_secs: 10,
            form_secs: 20,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub screenshot_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            screenshot_dir: PathBuf::from("."),
        }
    }
}

/// 各階段等待時間
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub login: Duration,
    pub navigation: Duration,
    pub form: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        TimeoutConfig::default().to_timeouts()
    }
}

impl TimeoutConfig {
    pub fn to_timeouts(&self) -> Timeouts {
        Timeouts {
            login: Duration::from_secs(self.login_secs),
            navigation: Duration::from_secs(self.navigation_secs),
            form: Duration::from_secs(self.form_secs),
        }
    }
}

impl Settings {
    /// 從 TOML 檔案載入設定
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|source| {
            PortalError::SettingsUnreadable {
                path: path.as_ref().to_path_buf(),
                source,
            }
        })?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析設定
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// 有指定路徑時讀檔，否則使用預設值
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                tracing::debug!("Loading settings from {}", path.display());
                Self::from_file(path)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn timeouts(&self) -> Timeouts {
        self.timeouts.to_timeouts()
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validate_url("portal.login_url", &self.portal.login_url)?;

        validate_positive_number("timeouts.login_secs", self.timeouts.login_secs, 1)?;
        validate_positive_number("timeouts.navigation_secs", self.timeouts.navigation_secs, 1)?;
        validate_positive_number("timeouts.form_secs", self.timeouts.form_secs, 1)?;

        validate_positive_number("browser.window_width", self.browser.window_width, 100)?;
        validate_positive_number("browser.window_height", self.browser.window_height, 100)?;

        if let Some(path) = &self.browser.chrome_path {
            validate_non_empty_string("browser.chrome_path", &path.to_string_lossy())?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_file_uses_defaults() {
        let settings = Settings::from_toml_str("").unwrap();

        assert_eq!(settings.portal.login_url, DEFAULT_LOGIN_URL);
        assert!(!settings.browser.headless);
        assert_eq!(settings.browser.window_width, 1920);
        assert_eq!(settings.timeouts().login, Duration::from_secs(60));
        assert_eq!(settings.timeouts().navigation, Duration::from_secs(10));
        assert_eq!(settings.output.screenshot_dir, PathBuf::from("."));
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let toml_content = r#"
[browser]
headless = true
chrome_path = "/usr/bin/chromium"

[timeouts]
login_secs = 90
"#;

        let settings = Settings::from_toml_str(toml_content).unwrap();

        assert!(settings.browser.headless);
        assert_eq!(
            settings.browser.chrome_path,
            Some(PathBuf::from("/usr/bin/chromium"))
        );
        assert_eq!(settings.browser.window_height, 1080);
        assert_eq!(settings.timeouts().login, Duration::from_secs(90));
        assert_eq!(settings.timeouts().form, Duration::from_secs(20));
    }

    #[test]
    fn test_settings_validation() {
        let bad_url = Settings::from_toml_str("[portal]\nlogin_url = \"not-a-url\"\n").unwrap();
        assert!(bad_url.validate().is_err());

        let zero_timeout = Settings::from_toml_str("[timeouts]\nform_secs = 0\n").unwrap();
        assert!(zero_timeout.validate().is_err());

        let tiny_window = Settings::from_toml_str("[browser]\nwindow_width = 10\n").unwrap();
        assert!(tiny_window.validate().is_err());

        let blank_browser = Settings::from_toml_str("[browser]\nchrome_path = \"  \"\n").unwrap();
        let err = blank_browser.validate().unwrap_err();
        assert!(err.to_string().contains("browser.chrome_path"));
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        let err = Settings::from_toml_str("[timeouts]\nlogin_secs = \"soon\"\n").unwrap_err();
        assert!(matches!(err, PortalError::ConfigFile(_)));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_settings_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[output]\nscreenshot_dir = \"/tmp/meroshare\"\n")
            .unwrap();

        let settings = Settings::load(Some(temp_file.path())).unwrap();
        assert_eq!(
            settings.output.screenshot_dir,
            PathBuf::from("/tmp/meroshare")
        );
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = Settings::load(Some(Path::new("/nonexistent/meroshare.toml"))).unwrap_err();
        assert!(matches!(err, PortalError::SettingsUnreadable { .. }));
        assert!(err.to_string().contains("/nonexistent/meroshare.toml"));
        assert_eq!(err.exit_code(), 2);
    }
}
