use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// 工作流程中的步驟，用於錯誤上下文與截圖檔名
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Launch,
    Login,
    Navigate,
    ListOffers,
    Apply,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::Launch => "launch",
            Step::Login => "login",
            Step::Navigate => "navigate",
            Step::ListOffers => "list_offers",
            Step::Apply => "apply",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Step::Launch => "launch browser",
            Step::Login => "login",
            Step::Navigate => "navigate",
            Step::ListOffers => "list offers",
            Step::Apply => "apply",
        };
        f.write_str(label)
    }
}

#[derive(Error, Debug)]
pub enum PortalError {
    #[error("Missing required environment variables: {}", .names.join(", "))]
    MissingEnv { names: Vec<String> },

    #[error("Invalid value for {field} ('{value}'): {reason}")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Settings file parsing failed: {0}")]
    ConfigFile(#[from] toml::de::Error),

    #[error("Cannot read settings file {}: {source}", .path.display())]
    SettingsUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Browser unavailable: {message}")]
    BrowserUnavailable { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Browser operation failed: {0}")]
    Browser(#[from] chromiumoxide::error::CdpError),

    #[error("Timed out after {timeout:?} waiting for {locator}")]
    ElementTimeout { locator: String, timeout: Duration },

    #[error("Element not found: {locator}")]
    ElementMissing { locator: String },

    #[error("Unknown navigation element: {name}")]
    UnknownSection { name: String },

    #[error("IPO with name '{name}' not found among available IPOs")]
    OfferNotFound { name: String },

    #[error("IPO '{name}' cannot be applied for (action: {action})")]
    NotApplicable { name: String, action: String },

    #[error("Operation interrupted by user")]
    Interrupted,

    #[error("Failed to {step}: {source}")]
    StepFailed {
        step: Step,
        #[source]
        source: Box<PortalError>,
    },
}

impl PortalError {
    /// 附加步驟上下文；已帶有步驟的錯誤保持不變
    pub fn during(self, step: Step) -> Self {
        match self {
            PortalError::StepFailed { .. } => self,
            other => PortalError::StepFailed {
                step,
                source: Box::new(other),
            },
        }
    }

    pub fn step(&self) -> Option<Step> {
        match self {
            PortalError::StepFailed { step, .. } => Some(*step),
            _ => None,
        }
    }

    pub fn is_config_error(&self) -> bool {
        match self {
            PortalError::MissingEnv { .. }
            | PortalError::InvalidConfigValue { .. }
            | PortalError::ConfigFile(_)
            | PortalError::SettingsUnreadable { .. } => true,
            PortalError::StepFailed { source, .. } => source.is_config_error(),
            _ => false,
        }
    }

    /// 行程結束碼：配置錯誤為 2，其他失敗為 1
    pub fn exit_code(&self) -> i32 {
        if self.is_config_error() {
            2
        } else {
            1
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            PortalError::MissingEnv { .. } => "Please set these variables in your .env file",
            PortalError::InvalidConfigValue { .. }
            | PortalError::ConfigFile(_)
            | PortalError::SettingsUnreadable { .. } => {
                "Check the settings file and environment values"
            }
            PortalError::BrowserUnavailable { .. } => {
                "Install Chromium or set browser.chrome_path in the settings file"
            }
            PortalError::ElementTimeout { .. } | PortalError::ElementMissing { .. } => {
                "The portal may be slow or its layout changed; inspect the error screenshot"
            }
            PortalError::OfferNotFound { .. } => "Run with --check-only to list open IPOs",
            PortalError::NotApplicable { .. } => "The IPO has probably been applied for already",
            PortalError::StepFailed { source, .. } => source.recovery_suggestion(),
            _ => "Re-run with --verbose for more detail",
        }
    }
}

pub type Result<T> = std::result::Result<T, PortalError>;
