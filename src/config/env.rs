use crate::domain::model::{ApplicationForm, BankChoice, RunMode};
use crate::utils::error::{PortalError, Result};
use crate::utils::validation::{validate_digits, validate_positive_number};
use secrecy::SecretString;

pub const USERNAME_VAR: &str = "MEROSHARE_USERNAME";
pub const PASSWORD_VAR: &str = "MEROSHARE_PASSWORD";
pub const DP_ID_VAR: &str = "MEROSHARE_DP_ID";
pub const CRN_VAR: &str = "MEROSHARE_CRN";
pub const PIN_VAR: &str = "MEROSHARE_PIN";
pub const BANK_VAR: &str = "MEROSHARE_BANK";
pub const KITTA_VAR: &str = "MEROSHARE_KITTA";

pub const DEFAULT_KITTA: u32 = 10;

const REQUIRED_VARS: [&str; 4] = [USERNAME_VAR, PASSWORD_VAR, DP_ID_VAR, CRN_VAR];

/// 登入所需的帳號資訊
#[derive(Debug)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
    pub dp_id: String,
}

/// Everything read from the environment for one run.
#[derive(Debug)]
pub struct Environment {
    pub credentials: Credentials,
    /// Present only for modes that submit applications.
    pub application: Option<ApplicationForm>,
}

impl Environment {
    /// 載入 .env 後從行程環境讀取
    pub fn load(mode: &RunMode) -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!("Loaded environment from {}", path.display());
        }
        Self::from_lookup(mode, |key| std::env::var(key).ok())
    }

    /// Reads every value through `lookup`; empty values count as missing.
    pub fn from_lookup<F>(mode: &RunMode, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let mut required: Vec<&str> = REQUIRED_VARS.to_vec();
        if mode.applies() {
            required.push(PIN_VAR);
        }

        let missing: Vec<String> = required
            .iter()
            .filter(|key| get(key).is_none())
            .map(|key| key.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(PortalError::MissingEnv { names: missing });
        }

        let require = |key: &str| {
            get(key).ok_or_else(|| PortalError::MissingEnv {
                names: vec![key.to_string()],
            })
        };

        let credentials = Credentials {
            username: require(USERNAME_VAR)?,
            password: SecretString::from(require(PASSWORD_VAR)?),
            dp_id: require(DP_ID_VAR)?.trim().to_string(),
        };

        let application = if mode.applies() {
            let pin = require(PIN_VAR)?.trim().to_string();
            validate_digits(PIN_VAR, &pin)?;

            let kitta = match get(KITTA_VAR) {
                Some(raw) => parse_kitta(&raw)?,
                None => DEFAULT_KITTA,
            };

            let bank = match get(BANK_VAR) {
                Some(name) => BankChoice::Named(name.trim().to_string()),
                None => BankChoice::First,
            };

            Some(ApplicationForm {
                bank,
                kitta,
                crn: require(CRN_VAR)?.trim().to_string(),
                pin: SecretString::from(pin),
            })
        } else {
            None
        };

        Ok(Self {
            credentials,
            application,
        })
    }
}

fn parse_kitta(raw: &str) -> Result<u32> {
    let kitta: u32 = raw
        .trim()
        .parse()
        .map_err(|_| PortalError::InvalidConfigValue {
            field: KITTA_VAR.to_string(),
            value: raw.to_string(),
            reason: "Value must be a positive integer".to_string(),
        })?;
    validate_positive_number(KITTA_VAR, kitta, 1)?;
    Ok(kitta)
}
