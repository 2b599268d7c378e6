use secrecy::SecretString;
use serde::Serialize;

pub const ELIGIBLE_SHARE_TYPE: &str = "IPO";
pub const ELIGIBLE_SHARE_GROUP: &str = "Ordinary Shares";
pub const APPLY_ACTION: &str = "Apply";

/// 「My ASBA」列表中的一筆發行資訊
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Offer {
    /// Position of the block in the listing it was read from.
    pub index: usize,
    pub company_name: String,
    pub sub_group: Option<String>,
    pub share_type: String,
    pub share_group: String,
    pub action: Option<String>,
}

impl Offer {
    pub fn is_eligible(&self) -> bool {
        self.share_type.trim() == ELIGIBLE_SHARE_TYPE
            && self.share_group.trim() == ELIGIBLE_SHARE_GROUP
    }

    pub fn can_apply(&self) -> bool {
        self.action
            .as_deref()
            .map(|action| action.trim() == APPLY_ACTION)
            .unwrap_or(false)
    }

    pub fn matches_name(&self, name: &str) -> bool {
        self.company_name.trim().to_lowercase() == name.trim().to_lowercase()
    }

    /// Same company, sub group, share type and share group; position and
    /// action label are ignored.
    pub fn is_same_issue(&self, other: &Offer) -> bool {
        fn norm(value: Option<&str>) -> Option<String> {
            value.map(|v| v.trim().to_lowercase())
        }

        self.matches_name(&other.company_name)
            && norm(self.sub_group.as_deref()) == norm(other.sub_group.as_deref())
            && self.share_type.trim() == other.share_type.trim()
            && self.share_group.trim() == other.share_group.trim()
    }

    pub fn action_label(&self) -> &str {
        self.action.as_deref().unwrap_or("none")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BankChoice {
    First,
    /// Case-insensitive fragment of the option label.
    Named(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionChoice {
    First,
    Containing(String),
}

impl From<&BankChoice> for OptionChoice {
    fn from(choice: &BankChoice) -> Self {
        match choice {
            BankChoice::First => OptionChoice::First,
            BankChoice::Named(name) => OptionChoice::Containing(name.clone()),
        }
    }
}

#[derive(Debug)]
pub struct ApplicationForm {
    pub bank: BankChoice,
    pub kitta: u32,
    pub crn: String,
    pub pin: SecretString,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunMode {
    CheckOnly,
    ApplyAll,
    ApplyOne(String),
}

impl RunMode {
    pub fn applies(&self) -> bool {
        !matches!(self, RunMode::CheckOnly)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub offers: Vec<Offer>,
    pub eligible: Vec<Offer>,
    pub applied: Vec<AppliedOffer>,
    pub skipped: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedOffer {
    pub company_name: String,
    pub confirmation: String,
}
