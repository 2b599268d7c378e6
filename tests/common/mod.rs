#![allow(dead_code)]

use async_trait::async_trait;
use meroshare_ipo::config::env::{CRN_VAR, DP_ID_VAR, PASSWORD_VAR, PIN_VAR, USERNAME_VAR};
use meroshare_ipo::config::Timeouts;
use meroshare_ipo::domain::model::OptionChoice;
use meroshare_ipo::domain::ports::{Locator, PortalDriver};
use meroshare_ipo::{EngineOptions, Environment, PortalError, Result, RunMode};
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const LOGIN_URL: &str = "https://meroshare.test/#/login";
pub const TOAST: &str = "Share has been applied successfully.";

/// One recorded browser interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Goto(String),
    WaitFor(Locator),
    Click(Locator),
    Fill(Locator, String),
    PressEnter(Locator),
    Select(Locator, OptionChoice),
    ReadText(Locator),
    ReadBlocks(Locator),
    ClickInBlock(usize, Locator),
    Screenshot(PathBuf),
    Close,
}

type Rows = Vec<Vec<Option<String>>>;

#[derive(Default)]
struct State {
    actions: Vec<Action>,
    listings: VecDeque<Rows>,
    absent: HashSet<Locator>,
}

/// In-memory portal: records every call and answers from a script.
///
/// Each `read_blocks` call consumes the next queued listing; the last one
/// is repeated once the queue runs dry.
#[derive(Clone, Default)]
pub struct ScriptedDriver {
    state: Arc<Mutex<State>>,
}

impl ScriptedDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_listing(self, rows: Rows) -> Self {
        self.state.lock().unwrap().listings.push_back(rows);
        self
    }

    /// Any operation on `locator` times out.
    pub fn with_absent(self, locator: Locator) -> Self {
        self.state.lock().unwrap().absent.insert(locator);
        self
    }

    pub fn actions(&self) -> Vec<Action> {
        self.state.lock().unwrap().actions.clone()
    }

    fn record(&self, action: Action) {
        self.state.lock().unwrap().actions.push(action);
    }

    fn check(&self, locator: Locator) -> Result<()> {
        if self.state.lock().unwrap().absent.contains(&locator) {
            return Err(PortalError::ElementTimeout {
                locator: locator.to_string(),
                timeout: Duration::from_secs(1),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl PortalDriver for ScriptedDriver {
    async fn goto(&self, url: &str) -> Result<()> {
        self.record(Action::Goto(url.to_string()));
        Ok(())
    }

    async fn wait_for(&self, locator: Locator, _timeout: Duration) -> Result<()> {
        self.record(Action::WaitFor(locator));
        self.check(locator)
    }

    async fn click(&self, locator: Locator, _timeout: Duration) -> Result<()> {
        self.record(Action::Click(locator));
        self.check(locator)
    }

    async fn fill(&self, locator: Locator, text: &str, _timeout: Duration) -> Result<()> {
        self.record(Action::Fill(locator, text.to_string()));
        self.check(locator)
    }

    async fn press_enter(&self, locator: Locator, _timeout: Duration) -> Result<()> {
        self.record(Action::PressEnter(locator));
        self.check(locator)
    }

    async fn select_option(
        &self,
        locator: Locator,
        choice: &OptionChoice,
        _timeout: Duration,
    ) -> Result<String> {
        self.record(Action::Select(locator, choice.clone()));
        self.check(locator)?;
        Ok(match choice {
            OptionChoice::First => "First Option".to_string(),
            OptionChoice::Containing(text) => text.clone(),
        })
    }

    async fn read_text(&self, locator: Locator, _timeout: Duration) -> Result<String> {
        self.record(Action::ReadText(locator));
        self.check(locator)?;
        Ok(TOAST.to_string())
    }

    async fn read_blocks(&self, block: Locator, _fields: &[Locator]) -> Result<Rows> {
        self.record(Action::ReadBlocks(block));
        let mut state = self.state.lock().unwrap();
        let rows = if state.listings.len() > 1 {
            state.listings.pop_front().unwrap_or_default()
        } else {
            state.listings.front().cloned().unwrap_or_default()
        };
        Ok(rows)
    }

    async fn click_in_block(&self, _block: Locator, index: usize, target: Locator) -> Result<()> {
        self.record(Action::ClickInBlock(index, target));
        self.check(target)
    }

    async fn screenshot(&self, path: &Path) -> Result<()> {
        self.record(Action::Screenshot(path.to_path_buf()));
        std::fs::write(path, b"")?;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.record(Action::Close);
        Ok(())
    }
}

/// One listing row in field order: name, sub group, share type, share group, action.
pub fn row(
    name: &str,
    share_type: &str,
    share_group: &str,
    action: Option<&str>,
) -> Vec<Option<String>> {
    vec![
        Some(name.to_string()),
        Some("For General Public".to_string()),
        Some(share_type.to_string()),
        Some(share_group.to_string()),
        action.map(str::to_string),
    ]
}

/// Eligible ordinary-share IPO row under an explicit sub group.
pub fn group_row(name: &str, sub_group: &str, action: &str) -> Vec<Option<String>> {
    vec![
        Some(name.to_string()),
        Some(sub_group.to_string()),
        Some("IPO".to_string()),
        Some("Ordinary Shares".to_string()),
        Some(action.to_string()),
    ]
}

pub fn env_vars() -> HashMap<String, String> {
    [
        (USERNAME_VAR, "ram"),
        (PASSWORD_VAR, "hunter2"),
        (DP_ID_VAR, "13700"),
        (CRN_VAR, "R00123456"),
        (PIN_VAR, "9876"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

pub fn environment(mode: &RunMode, vars: &HashMap<String, String>) -> Environment {
    Environment::from_lookup(mode, |key| vars.get(key).cloned()).unwrap()
}

pub fn options(screenshot_dir: &Path) -> EngineOptions {
    EngineOptions {
        login_url: LOGIN_URL.to_string(),
        timeouts: Timeouts::default(),
        screenshot_dir: screenshot_dir.to_path_buf(),
    }
}
