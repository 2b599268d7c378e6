use crate::domain::model::OptionChoice;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// 元素定位方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Locator {
    Css(&'static str),
    XPath(&'static str),
}

impl Locator {
    pub fn expression(&self) -> &'static str {
        match self {
            Locator::Css(expr) | Locator::XPath(expr) => expr,
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Css(expr) => write!(f, "css `{}`", expr),
            Locator::XPath(expr) => write!(f, "xpath `{}`", expr),
        }
    }
}

/// Browser operations the workflow is written against.
///
/// Every operation that takes a timeout waits for its target to appear
/// before acting on it and fails with `PortalError::ElementTimeout`
/// otherwise.
#[async_trait]
pub trait PortalDriver: Send + Sync {
    async fn goto(&self, url: &str) -> Result<()>;

    async fn wait_for(&self, locator: Locator, timeout: Duration) -> Result<()>;

    async fn click(&self, locator: Locator, timeout: Duration) -> Result<()>;

    /// Clears the current value before typing.
    async fn fill(&self, locator: Locator, text: &str, timeout: Duration) -> Result<()>;

    async fn press_enter(&self, locator: Locator, timeout: Duration) -> Result<()>;

    /// Picks an option of a `<select>` and returns the label that was chosen.
    async fn select_option(
        &self,
        locator: Locator,
        choice: &OptionChoice,
        timeout: Duration,
    ) -> Result<String>;

    async fn read_text(&self, locator: Locator, timeout: Duration) -> Result<String>;

    /// For every element matching `block`, the trimmed text of the first
    /// match of each field locator inside it, in field order.
    async fn read_blocks(
        &self,
        block: Locator,
        fields: &[Locator],
    ) -> Result<Vec<Vec<Option<String>>>>;

    async fn click_in_block(&self, block: Locator, index: usize, target: Locator) -> Result<()>;

    async fn screenshot(&self, path: &Path) -> Result<()>;

    async fn close(&mut self) -> Result<()>;
}
