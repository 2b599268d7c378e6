use crate::domain::ports::PortalDriver;
use crate::domain::selectors;
use crate::utils::error::{PortalError, Result, Step};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// 可導覽的頁面區塊
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Asba,
}

impl FromStr for Section {
    type Err = PortalError;

    fn from_str(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "asba" => Ok(Section::Asba),
            _ => Err(PortalError::UnknownSection {
                name: name.to_string(),
            }),
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::Asba => f.write_str("My ASBA"),
        }
    }
}

pub struct Navigator<'a, D: PortalDriver + ?Sized> {
    driver: &'a D,
    timeout: Duration,
}

impl<'a, D: PortalDriver + ?Sized> Navigator<'a, D> {
    pub fn new(driver: &'a D, timeout: Duration) -> Self {
        Self { driver, timeout }
    }

    pub async fn navigate(&self, section: Section) -> Result<()> {
        let outcome = match section {
            Section::Asba => self.open_asba().await,
        };

        outcome.map_err(|e| {
            tracing::error!("Failed to navigate to {}: {}", section, e);
            e.during(Step::Navigate)
        })
    }

    /// Resolves a section by name first; unknown names fail as a navigation error.
    pub async fn navigate_to(&self, name: &str) -> Result<()> {
        let section = name.parse::<Section>().map_err(|e| {
            tracing::error!("Failed to navigate to {}: {}", name, e);
            e.during(Step::Navigate)
        })?;
        self.navigate(section).await
    }

    async fn open_asba(&self) -> Result<()> {
        self.driver
            .click(selectors::ASBA_LINK, self.timeout)
            .await?;
        tracing::info!("Navigated to My ASBA section");

        self.driver
            .wait_for(selectors::ASBA_CONTAINER, self.timeout)
            .await
    }
}
