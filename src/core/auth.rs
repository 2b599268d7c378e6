use crate::config::Credentials;
use crate::domain::ports::PortalDriver;
use crate::domain::selectors;
use crate::utils::error::{Result, Step};
use secrecy::ExposeSecret;
use std::time::Duration;

/// Fills the Meroshare login form and waits for the logged-in header.
pub struct Authenticator<'a, D: PortalDriver + ?Sized> {
    driver: &'a D,
    login_url: &'a str,
    timeout: Duration,
}

impl<'a, D: PortalDriver + ?Sized> Authenticator<'a, D> {
    pub fn new(driver: &'a D, login_url: &'a str, timeout: Duration) -> Self {
        Self {
            driver,
            login_url,
            timeout,
        }
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<()> {
        self.submit(credentials).await.map_err(|e| {
            tracing::error!("Failed to login: {}", e);
            e.during(Step::Login)
        })
    }

    async fn submit(&self, credentials: &Credentials) -> Result<()> {
        let driver = self.driver;

        driver.goto(self.login_url).await?;
        tracing::info!("Navigated to Meroshare login page");

        driver.wait_for(selectors::DP_DROPDOWN, self.timeout).await?;
        driver.click(selectors::DP_DROPDOWN, self.timeout).await?;
        tracing::info!("Clicked on DP dropdown");

        driver
            .fill(selectors::DP_SEARCH, &credentials.dp_id, self.timeout)
            .await?;
        driver.press_enter(selectors::DP_SEARCH, self.timeout).await?;
        tracing::info!("Selected DP ID: {}", credentials.dp_id);

        driver
            .fill(selectors::USERNAME, &credentials.username, self.timeout)
            .await?;
        tracing::info!("Entered username");

        driver
            .fill(
                selectors::PASSWORD,
                credentials.password.expose_secret(),
                self.timeout,
            )
            .await?;
        tracing::info!("Entered password");

        driver.click(selectors::LOGIN_BUTTON, self.timeout).await?;
        tracing::info!("Clicked login button");

        driver.wait_for(selectors::LOGOUT_ICON, self.timeout).await?;
        tracing::info!("✅ Successfully logged in to Meroshare");

        Ok(())
    }
}
