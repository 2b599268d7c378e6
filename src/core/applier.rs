use crate::domain::model::{ApplicationForm, AppliedOffer, Offer, OptionChoice};
use crate::domain::ports::PortalDriver;
use crate::domain::selectors;
use crate::utils::error::{PortalError, Result, Step};
use secrecy::ExposeSecret;
use std::time::Duration;

/// Opens the application form of one offer and submits it.
pub struct Applier<'a, D: PortalDriver + ?Sized> {
    driver: &'a D,
    form: &'a ApplicationForm,
    timeout: Duration,
}

impl<'a, D: PortalDriver + ?Sized> Applier<'a, D> {
    pub fn new(driver: &'a D, form: &'a ApplicationForm, timeout: Duration) -> Self {
        Self {
            driver,
            form,
            timeout,
        }
    }

    /// `offer` must come from the listing currently on screen.
    pub async fn apply(&self, offer: &Offer) -> Result<AppliedOffer> {
        if !offer.can_apply() {
            return Err(PortalError::NotApplicable {
                name: offer.company_name.clone(),
                action: offer.action_label().to_string(),
            }
            .during(Step::Apply));
        }

        tracing::info!("Applying for {}...", offer.company_name);
        match self.submit(offer).await {
            Ok(confirmation) => {
                tracing::info!("✅ Successfully applied for {}!", offer.company_name);
                Ok(AppliedOffer {
                    company_name: offer.company_name.clone(),
                    confirmation,
                })
            }
            Err(e) => {
                tracing::error!("Failed to apply for {}: {}", offer.company_name, e);
                Err(e.during(Step::Apply))
            }
        }
    }

    async fn submit(&self, offer: &Offer) -> Result<String> {
        let driver = self.driver;
        let timeout = self.timeout;

        driver
            .click_in_block(selectors::OFFER_BLOCK, offer.index, selectors::OFFER_ACTION)
            .await?;
        tracing::debug!("Opened application form for block {}", offer.index);

        let bank = driver
            .select_option(
                selectors::BANK_SELECT,
                &OptionChoice::from(&self.form.bank),
                timeout,
            )
            .await?;
        tracing::info!("Selected bank: {}", bank);

        let account = driver
            .select_option(selectors::ACCOUNT_SELECT, &OptionChoice::First, timeout)
            .await?;
        tracing::info!("Selected account: {}", account);

        driver
            .fill(selectors::KITTA_INPUT, &self.form.kitta.to_string(), timeout)
            .await?;
        tracing::info!("Entered applied kitta: {}", self.form.kitta);

        driver
            .fill(selectors::CRN_INPUT, &self.form.crn, timeout)
            .await?;
        tracing::info!("Entered CRN");

        driver.click(selectors::DISCLAIMER, timeout).await?;
        driver.click(selectors::PROCEED_BUTTON, timeout).await?;
        tracing::info!("Accepted disclaimer and proceeded");

        driver
            .fill(
                selectors::PIN_INPUT,
                self.form.pin.expose_secret(),
                timeout,
            )
            .await?;
        tracing::info!("Entered transaction PIN");

        driver.click(selectors::CONFIRM_APPLY_BUTTON, timeout).await?;

        let confirmation = driver.read_text(selectors::TOAST_MESSAGE, timeout).await?;
        tracing::info!("Portal response: {}", confirmation);

        Ok(confirmation)
    }
}
