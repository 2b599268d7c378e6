use crate::config::env::PIN_VAR;
use crate::config::{Environment, Settings, Timeouts};
use crate::core::applier::Applier;
use crate::core::auth::Authenticator;
use crate::core::navigator::{Navigator, Section};
use crate::core::offers::{self, OfferLister};
use crate::domain::model::{ApplicationForm, Offer, RunMode, RunReport};
use crate::domain::ports::PortalDriver;
use crate::utils::error::{PortalError, Result};
use std::future::Future;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub login_url: String,
    pub timeouts: Timeouts,
    pub screenshot_dir: PathBuf,
}

impl From<&Settings> for EngineOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            login_url: settings.portal.login_url.clone(),
            timeouts: settings.timeouts(),
            screenshot_dir: settings.output.screenshot_dir.clone(),
        }
    }
}

/// Runs login, navigation, listing and applications over one browser session.
pub struct IpoEngine<D: PortalDriver> {
    driver: D,
    options: EngineOptions,
    environment: Environment,
}

impl<D: PortalDriver> IpoEngine<D> {
    pub fn new(driver: D, options: EngineOptions, environment: Environment) -> Self {
        Self {
            driver,
            options,
            environment,
        }
    }

    /// 執行單次流程；失敗時先截圖，無論成敗都會關閉瀏覽器
    pub async fn run(&mut self, mode: &RunMode) -> Result<RunReport> {
        self.run_until(mode, std::future::pending()).await
    }

    /// Like [`run`](Self::run), but stops early with `PortalError::Interrupted`
    /// once `interrupt` completes. The browser is closed either way.
    pub async fn run_until<F>(&mut self, mode: &RunMode, interrupt: F) -> Result<RunReport>
    where
        F: Future<Output = ()>,
    {
        tracing::info!("Starting Meroshare run ({:?})", mode);

        let outcome = tokio::select! {
            biased;
            () = interrupt => Err(PortalError::Interrupted),
            outcome = self.execute(mode) => outcome,
        };

        if let Err(e) = &outcome {
            if !matches!(e, PortalError::Interrupted) {
                self.capture_failure(e).await;
            }
        }

        if let Err(e) = self.driver.close().await {
            tracing::warn!("Failed to close browser cleanly: {}", e);
        }

        if let Ok(report) = &outcome {
            tracing::info!(
                "Run finished: {} offers listed, {} eligible, {} applied, {} skipped",
                report.offers.len(),
                report.eligible.len(),
                report.applied.len(),
                report.skipped.len()
            );
        }

        outcome
    }

    async fn execute(&self, mode: &RunMode) -> Result<RunReport> {
        let driver = &self.driver;
        let timeouts = self.options.timeouts;

        Authenticator::new(driver, &self.options.login_url, timeouts.login)
            .login(&self.environment.credentials)
            .await?;

        let navigator = Navigator::new(driver, timeouts.navigation);
        navigator.navigate(Section::Asba).await?;

        tracing::info!("Checking for available IPOs...");
        let listing = OfferLister::new(driver, timeouts.navigation).list().await?;
        let eligible = offers::eligible(&listing);
        log_offers(&eligible);

        let mut report = RunReport {
            offers: listing,
            eligible: eligible.clone(),
            ..RunReport::default()
        };

        match mode {
            RunMode::CheckOnly => {}
            RunMode::ApplyAll => self.apply_all(&eligible, &mut report).await?,
            RunMode::ApplyOne(name) => self.apply_one(name, &eligible, &mut report).await?,
        }

        Ok(report)
    }

    fn application_form(&self) -> Result<&ApplicationForm> {
        self.environment
            .application
            .as_ref()
            .ok_or_else(|| PortalError::MissingEnv {
                names: vec![PIN_VAR.to_string()],
            })
    }

    async fn apply_all(&self, eligible: &[Offer], report: &mut RunReport) -> Result<()> {
        if eligible.is_empty() {
            tracing::info!("No IPOs available to apply for.");
            return Ok(());
        }

        let form = self.application_form()?;
        let timeouts = self.options.timeouts;
        let navigator = Navigator::new(&self.driver, timeouts.navigation);
        let lister = OfferLister::new(&self.driver, timeouts.navigation);
        let applier = Applier::new(&self.driver, form, timeouts.form);

        tracing::info!("Applying for all available IPOs...");
        let mut page_changed = false;

        for target in eligible {
            // 送出申購後頁面已離開列表，需重新讀取以取得正確的區塊位置
            let current = if page_changed {
                navigator.navigate(Section::Asba).await?;
                let listing = lister.list().await?;
                match offers::find_same(&listing, target) {
                    Some(offer) => offer.clone(),
                    None => {
                        tracing::warn!("{} is no longer listed, skipping", target.company_name);
                        report.skipped.push(target.company_name.clone());
                        continue;
                    }
                }
            } else {
                target.clone()
            };

            if !current.can_apply() {
                tracing::info!(
                    "Skipping {} (action: {})",
                    current.company_name,
                    current.action_label()
                );
                report.skipped.push(current.company_name.clone());
                continue;
            }

            let applied = applier.apply(&current).await?;
            report.applied.push(applied);
            page_changed = true;
        }

        Ok(())
    }

    async fn apply_one(
        &self,
        name: &str,
        eligible: &[Offer],
        report: &mut RunReport,
    ) -> Result<()> {
        let Some(offer) = offers::find_by_name(eligible, name) else {
            tracing::error!("IPO with name '{}' not found among available IPOs.", name);
            return Err(PortalError::OfferNotFound {
                name: name.to_string(),
            });
        };

        let form = self.application_form()?;
        let applied = Applier::new(&self.driver, form, self.options.timeouts.form)
            .apply(offer)
            .await?;
        report.applied.push(applied);

        Ok(())
    }

    async fn capture_failure(&self, error: &PortalError) {
        let step = error.step().map(|s| s.as_str()).unwrap_or("run");
        let path = self.options.screenshot_dir.join(format!("{}_error.png", step));

        if let Err(e) = ensure_dir(&self.options.screenshot_dir) {
            tracing::warn!("Could not create screenshot directory: {}", e);
            return;
        }

        match self.driver.screenshot(&path).await {
            Ok(()) => tracing::info!("Saved screenshot of error state to {}", path.display()),
            Err(e) => tracing::warn!("Could not save error screenshot: {}", e),
        }
    }
}

fn ensure_dir(dir: &Path) -> std::io::Result<()> {
    if dir.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(dir)
}

fn log_offers(eligible: &[Offer]) {
    tracing::info!("Found {} available IPOs", eligible.len());
    for offer in eligible {
        tracing::info!(
            "- {} ({}, {}): {}",
            offer.company_name,
            offer.share_type,
            offer.sub_group.as_deref().unwrap_or("-"),
            offer.action_label()
        );
    }
}
