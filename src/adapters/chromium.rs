//! Chromium session driven over the DevTools protocol.
//!
//! One browser, one page. Element lookups poll until the element shows up
//! or the caller's timeout runs out; multi-element reads and `<select>`
//! changes run as a single page script so the listing is read atomically.

use crate::config::toml_config::BrowserConfig as BrowserSettings;
use crate::domain::model::OptionChoice;
use crate::domain::ports::{Locator, PortalDriver};
use crate::utils::error::{PortalError, Result, Step};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::element::Element;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use futures::StreamExt;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug, Clone)]
pub struct LaunchOptions {
    pub headless: bool,
    pub chrome_path: Option<PathBuf>,
    pub window_width: u32,
    pub window_height: u32,
}

impl From<&BrowserSettings> for LaunchOptions {
    fn from(settings: &BrowserSettings) -> Self {
        Self {
            headless: settings.headless,
            chrome_path: settings.chrome_path.clone(),
            window_width: settings.window_width,
            window_height: settings.window_height,
        }
    }
}

impl LaunchOptions {
    pub fn launch_args(&self) -> Vec<String> {
        vec![
            "--no-sandbox".to_string(),
            "--disable-dev-shm-usage".to_string(),
            "--disable-gpu".to_string(),
            format!("--window-size={},{}", self.window_width, self.window_height),
        ]
    }
}

pub struct ChromiumDriver {
    browser: Option<Browser>,
    handler_task: tokio::task::JoinHandle<()>,
    page: Page,
}

impl Drop for ChromiumDriver {
    fn drop(&mut self) {
        self.handler_task.abort();
    }
}

impl ChromiumDriver {
    pub async fn launch(options: &LaunchOptions) -> Result<Self> {
        Self::start(options).await.map_err(|e| {
            tracing::error!("Failed to start browser: {}", e);
            e.during(Step::Launch)
        })
    }

    async fn start(options: &LaunchOptions) -> Result<Self> {
        let chrome_path = resolve_chrome(options.chrome_path.as_deref())?;
        tracing::debug!("Using browser executable {}", chrome_path.display());

        let mut builder = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .window_size(options.window_width, options.window_height)
            .viewport(None)
            .args(options.launch_args());
        if !options.headless {
            builder = builder.with_head();
        }
        let config = builder
            .build()
            .map_err(|message| PortalError::BrowserUnavailable { message })?;

        let (browser, mut handler) = Browser::launch(config).await?;
        let handler_task = tokio::spawn(async move { while handler.next().await.is_some() {} });

        let page = browser.new_page("about:blank").await?;
        tracing::info!(
            "Browser started ({})",
            if options.headless { "headless" } else { "headed" }
        );

        Ok(Self {
            browser: Some(browser),
            handler_task,
            page,
        })
    }

    async fn find(&self, locator: Locator) -> Result<Element> {
        let element = match locator {
            Locator::Css(selector) => self.page.find_element(selector).await?,
            Locator::XPath(xpath) => self.page.find_xpath(xpath).await?,
        };
        Ok(element)
    }

    async fn locate(&self, locator: Locator, timeout: Duration) -> Result<Element> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.find(locator).await {
                Ok(element) => return Ok(element),
                Err(e) => tracing::trace!("{} not present yet: {}", locator, e),
            }

            if Instant::now() >= deadline {
                return Err(PortalError::ElementTimeout {
                    locator: locator.to_string(),
                    timeout,
                });
            }

            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn evaluate(&self, script: String) -> Result<Value> {
        Ok(self.page.evaluate(script).await?.into_value()?)
    }
}

#[async_trait]
impl PortalDriver for ChromiumDriver {
    async fn goto(&self, url: &str) -> Result<()> {
        self.page.goto(url).await?;
        Ok(())
    }

    async fn wait_for(&self, locator: Locator, timeout: Duration) -> Result<()> {
        self.locate(locator, timeout).await?;
        Ok(())
    }

    async fn click(&self, locator: Locator, timeout: Duration) -> Result<()> {
        self.locate(locator, timeout).await?.click().await?;
        Ok(())
    }

    async fn fill(&self, locator: Locator, text: &str, timeout: Duration) -> Result<()> {
        let element = self.locate(locator, timeout).await?;
        element.click().await?;
        element
            .call_js_fn(
                "function() { this.value = ''; this.dispatchEvent(new Event('input', { bubbles: true })); }",
                false,
            )
            .await?;
        element.type_str(text).await?;
        Ok(())
    }

    async fn press_enter(&self, locator: Locator, timeout: Duration) -> Result<()> {
        self.locate(locator, timeout).await?.press_key("Enter").await?;
        Ok(())
    }

    async fn select_option(
        &self,
        locator: Locator,
        choice: &OptionChoice,
        timeout: Duration,
    ) -> Result<String> {
        let deadline = Instant::now() + timeout;
        self.locate(locator, timeout).await?;

        let fragment = match choice {
            OptionChoice::First => Value::Null,
            OptionChoice::Containing(text) => Value::from(text.to_lowercase()),
        };
        let script = format!(
            r#"(function() {{
  {helpers}
  const select = first({locator});
  if (!select || !select.options) return {{ ok: false, reason: 'select not found' }};
  const fragment = {fragment};
  const options = Array.from(select.options).filter(o =>
    !o.disabled && o.value !== '' && !/^(please|select|choose)/i.test(o.text.trim()));
  const chosen = fragment === null
    ? options[0]
    : options.find(o => o.text.toLowerCase().includes(fragment));
  if (!chosen) return {{ ok: false, reason: 'no matching option' }};
  select.value = chosen.value;
  select.dispatchEvent(new Event('change', {{ bubbles: true }}));
  return {{ ok: true, label: chosen.text.trim() }};
}})()"#,
            helpers = JS_HELPERS,
            locator = locator_json(locator),
            fragment = fragment,
        );

        // 選項可能非同步載入（帳號清單要等銀行 change 後才出現），持續重試直到逾時
        loop {
            let result = self.evaluate(script.clone()).await?;
            match select_attempt(&result, Instant::now() >= deadline) {
                SelectAttempt::Chosen(label) => return Ok(label),
                SelectAttempt::Retry(reason) => {
                    tracing::trace!("{} not ready yet: {}", locator, reason);
                    tokio::time::sleep(POLL_INTERVAL).await;
                }
                SelectAttempt::GiveUp(reason) => {
                    return Err(PortalError::ElementMissing {
                        locator: format!("{} ({})", locator, reason),
                    })
                }
            }
        }
    }

    async fn read_text(&self, locator: Locator, timeout: Duration) -> Result<String> {
        let text = self.locate(locator, timeout).await?.inner_text().await?;
        Ok(text.unwrap_or_default().trim().to_string())
    }

    async fn read_blocks(
        &self,
        block: Locator,
        fields: &[Locator],
    ) -> Result<Vec<Vec<Option<String>>>> {
        let field_specs: Vec<Value> = fields.iter().copied().map(locator_json).collect();
        let script = format!(
            r#"(function() {{
  {helpers}
  const fields = {fields};
  return all({block}, document).map(node => fields.map(field => {{
    const found = first(field, node);
    return found ? (found.innerText || found.textContent || '').trim() : null;
  }}));
}})()"#,
            helpers = JS_HELPERS,
            fields = Value::from(field_specs),
            block = locator_json(block),
        );

        let rows = self.page.evaluate(script).await?.into_value()?;
        Ok(rows)
    }

    async fn click_in_block(&self, block: Locator, index: usize, target: Locator) -> Result<()> {
        let script = format!(
            r#"(function() {{
  {helpers}
  const node = all({block}, document)[{index}];
  if (!node) return false;
  const target = first({target}, node);
  if (!target) return false;
  target.scrollIntoView({{ block: 'center' }});
  target.click();
  return true;
}})()"#,
            helpers = JS_HELPERS,
            block = locator_json(block),
            index = index,
            target = locator_json(target),
        );

        let clicked = self.evaluate(script).await?.as_bool().unwrap_or(false);
        if clicked {
            Ok(())
        } else {
            Err(PortalError::ElementMissing {
                locator: format!("{} in block {} of {}", target, index, block),
            })
        }
    }

    async fn screenshot(&self, path: &Path) -> Result<()> {
        self.page
            .save_screenshot(ScreenshotParams::builder().full_page(true).build(), path)
            .await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(mut browser) = self.browser.take() {
            browser.close().await?;
            browser.wait().await?;
            tracing::info!("Browser closed");
        }
        self.handler_task.abort();
        Ok(())
    }
}

// `first(spec, root)` / `all(spec, root)` resolve a serialized Locator.
const JS_HELPERS: &str = r#"function all(spec, root) {
    root = root || document;
    if (spec.kind === 'css') return Array.from(root.querySelectorAll(spec.expr));
    const expr = root === document || spec.expr.startsWith('.') ? spec.expr : '.' + spec.expr;
    const snap = document.evaluate(expr, root, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null);
    const out = [];
    for (let i = 0; i < snap.snapshotLength; i++) out.push(snap.snapshotItem(i));
    return out;
  }
  function first(spec, root) { return all(spec, root)[0] || null; }"#;

#[derive(Debug, PartialEq, Eq)]
enum SelectAttempt {
    Chosen(String),
    Retry(String),
    GiveUp(String),
}

/// Decides what to do with one run of the option-picking script.
fn select_attempt(result: &Value, expired: bool) -> SelectAttempt {
    if result.get("ok").and_then(Value::as_bool).unwrap_or(false) {
        let label = result
            .get("label")
            .and_then(Value::as_str)
            .unwrap_or_default();
        return SelectAttempt::Chosen(label.to_string());
    }

    let reason = result
        .get("reason")
        .and_then(Value::as_str)
        .unwrap_or("unknown")
        .to_string();
    if expired {
        SelectAttempt::GiveUp(reason)
    } else {
        SelectAttempt::Retry(reason)
    }
}

fn locator_json(locator: Locator) -> Value {
    match locator {
        Locator::Css(expr) => json!({ "kind": "css", "expr": expr }),
        Locator::XPath(expr) => json!({ "kind": "xpath", "expr": expr }),
    }
}

fn resolve_chrome(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(path) if path.exists() => Ok(path.to_path_buf()),
        Some(path) => Err(PortalError::BrowserUnavailable {
            message: format!("browser executable not found at {}", path.display()),
        }),
        None => find_chromium().ok_or_else(|| PortalError::BrowserUnavailable {
            message: "Chrome/Chromium executable not found".to_string(),
        }),
    }
}

fn find_chromium() -> Option<PathBuf> {
    if let Some(path) = find_on_path(&chromium_candidates()) {
        return Some(path);
    }

    platform_chromium_paths()
        .into_iter()
        .find(|path| path.exists())
}

fn find_on_path(candidates: &[&str]) -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var)
        .flat_map(|dir| candidates.iter().map(move |candidate| dir.join(candidate)))
        .find(|full| full.exists())
}

#[cfg(target_os = "windows")]
fn chromium_candidates() -> Vec<&'static str> {
    vec!["chrome.exe", "chromium.exe"]
}

#[cfg(not(target_os = "windows"))]
fn chromium_candidates() -> Vec<&'static str> {
    vec![
        "chromium",
        "chromium-browser",
        "google-chrome",
        "google-chrome-stable",
    ]
}

#[cfg(target_os = "windows")]
fn platform_chromium_paths() -> Vec<PathBuf> {
    ["ProgramFiles", "ProgramFiles(x86)", "LOCALAPPDATA"]
        .iter()
        .filter_map(|var| std::env::var_os(var))
        .map(|base| PathBuf::from(base).join("Google/Chrome/Application/chrome.exe"))
        .collect()
}

#[cfg(target_os = "macos")]
fn platform_chromium_paths() -> Vec<PathBuf> {
    vec![
        PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome"),
        PathBuf::from("/Applications/Chromium.app/Contents/MacOS/Chromium"),
        PathBuf::from("/opt/homebrew/bin/chromium"),
    ]
}

#[cfg(all(unix, not(target_os = "macos")))]
fn platform_chromium_paths() -> Vec<PathBuf> {
    vec![
        PathBuf::from("/usr/bin/chromium"),
        PathBuf::from("/usr/bin/chromium-browser"),
        PathBuf::from("/usr/bin/google-chrome"),
        PathBuf::from("/usr/bin/google-chrome-stable"),
        PathBuf::from("/snap/bin/chromium"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launch_args_carry_fixed_flags() {
        let options = LaunchOptions::from(&BrowserSettings::default());
        let args = options.launch_args();

        assert!(args.contains(&"--no-sandbox".to_string()));
        assert!(args.contains(&"--disable-dev-shm-usage".to_string()));
        assert!(args.contains(&"--disable-gpu".to_string()));
        assert!(args.contains(&"--window-size=1920,1080".to_string()));
        assert!(!options.headless);
    }

    #[test]
    fn test_locator_json_shape() {
        assert_eq!(
            locator_json(Locator::Css("#selectBank")),
            json!({ "kind": "css", "expr": "#selectBank" })
        );
        assert_eq!(
            locator_json(Locator::XPath("//a[@href='#/asba']")),
            json!({ "kind": "xpath", "expr": "//a[@href='#/asba']" })
        );
    }

    #[test]
    fn test_select_attempt_waits_for_options_until_deadline() {
        let empty = json!({ "ok": false, "reason": "no matching option" });

        assert_eq!(
            select_attempt(&empty, false),
            SelectAttempt::Retry("no matching option".to_string())
        );
        assert_eq!(
            select_attempt(&empty, true),
            SelectAttempt::GiveUp("no matching option".to_string())
        );

        let chosen = json!({ "ok": true, "label": "NABIL BANK LIMITED" });
        assert_eq!(
            select_attempt(&chosen, true),
            SelectAttempt::Chosen("NABIL BANK LIMITED".to_string())
        );
        assert_eq!(
            select_attempt(&Value::Null, true),
            SelectAttempt::GiveUp("unknown".to_string())
        );
    }

    #[test]
    fn test_missing_explicit_browser_is_unavailable() {
        let err = resolve_chrome(Some(Path::new("/nonexistent/chromium"))).unwrap_err();
        assert!(matches!(err, PortalError::BrowserUnavailable { .. }));
    }
}
