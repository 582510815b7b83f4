//! Playwright browser automation
//!
//! A [`Script`] is rendered as a standalone Node program and run with
//! `node`. Each action reports a step; the program prints one JSON outcome
//! line on stdout when it finishes.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tracing::{debug, warn};

use crate::config::Timeouts;
use crate::error::{E2eError, E2eResult};
use crate::spec::Action;
use crate::step::StepRecord;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Browser {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl Browser {
    fn as_str(&self) -> &'static str {
        match self {
            Browser::Chromium => "chromium",
            Browser::Firefox => "firefox",
            Browser::Webkit => "webkit",
        }
    }
}

/// Engine, channel and viewport for every context in the run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserTarget {
    pub browser: Browser,
    /// Branded build such as `chrome` or `msedge`
    pub channel: Option<String>,
    pub viewport_width: u32,
    pub viewport_height: u32,
}

impl BrowserTarget {
    /// Map a `BROWSER` value to a target.
    ///
    /// CI uses the bundled Chromium instead of the `chrome` channel.
    pub fn select(name: Option<&str>, ci: bool) -> Self {
        let (browser, channel) = match name.map(str::to_ascii_lowercase).as_deref() {
            Some("firefox") => (Browser::Firefox, None),
            Some("safari") => (Browser::Webkit, None),
            Some("edge") => (Browser::Chromium, Some("msedge")),
            _ if ci => (Browser::Chromium, None),
            _ => (Browser::Chromium, Some("chrome")),
        };
        Self {
            browser,
            channel: channel.map(String::from),
            viewport_width: 1600,
            viewport_height: 900,
        }
    }
}

impl Default for BrowserTarget {
    fn default() -> Self {
        Self::select(None, false)
    }
}

/// Browser and context options shared by every script in a run
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    pub target: BrowserTarget,
    pub base_url: String,
    pub headless: bool,
    pub timezone: String,
    pub timeouts: Timeouts,
}

/// One browser context from launch to close
#[derive(Debug, Clone)]
pub struct Script {
    pub launch: LaunchOptions,

    /// Seed cookies and storage from this file
    pub storage_state_in: Option<PathBuf>,

    /// Save cookies and storage here once every action has passed
    pub storage_state_out: Option<PathBuf>,

    pub actions: Vec<Action>,
}

impl Script {
    pub fn new(launch: LaunchOptions, actions: Vec<Action>) -> Self {
        Self {
            launch,
            storage_state_in: None,
            storage_state_out: None,
            actions,
        }
    }

    pub fn with_storage_state_in(mut self, path: impl Into<PathBuf>) -> Self {
        self.storage_state_in = Some(path.into());
        self
    }

    pub fn with_storage_state_out(mut self, path: impl Into<PathBuf>) -> Self {
        self.storage_state_out = Some(path.into());
        self
    }
}

/// What a script run observed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScriptOutcome {
    pub success: bool,
    #[serde(default)]
    pub steps: Vec<StepRecord>,
    #[serde(default)]
    pub captures: BTreeMap<String, Option<String>>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ScriptOutcome {
    pub fn capture(&self, name: &str) -> Option<&str> {
        self.captures.get(name).and_then(|v| v.as_deref())
    }
}

/// Seam between the suite and the browser engine.
///
/// Page failures come back as an unsuccessful [`ScriptOutcome`]; `Err` is
/// reserved for the driver itself failing.
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    async fn run(&self, script: &Script) -> E2eResult<ScriptOutcome>;
}

/// Runs scripts through the Node Playwright package
#[derive(Debug, Clone)]
pub struct PlaywrightDriver {
    /// Directory whose `node_modules` provides `@playwright/test`
    project_root: PathBuf,
}

impl PlaywrightDriver {
    pub async fn new(project_root: impl Into<PathBuf>) -> E2eResult<Self> {
        let project_root = project_root.into();
        Self::check_playwright_installed(&project_root).await?;
        Ok(Self { project_root })
    }

    async fn check_playwright_installed(project_root: &Path) -> E2eResult<()> {
        let status = Command::new("npx")
            .args(["playwright", "--version"])
            .current_dir(project_root)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;

        match status {
            Ok(status) if status.success() => Ok(()),
            _ => Err(E2eError::PlaywrightNotFound),
        }
    }
}

#[async_trait]
impl BrowserDriver for PlaywrightDriver {
    async fn run(&self, script: &Script) -> E2eResult<ScriptOutcome> {
        // Written inside the project so `require` resolves its node_modules.
        let file = tempfile::Builder::new()
            .prefix(".storefront-e2e-")
            .suffix(".cjs")
            .tempfile_in(&self.project_root)?;
        std::fs::write(file.path(), build_script(script))?;

        debug!("Running Playwright script: {}", file.path().display());

        let output = Command::new("node")
            .arg(file.path())
            .current_dir(&self.project_root)
            .output()
            .await?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            debug!("playwright stderr: {}", stderr.trim());
        }

        match parse_outcome(&stdout) {
            Some(outcome) => Ok(outcome),
            None => {
                warn!("Playwright exited with {} and no outcome", output.status);
                Err(E2eError::Playwright(format!(
                    "Script failed:\nstdout: {}\nstderr: {}",
                    stdout, stderr
                )))
            }
        }
    }
}

/// Last stdout line that parses as an outcome
pub fn parse_outcome(stdout: &str) -> Option<ScriptOutcome> {
    stdout
        .lines()
        .rev()
        .filter(|line| line.trim_start().starts_with('{'))
        .find_map(|line| serde_json::from_str(line).ok())
}

/// Embed a string as a JS literal
fn js(s: &str) -> String {
    serde_json::Value::from(s).to_string()
}

fn path_js(path: &Path) -> String {
    js(&path.to_string_lossy())
}

/// Render the Node program for a script
pub fn build_script(script: &Script) -> String {
    let launch = &script.launch;
    let mut out = String::new();

    out.push_str(
        r#"const { chromium, firefox, webkit, expect } = require('@playwright/test');

const __steps = [];
const __captures = {};

async function __step(name, fn) {
  const started = Date.now();
  try {
    await fn();
    __steps.push({ name, success: true, duration_ms: Date.now() - started, error: null });
  } catch (error) {
    __steps.push({ name, success: false, duration_ms: Date.now() - started, error: error.message });
    throw error;
  }
}

(async () => {
"#,
    );

    let channel = launch
        .target
        .channel
        .as_deref()
        .map(|c| format!(", channel: {}", js(c)))
        .unwrap_or_default();
    let _ = writeln!(
        out,
        "  const browser = await {}.launch({{ headless: {}{} }});",
        launch.target.browser.as_str(),
        launch.headless,
        channel
    );

    out.push_str("  const context = await browser.newContext({\n");
    let _ = writeln!(out, "    baseURL: {},", js(&launch.base_url));
    let _ = writeln!(
        out,
        "    viewport: {{ width: {}, height: {} }},",
        launch.target.viewport_width, launch.target.viewport_height
    );
    let _ = writeln!(out, "    timezoneId: {},", js(&launch.timezone));
    out.push_str("    ignoreHTTPSErrors: true,\n");
    out.push_str("    bypassCSP: true,\n");
    if let Some(path) = &script.storage_state_in {
        let _ = writeln!(out, "    storageState: {},", path_js(path));
    }
    out.push_str("  });\n");
    let _ = writeln!(out, "  context.setDefaultTimeout({});", launch.timeouts.default_ms);
    let _ = writeln!(
        out,
        "  context.setDefaultNavigationTimeout({});",
        launch.timeouts.navigation_ms
    );
    out.push_str("  const page = await context.newPage();\n");
    out.push_str("  let outcome = { success: true, error: null };\n\n  try {\n");

    for (i, action) in script.actions.iter().enumerate() {
        let _ = writeln!(out, "    // Step {}: {}", i + 1, action.label());
        let _ = writeln!(out, "    await __step({}, async () => {{", js(&action.label()));
        out.push_str(&action_to_js(action));
        out.push_str("\n    });\n");
    }

    if let Some(path) = &script.storage_state_out {
        let _ = writeln!(out, "    await context.storageState({{ path: {} }});", path_js(path));
    }

    out.push_str(
        r#"  } catch (error) {
    outcome = { success: false, error: error.message };
  } finally {
    await browser.close();
  }

  console.log(JSON.stringify({ ...outcome, steps: __steps, captures: __captures }));
})().catch((error) => {
  console.error(error && error.stack ? error.stack : String(error));
  process.exit(2);
});
"#,
    );

    out
}

fn action_to_js(action: &Action) -> String {
    match action {
        Action::Navigate { url, wait_for_selector } => {
            let wait = wait_for_selector
                .as_ref()
                .map(|s| format!("\n      await page.waitForSelector({});", js(s)))
                .unwrap_or_default();
            format!("      await page.goto({});{}", js(url), wait)
        }
        Action::Click { selector, timeout_ms } => match timeout_ms {
            Some(t) => format!("      await page.click({}, {{ timeout: {} }});", js(selector), t),
            None => format!("      await page.click({});", js(selector)),
        },
        Action::Fill { selector, value } => {
            format!("      await page.fill({}, {});", js(selector), js(value))
        }
        Action::WaitForUrl { pattern } => {
            format!("      await page.waitForURL({});", js(pattern))
        }
        Action::Assert { selector, visible, text, text_contains, count } => {
            let locator = format!("page.locator({})", js(selector));
            let mut assertions = Vec::new();

            match visible {
                Some(true) => assertions.push(format!("      await expect({}).toBeVisible();", locator)),
                Some(false) => assertions.push(format!("      await expect({}).toBeHidden();", locator)),
                None => {}
            }
            if let Some(t) = text {
                assertions.push(format!("      await expect({}).toHaveText({});", locator, js(t)));
            }
            if let Some(tc) = text_contains {
                assertions.push(format!(
                    "      await expect({}).toContainText({});",
                    locator,
                    js(tc)
                ));
            }
            if let Some(c) = count {
                assertions.push(format!("      await expect({}).toHaveCount({});", locator, c));
            }

            assertions.join("\n")
        }
        Action::Capture { name, selector } => format!(
            "      __captures[{}] = await page.locator({}).first().textContent();",
            js(name),
            js(selector)
        ),
        Action::Log { message } => {
            format!("      console.error('[scenario] ' + {});", js(message))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn launch() -> LaunchOptions {
        LaunchOptions {
            target: BrowserTarget::select(None, true),
            base_url: "https://www.saucedemo.com".to_string(),
            headless: true,
            timezone: "UTC".to_string(),
            timeouts: Timeouts::default(),
        }
    }

    #[test_case(None, false, Browser::Chromium, Some("chrome") ; "default local")]
    #[test_case(None, true, Browser::Chromium, None ; "default ci")]
    #[test_case(Some("Chrome"), true, Browser::Chromium, None ; "chrome ci")]
    #[test_case(Some("firefox"), false, Browser::Firefox, None ; "firefox")]
    #[test_case(Some("SAFARI"), false, Browser::Webkit, None ; "safari")]
    #[test_case(Some("edge"), true, Browser::Chromium, Some("msedge") ; "edge")]
    fn test_browser_selection(name: Option<&str>, ci: bool, browser: Browser, channel: Option<&str>) {
        let target = BrowserTarget::select(name, ci);
        assert_eq!(target.browser, browser);
        assert_eq!(target.channel.as_deref(), channel);
        assert_eq!((target.viewport_width, target.viewport_height), (1600, 900));
    }

    #[test]
    fn test_build_script_login_flow() {
        let script = Script::new(
            launch(),
            vec![
                Action::Navigate { url: "/".to_string(), wait_for_selector: None },
                Action::Fill {
                    selector: r#"[data-test="username"]"#.to_string(),
                    value: "o'brien".to_string(),
                },
                Action::WaitForUrl { pattern: "**/inventory.html".to_string() },
            ],
        )
        .with_storage_state_out("/tmp/state.json");

        let js = build_script(&script);
        assert!(js.contains("chromium.launch({ headless: true })"));
        assert!(js.contains(r#"baseURL: "https://www.saucedemo.com""#));
        assert!(js.contains(r#"await page.goto("/");"#));
        assert!(js.contains(r#"await page.fill("[data-test=\"username\"]", "o'brien");"#));
        assert!(js.contains(r#"await page.waitForURL("**/inventory.html");"#));
        assert!(js.contains(r#"await context.storageState({ path: "/tmp/state.json" });"#));
        assert!(js.contains("context.setDefaultTimeout(30000);"));
        assert!(!js.contains("storageState: "));
    }

    #[test]
    fn test_build_script_seeds_storage_state() {
        let script = Script::new(launch(), vec![]).with_storage_state_in(".auth/user.json");
        let js = build_script(&script);
        assert!(js.contains(r#"storageState: ".auth/user.json","#));
        assert!(!js.contains("context.storageState({ path"));
    }

    #[test]
    fn test_assert_renders_each_expectation() {
        let action = Action::Assert {
            selector: ".badge".to_string(),
            visible: Some(true),
            text: Some("1".to_string()),
            text_contains: None,
            count: Some(6),
        };
        let js = action_to_js(&action);
        assert_eq!(js.lines().count(), 3);
        assert!(js.contains("toBeVisible()"));
        assert!(js.contains(r#"toHaveText("1")"#));
        assert!(js.contains("toHaveCount(6)"));
    }

    #[test]
    fn test_parse_outcome_uses_last_json_line() {
        let stdout = concat!(
            "some noise\n",
            r#"{"success":true,"steps":[{"name":"navigate:/","success":true,"duration_ms":12,"error":null}],"captures":{"title":"Products"},"error":null}"#,
            "\n"
        );
        let outcome = parse_outcome(stdout).unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.steps.len(), 1);
        assert_eq!(outcome.capture("title"), Some("Products"));
    }

    #[test]
    fn test_parse_outcome_none_without_json() {
        assert!(parse_outcome("Error: Cannot find module '@playwright/test'\n").is_none());
    }
}
