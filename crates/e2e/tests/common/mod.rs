//! Fake storefront shared by the integration tests

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use storefront_e2e::config::Credentials;
use storefront_e2e::playwright::{BrowserDriver, Script, ScriptOutcome};
use storefront_e2e::step::StepRecord;
use storefront_e2e::{Action, ConfigResolver, E2eResult, EnvOverrides, RunContext};

pub const SESSION_STATE: &str = r#"{
  "cookies": [{
    "name": "session-username",
    "value": "standard_user",
    "domain": "www.saucedemo.com",
    "path": "/",
    "expires": 1760000000,
    "httpOnly": false,
    "secure": false,
    "sameSite": "Lax"
  }],
  "origins": []
}"#;

/// What a scenario worker saw when its context started
#[derive(Debug, Clone, PartialEq)]
pub enum Seed {
    /// No storage state requested
    Fresh,
    /// Storage state file was present and carried the session cookie
    Authenticated,
    /// Storage state was requested but missing or unusable
    Broken,
}

/// Accepts one credential pair, like the real login form
pub struct FakeStorefront {
    valid: Credentials,
    landing_title: String,
    failures_remaining: AtomicU32,
    pub logins: Mutex<Vec<Credentials>>,
    pub seeds: Mutex<Vec<Seed>>,
}

impl FakeStorefront {
    pub fn new(valid: Credentials) -> Self {
        Self {
            valid,
            landing_title: "Products".to_string(),
            failures_remaining: AtomicU32::new(0),
            logins: Mutex::new(Vec::new()),
            seeds: Mutex::new(Vec::new()),
        }
    }

    pub fn standard() -> Self {
        Self::new(Credentials::new("standard_user", "secret_sauce"))
    }

    pub fn with_landing_title(mut self, title: &str) -> Self {
        self.landing_title = title.to_string();
        self
    }

    /// The next `n` scenario runs fail
    pub fn failing_scenarios(self, n: u32) -> Self {
        self.failures_remaining.store(n, Ordering::SeqCst);
        self
    }

    pub fn scenario_runs(&self) -> usize {
        self.seeds.lock().unwrap().len()
    }

    fn filled(script: &Script, field: &str) -> Option<String> {
        let selector = format!(r#"[data-test="{}"]"#, field);
        script.actions.iter().find_map(|a| match a {
            Action::Fill { selector: s, value } if *s == selector => Some(value.clone()),
            _ => None,
        })
    }

    fn steps(script: &Script) -> Vec<StepRecord> {
        script
            .actions
            .iter()
            .map(|a| StepRecord {
                name: a.label(),
                success: true,
                duration_ms: 1,
                error: None,
            })
            .collect()
    }

    fn login(&self, script: &Script, out: &Path) -> E2eResult<ScriptOutcome> {
        let creds = Credentials::new(
            Self::filled(script, "username").unwrap_or_default(),
            Self::filled(script, "password").unwrap_or_default(),
        );
        self.logins.lock().unwrap().push(creds.clone());

        if creds != self.valid {
            return Ok(ScriptOutcome {
                success: false,
                steps: Self::steps(script),
                captures: BTreeMap::new(),
                error: Some("page.waitForURL: Timeout 30000ms exceeded.".to_string()),
            });
        }

        std::fs::write(out, SESSION_STATE)?;
        let captures = script
            .actions
            .iter()
            .filter_map(|a| match a {
                Action::Capture { name, .. } => Some((name.clone(), Some(self.landing_title.clone()))),
                _ => None,
            })
            .collect();
        Ok(ScriptOutcome {
            success: true,
            steps: Self::steps(script),
            captures,
            error: None,
        })
    }

    fn scenario(&self, script: &Script) -> ScriptOutcome {
        let seed = match &script.storage_state_in {
            None => Seed::Fresh,
            Some(path) => match std::fs::read_to_string(path) {
                Ok(content) if content.contains("session-username") => Seed::Authenticated,
                _ => Seed::Broken,
            },
        };
        self.seeds.lock().unwrap().push(seed);

        let fail = self
            .failures_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        ScriptOutcome {
            success: !fail,
            steps: Self::steps(script),
            captures: BTreeMap::new(),
            error: fail.then(|| "expect(locator).toHaveText: timed out".to_string()),
        }
    }
}

#[async_trait]
impl BrowserDriver for FakeStorefront {
    async fn run(&self, script: &Script) -> E2eResult<ScriptOutcome> {
        match &script.storage_state_out {
            Some(out) => self.login(script, out),
            None => Ok(self.scenario(script)),
        }
    }
}

pub fn env(vars: &[(&str, &str)]) -> EnvOverrides {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    EnvOverrides::from_lookup(|k| map.get(k).cloned())
}

pub fn context(root: &Path, vars: &[(&str, &str)]) -> RunContext {
    RunContext::bootstrap(&ConfigResolver::for_project(root, env(vars)))
}

pub fn write_profile(root: &Path, name: &str, body: &str) {
    let dir = root.join("profiles");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join(format!("{}.json", name)), body).unwrap();
}

/// Files left in the artifact directory
pub fn auth_dir_entries(root: &Path) -> Vec<String> {
    match std::fs::read_dir(root.join(".auth")) {
        Ok(entries) => entries
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().to_string())
            .collect(),
        Err(_) => Vec::new(),
    }
}
