//! Profile loading and environment overlay
//!
//! Every field resolves with the same precedence: environment variable, then
//! the named profile file, then the hardcoded default. Environment variables
//! are read once into [`EnvOverrides`] and threaded through explicitly.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{E2eError, E2eResult};

pub const DEFAULT_PROFILE: &str = "default";
pub const DEFAULT_BASE_URL: &str = "https://www.saucedemo.com";
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_ROLE: &str = "standard_user";
pub const DEFAULT_TIMEZONE: &str = "UTC";

/// Role key under which `USERNAME`/`PASSWORD` are injected
pub const CUSTOM_ROLE: &str = "custom";

const FALLBACK_USERNAME: &str = "standard_user";
const FALLBACK_PASSWORD: &str = "secret_sauce";

/// A username/password pair for one role
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    fn fallback() -> Self {
        Self::new(FALLBACK_USERNAME, FALLBACK_PASSWORD)
    }

    /// First three characters of the username followed by `***`
    pub fn masked_username(&self) -> String {
        let prefix: String = self.username.chars().take(3).collect();
        format!("{}***", prefix)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Where a credential pair came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Environment,
    Profile,
    Fallback,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CredentialSource::Environment => "environment",
            CredentialSource::Profile => "profile",
            CredentialSource::Fallback => "built-in default",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Action timeout
    pub default_ms: u64,
    pub navigation_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            default_ms: DEFAULT_TIMEOUT_MS,
            navigation_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

/// The merged configuration used by the whole run.
///
/// Immutable once resolved; share it behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveConfig {
    pub environment: String,
    pub base_url: String,
    pub credentials: BTreeMap<String, Credentials>,
    pub timeouts: Timeouts,
    pub headless: bool,

    /// `USERNAME` + `PASSWORD`, when both were set
    env_credentials: Option<Credentials>,
}

impl EffectiveConfig {
    fn defaults(env: &EnvOverrides) -> Self {
        Self {
            environment: if env.ci { "ci" } else { "local" }.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            credentials: BTreeMap::new(),
            timeouts: Timeouts::default(),
            headless: true,
            env_credentials: None,
        }
    }

    fn apply_profile(&mut self, profile: Profile) {
        if let Some(environment) = profile.environment {
            self.environment = environment;
        }
        if let Some(base_url) = profile.base_url.filter(|u| !u.is_empty()) {
            self.base_url = base_url;
        }
        self.credentials.extend(profile.credentials);
        if let Some(timeout) = profile.timeout {
            if let Some(ms) = timeout.default {
                self.timeouts.default_ms = ms;
            }
            if let Some(ms) = timeout.navigation {
                self.timeouts.navigation_ms = ms;
            }
        }
        if let Some(headless) = profile.headless {
            self.headless = headless;
        }
    }

    fn apply_env(&mut self, env: &EnvOverrides) {
        if let Some(base_url) = &env.base_url {
            self.base_url = base_url.clone();
        }
        if let Some(creds) = env.credentials() {
            self.credentials.insert(CUSTOM_ROLE.to_string(), creds.clone());
            self.env_credentials = Some(creds);
        }
        if env.headless_disabled() {
            self.headless = false;
        }
    }

    /// Credentials for `role`, never failing.
    ///
    /// `USERNAME`/`PASSWORD` win outright, then the profile entry, then the
    /// built-in `standard_user` pair.
    pub fn credentials_for(&self, role: &str) -> Credentials {
        self.resolve_credentials(role).0
    }

    pub fn resolve_credentials(&self, role: &str) -> (Credentials, CredentialSource) {
        if let Some(creds) = &self.env_credentials {
            return (creds.clone(), CredentialSource::Environment);
        }
        match self.credentials.get(role) {
            Some(creds) => (creds.clone(), CredentialSource::Profile),
            None => (Credentials::fallback(), CredentialSource::Fallback),
        }
    }

    /// Direct profile lookup with no fallback
    pub fn profile_credentials(&self, role: &str) -> E2eResult<&Credentials> {
        self.credentials
            .get(role)
            .ok_or_else(|| E2eError::CredentialNotFound(role.to_string()))
    }
}

/// On-disk profile, every field optional
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub environment: Option<String>,
    pub base_url: Option<String>,
    #[serde(default)]
    pub credentials: BTreeMap<String, Credentials>,
    pub timeout: Option<ProfileTimeouts>,
    pub headless: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileTimeouts {
    pub default: Option<u64>,
    pub navigation: Option<u64>,
}

/// Snapshot of the environment variables the suite recognizes.
///
/// Empty values count as unset.
#[derive(Clone, Default)]
pub struct EnvOverrides {
    pub profile: Option<String>,
    pub base_url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub headless: Option<String>,
    pub timezone: Option<String>,
    pub browser: Option<String>,
    pub ci: bool,
}

impl EnvOverrides {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());
        Self {
            profile: get("PROFILE"),
            base_url: get("BASE_URL"),
            username: get("USERNAME"),
            password: get("PASSWORD"),
            headless: get("HEADLESS"),
            timezone: get("TIMEZONE"),
            browser: get("BROWSER"),
            ci: get("CI").is_some(),
        }
    }

    pub fn profile_name(&self) -> &str {
        self.profile.as_deref().unwrap_or(DEFAULT_PROFILE)
    }

    /// Only set when both `USERNAME` and `PASSWORD` are present
    pub fn credentials(&self) -> Option<Credentials> {
        match (&self.username, &self.password) {
            (Some(u), Some(p)) => Some(Credentials::new(u.clone(), p.clone())),
            _ => None,
        }
    }

    /// `HEADLESS=false` is the only value that changes anything
    pub fn headless_disabled(&self) -> bool {
        self.headless.as_deref() == Some("false")
    }
}

impl fmt::Debug for EnvOverrides {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvOverrides")
            .field("profile", &self.profile)
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("headless", &self.headless)
            .field("timezone", &self.timezone)
            .field("browser", &self.browser)
            .field("ci", &self.ci)
            .finish()
    }
}

/// Loads `profiles/<name>.json` and overlays [`EnvOverrides`]
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    profiles_dir: PathBuf,
    env: EnvOverrides,
}

impl ConfigResolver {
    pub fn new(profiles_dir: impl Into<PathBuf>, env: EnvOverrides) -> Self {
        Self {
            profiles_dir: profiles_dir.into(),
            env,
        }
    }

    /// Profiles live in `<root>/profiles`
    pub fn for_project(root: &Path, env: EnvOverrides) -> Self {
        Self::new(root.join("profiles"), env)
    }

    pub fn env(&self) -> &EnvOverrides {
        &self.env
    }

    pub fn profile_path(&self, name: &str) -> PathBuf {
        self.profiles_dir.join(format!("{}.json", name))
    }

    /// Read and parse a profile file
    pub fn load_profile(&self, name: &str) -> E2eResult<Profile> {
        let path = self.profile_path(name);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(E2eError::ConfigNotFound { path });
            }
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&content).map_err(|e| E2eError::ConfigParse {
            path,
            reason: e.to_string(),
        })
    }

    /// Resolve the effective configuration for a profile.
    ///
    /// A missing profile falls back to defaults; a malformed one is an error.
    pub fn resolve(&self, name: &str) -> E2eResult<EffectiveConfig> {
        if name.trim().is_empty() {
            return Err(E2eError::InvalidConfig(
                "profile name must not be empty".to_string(),
            ));
        }

        let mut config = EffectiveConfig::defaults(&self.env);
        match self.load_profile(name) {
            Ok(profile) => config.apply_profile(profile),
            Err(E2eError::ConfigNotFound { path }) => {
                if self.env.ci {
                    info!("Profile {} not found, using defaults", path.display());
                } else {
                    debug!("Profile {} not found, using defaults", path.display());
                }
            }
            Err(e) => return Err(e),
        }
        config.apply_env(&self.env);
        Ok(config)
    }

    /// Defaults overlaid with the environment, no profile involved
    pub fn defaults(&self) -> EffectiveConfig {
        let mut config = EffectiveConfig::defaults(&self.env);
        config.apply_env(&self.env);
        config
    }

    /// Run bootstrap: never fails, a broken profile degrades to defaults
    pub fn resolve_or_default(&self, name: &str) -> EffectiveConfig {
        match self.resolve(name) {
            Ok(config) => config,
            Err(e) => {
                warn!("{}; continuing with default configuration", e);
                self.defaults()
            }
        }
    }

    /// Fallback-aware credential lookup for one profile and role
    pub fn get_credentials(&self, name: &str, role: &str) -> Credentials {
        self.resolve_or_default(name).credentials_for(role)
    }
}
