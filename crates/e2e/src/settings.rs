//! Run-level settings that sit beside the effective configuration

use std::sync::Arc;

use tracing::info;

use crate::config::{ConfigResolver, EffectiveConfig, EnvOverrides, DEFAULT_TIMEZONE};
use crate::playwright::{BrowserTarget, LaunchOptions};

/// Parallelism and retry policy for the scenario phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunPolicy {
    pub workers: usize,
    pub retries: u32,
}

impl RunPolicy {
    pub fn for_ci(ci: bool) -> Self {
        if ci {
            Self { workers: 4, retries: 2 }
        } else {
            Self { workers: 1, retries: 0 }
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunSettings {
    pub profile: String,
    pub timezone: String,
    pub ci: bool,
    pub target: BrowserTarget,
    pub policy: RunPolicy,
}

impl RunSettings {
    pub fn from_env(env: &EnvOverrides) -> Self {
        Self {
            profile: env.profile_name().to_string(),
            timezone: env
                .timezone
                .clone()
                .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string()),
            ci: env.ci,
            target: BrowserTarget::select(env.browser.as_deref(), env.ci),
            policy: RunPolicy::for_ci(env.ci),
        }
    }
}

/// Everything a run needs, resolved once at start
#[derive(Debug, Clone)]
pub struct RunContext {
    pub config: Arc<EffectiveConfig>,
    pub settings: RunSettings,
}

impl RunContext {
    /// Resolve configuration for the selected profile. Never fails.
    pub fn bootstrap(resolver: &ConfigResolver) -> Self {
        let env = resolver.env();
        let settings = RunSettings::from_env(env);
        let config = resolver.resolve_or_default(&settings.profile);

        if settings.ci {
            let state = |set: bool| if set { "set" } else { "not set (will use default)" };
            info!("Using profile: {}", settings.profile);
            info!("Base URL: {}", config.base_url);
            info!("Username from env: {}", state(env.username.is_some()));
            info!("Password from env: {}", state(env.password.is_some()));
        }

        Self {
            config: Arc::new(config),
            settings,
        }
    }

    pub fn launch_options(&self) -> LaunchOptions {
        LaunchOptions {
            target: self.settings.target.clone(),
            base_url: self.config.base_url.clone(),
            headless: self.config.headless,
            timezone: self.settings.timezone.clone(),
            timeouts: self.config.timeouts,
        }
    }
}
