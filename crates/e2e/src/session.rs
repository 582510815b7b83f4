//! One login per run, shared by every worker
//!
//! `NotStarted -> Authenticating -> Established -> TornDown`. A failed
//! login ends in `Failed`; `TornDown` is absorbing.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::json;
use tracing::{debug, error, info, warn};

use crate::artifact::SessionArtifact;
use crate::config::{EffectiveConfig, DEFAULT_ROLE};
use crate::error::{E2eError, E2eResult};
use crate::pages::{data_test, login, products};
use crate::playwright::{BrowserDriver, LaunchOptions, Script};
use crate::step::{run_step, StepReport};

const MARKER_CAPTURE: &str = "landing_title";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NotStarted,
    Authenticating,
    Established,
    Failed,
    TornDown,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionState::NotStarted => "not_started",
            SessionState::Authenticating => "authenticating",
            SessionState::Established => "established",
            SessionState::Failed => "failed",
            SessionState::TornDown => "torn_down",
        };
        f.write_str(s)
    }
}

/// Performs the run's single login and owns the resulting artifact
pub struct SessionCoordinator {
    driver: Arc<dyn BrowserDriver>,
    config: Arc<EffectiveConfig>,
    launch: LaunchOptions,
    artifact: SessionArtifact,
    role: String,
    ci: bool,
    state: SessionState,
    report: StepReport,
}

impl SessionCoordinator {
    pub fn new(
        driver: Arc<dyn BrowserDriver>,
        config: Arc<EffectiveConfig>,
        launch: LaunchOptions,
        artifact: SessionArtifact,
    ) -> Self {
        Self {
            driver,
            config,
            launch,
            artifact,
            role: DEFAULT_ROLE.to_string(),
            ci: false,
            state: SessionState::NotStarted,
            report: StepReport::new(),
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }

    /// Report credential sources at info level
    pub fn with_ci(mut self, ci: bool) -> Self {
        self.ci = ci;
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn report(&self) -> &StepReport {
        &self.report
    }

    pub fn artifact(&self) -> &SessionArtifact {
        &self.artifact
    }

    /// Path workers seed their context from, once established
    pub fn storage_state(&self) -> Option<&Path> {
        (self.state == SessionState::Established).then(|| self.artifact.path())
    }

    /// Log in once and persist the session.
    ///
    /// Only legal from `NotStarted`. On any failure no artifact is left
    /// behind and the coordinator is `Failed`.
    pub async fn establish(&mut self) -> E2eResult<PathBuf> {
        if self.state != SessionState::NotStarted {
            return Err(E2eError::InvalidStateTransition {
                from: self.state.to_string(),
                to: SessionState::Authenticating.to_string(),
            });
        }
        self.state = SessionState::Authenticating;

        match self.authenticate().await {
            Ok(path) => {
                self.state = SessionState::Established;
                info!("Authentication successful and state saved to {}", path.display());
                Ok(path)
            }
            Err(e) => {
                self.state = SessionState::Failed;
                error!("Authentication setup failed: {}", e);
                Err(e)
            }
        }
    }

    async fn authenticate(&mut self) -> E2eResult<PathBuf> {
        if self.artifact.remove()? {
            warn!("Removed stale session artifact {}", self.artifact.path().display());
        }

        let (creds, source) = self.config.resolve_credentials(&self.role);
        if self.ci {
            info!(
                "Using {} credentials for role {} (USERNAME: {})",
                source,
                self.role,
                creds.masked_username()
            );
        } else {
            debug!("Using {} credentials for role {}", source, self.role);
        }

        let staged = self.artifact.staging()?;

        let mut actions = vec![login::navigate(None)];
        actions.extend(login::login(&creds.username, &creds.password));
        actions.push(products::wait_for_landing());
        actions.push(products::capture_title(MARKER_CAPTURE));
        let script = Script::new(self.launch.clone(), actions).with_storage_state_out(staged.path());

        let driver = Arc::clone(&self.driver);
        let outcome = run_step(
            Some(&mut self.report),
            "Login with username: {0} at {1}",
            &[json!(creds.masked_username()), json!(self.launch.base_url)],
            || async move { driver.run(&script).await },
        )
        .await?;
        self.report.extend(outcome.steps.iter().cloned());

        let completed = outcome.success;
        let observed = outcome.capture(MARKER_CAPTURE).map(str::trim);
        let landing_error = outcome.error.clone();
        run_step(
            Some(&mut self.report),
            "Verify landing marker {0} reads {1}",
            &[json!(data_test(products::TITLE)), json!(products::EXPECTED_TITLE)],
            || async move { verify_marker(completed, observed, landing_error) },
        )
        .await?;

        let artifact = &self.artifact;
        run_step(
            Some(&mut self.report),
            "Persist session state to {0}",
            &[json!(artifact.path().display().to_string())],
            || async move { artifact.commit(staged) },
        )
        .await?;

        Ok(self.artifact.path().to_path_buf())
    }

    /// Remove the artifact. Safe to call in any state, any number of times.
    pub fn teardown(&mut self) {
        match self.artifact.remove() {
            Ok(true) => info!("Authentication state cleaned up"),
            Ok(false) => debug!("No session artifact to clean up"),
            Err(e) => warn!("Session artifact cleanup failed: {}", e),
        }
        self.state = SessionState::TornDown;
    }
}

fn verify_marker(
    completed: bool,
    observed: Option<&str>,
    error: Option<String>,
) -> E2eResult<()> {
    let selector = data_test(products::TITLE);
    let expected = products::EXPECTED_TITLE;

    if !completed {
        return Err(E2eError::AuthenticationFailed(format!(
            "landing marker {} never appeared: {}",
            selector,
            error.unwrap_or_else(|| "login script failed".to_string())
        )));
    }

    match observed {
        Some(text) if text == expected => Ok(()),
        Some(text) => Err(E2eError::AuthenticationFailed(format!(
            "landing marker {} reads '{}', expected '{}'",
            selector, text, expected
        ))),
        None => Err(E2eError::AuthenticationFailed(format!(
            "landing marker {} is missing, expected '{}'",
            selector, expected
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_marker_matches() {
        assert!(verify_marker(true, Some("Products"), None).is_ok());
    }

    #[test]
    fn test_verify_marker_mismatch_names_marker() {
        let err = verify_marker(true, Some("Your Cart"), None).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains(r#"[data-test="title"]"#));
        assert!(msg.contains("Your Cart"));
    }

    #[test]
    fn test_verify_marker_missing() {
        assert!(matches!(
            verify_marker(true, None, None),
            Err(E2eError::AuthenticationFailed(_))
        ));
    }

    #[test]
    fn test_verify_marker_script_failure() {
        let err = verify_marker(false, None, Some("Timeout 30000ms exceeded".to_string())).unwrap_err();
        assert!(err.to_string().contains("Timeout 30000ms exceeded"));
    }

    #[test]
    fn test_state_display() {
        assert_eq!(SessionState::TornDown.to_string(), "torn_down");
    }
}
