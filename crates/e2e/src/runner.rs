//! Suite runner: login once, run scenarios in parallel, clean up

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, info_span, warn, Instrument};

use crate::artifact::SessionArtifact;
use crate::config::DEFAULT_ROLE;
use crate::error::E2eResult;
use crate::helpers::timestamp;
use crate::playwright::{BrowserDriver, LaunchOptions, Script};
use crate::session::SessionCoordinator;
use crate::settings::RunContext;
use crate::spec::ScenarioSpec;
use crate::step::StepRecord;

/// Result of running a single scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub name: String,
    pub success: bool,
    pub attempts: u32,
    pub duration_ms: u64,
    pub steps: Vec<StepRecord>,
    pub error: Option<String>,
}

/// Result of running the whole suite
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteResult {
    pub started_at: String,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration_ms: u64,
    pub session_steps: Vec<StepRecord>,
    pub results: Vec<ScenarioResult>,
}

impl SuiteResult {
    pub fn success(&self) -> bool {
        self.failed == 0
    }

    /// Write `results.json` into `output_dir`
    pub fn write(&self, output_dir: &Path) -> E2eResult<PathBuf> {
        std::fs::create_dir_all(output_dir)?;

        let path = output_dir.join("results.json");
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json)?;

        info!("Results written to: {}", path.display());
        Ok(path)
    }
}

/// Brackets the parallel scenario phase with session setup and teardown
pub struct SuiteRunner {
    context: RunContext,
    driver: Arc<dyn BrowserDriver>,
    artifact: SessionArtifact,
    role: String,
}

impl SuiteRunner {
    pub fn new(context: RunContext, driver: Arc<dyn BrowserDriver>, project_root: &Path) -> Self {
        Self {
            context,
            driver,
            artifact: SessionArtifact::for_project(project_root),
            role: DEFAULT_ROLE.to_string(),
        }
    }

    /// Role whose credentials the shared session logs in with
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }

    pub fn artifact(&self) -> &SessionArtifact {
        &self.artifact
    }

    /// Run every scenario.
    ///
    /// A failed login aborts before any scenario starts. Teardown runs
    /// after every worker has been joined, on every path.
    pub async fn run(&self, specs: &[ScenarioSpec]) -> E2eResult<SuiteResult> {
        let start = Instant::now();
        let started_at = timestamp();
        let launch = self.context.launch_options();
        let policy = self.context.settings.policy;

        let mut session = SessionCoordinator::new(
            Arc::clone(&self.driver),
            Arc::clone(&self.context.config),
            launch.clone(),
            self.artifact.clone(),
        )
        .with_role(self.role.clone())
        .with_ci(self.context.settings.ci);

        if let Err(e) = session.establish().await {
            session.teardown();
            return Err(e);
        }

        let storage_state = session.storage_state().map(Path::to_path_buf);
        info!(
            "Running {} scenario(s) on {} worker(s)...",
            specs.len(),
            policy.workers
        );

        let permits = Arc::new(Semaphore::new(policy.workers.max(1)));
        let mut workers = JoinSet::new();
        for (index, spec) in specs.iter().cloned().enumerate() {
            let permits = Arc::clone(&permits);
            let driver = Arc::clone(&self.driver);
            let launch = launch.clone();
            let storage_state = storage_state.clone();
            workers.spawn(async move {
                let _permit = permits.acquire_owned().await.ok();
                let result =
                    run_scenario(driver.as_ref(), launch, &spec, storage_state, policy.retries).await;
                (index, result)
            });
        }

        let mut indexed = Vec::with_capacity(specs.len());
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(entry) => indexed.push(entry),
                Err(e) => {
                    error!("Scenario worker panicked: {}", e);
                    indexed.push((
                        usize::MAX,
                        ScenarioResult {
                            name: "<worker>".to_string(),
                            success: false,
                            attempts: 0,
                            duration_ms: 0,
                            steps: vec![],
                            error: Some(e.to_string()),
                        },
                    ));
                }
            }
        }

        // Every worker has finished reading the artifact.
        session.teardown();

        indexed.sort_by_key(|(index, _)| *index);
        let results: Vec<ScenarioResult> = indexed.into_iter().map(|(_, r)| r).collect();
        let passed = results.iter().filter(|r| r.success).count();
        let failed = results.len() - passed;
        let duration_ms = start.elapsed().as_millis() as u64;

        info!(
            "Scenario results: {} passed, {} failed ({} ms)",
            passed, failed, duration_ms
        );

        Ok(SuiteResult {
            started_at,
            total: results.len(),
            passed,
            failed,
            duration_ms,
            session_steps: session.report().steps.clone(),
            results,
        })
    }
}

/// Run one scenario with retries in its own browser context
pub async fn run_scenario(
    driver: &dyn BrowserDriver,
    launch: LaunchOptions,
    spec: &ScenarioSpec,
    storage_state: Option<PathBuf>,
    retries: u32,
) -> ScenarioResult {
    let start = Instant::now();
    let mut script = Script::new(launch, spec.steps.clone());
    if !spec.no_auth {
        if let Some(path) = storage_state {
            script = script.with_storage_state_in(path);
        }
    }

    let mut attempt = 0;
    loop {
        attempt += 1;
        let span = info_span!("scenario", name = %spec.name, attempt);
        let (steps, error) = match driver.run(&script).instrument(span).await {
            Ok(outcome) if outcome.success => (outcome.steps, None),
            Ok(outcome) => (
                outcome.steps,
                Some(outcome.error.unwrap_or_else(|| "scenario failed".to_string())),
            ),
            Err(e) => (Vec::new(), Some(e.to_string())),
        };

        if error.is_none() || attempt > retries {
            match &error {
                None => info!("✓ {} ({} ms)", spec.name, start.elapsed().as_millis()),
                Some(e) => error!("✗ {} - {}", spec.name, e),
            }
            return ScenarioResult {
                name: spec.name.clone(),
                success: error.is_none(),
                attempts: attempt,
                duration_ms: start.elapsed().as_millis() as u64,
                steps,
                error,
            };
        }

        warn!(
            "Scenario {} failed on attempt {}, retrying: {}",
            spec.name,
            attempt,
            error.as_deref().unwrap_or_default()
        );
    }
}
