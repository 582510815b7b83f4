//! Storefront E2E Suite
//!
//! Rust-controlled end-to-end regression suite for the sample storefront:
//! - Resolves one effective configuration from defaults, a named profile
//!   and environment variables
//! - Logs in once per run and shares the saved browser session with every
//!   scenario worker
//! - Drives Playwright through generated Node scripts
//!
//! # Run lifecycle
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  RunContext::bootstrap(ConfigResolver)                      │
//! │    └── EffectiveConfig (immutable, Arc-shared)              │
//! ├─────────────────────────────────────────────────────────────┤
//! │  SuiteRunner::run(scenarios)                                │
//! │    ├── SessionCoordinator::establish()  -> .auth/user.json  │
//! │    ├── N workers: run_scenario(storage_state = artifact)    │
//! │    └── SessionCoordinator::teardown()   -> artifact removed │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod artifact;
pub mod catalog;
pub mod config;
pub mod error;
pub mod helpers;
pub mod pages;
pub mod playwright;
pub mod runner;
pub mod session;
pub mod settings;
pub mod spec;
pub mod step;

pub use config::{ConfigResolver, Credentials, EffectiveConfig, EnvOverrides};
pub use error::{E2eError, E2eResult};
pub use runner::{SuiteResult, SuiteRunner};
pub use session::{SessionCoordinator, SessionState};
pub use settings::RunContext;
pub use spec::{Action, ScenarioSpec};
