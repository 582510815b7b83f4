//! Suite entry point
//!
//! Exit codes: 0 when every scenario passed, 1 when some failed, 2 when the
//! run itself could not complete (login failure, missing Playwright, ...).

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use storefront_e2e::playwright::PlaywrightDriver;
use storefront_e2e::{catalog, ConfigResolver, EnvOverrides, RunContext, ScenarioSpec, SuiteRunner};

#[derive(Parser, Debug)]
#[command(name = "storefront-e2e")]
#[command(about = "End-to-end regression suite for the sample storefront")]
#[command(version)]
struct Args {
    /// Project root holding profiles/, node_modules/ and .auth/
    #[arg(long, default_value = ".")]
    project_root: PathBuf,

    /// Directory of YAML scenarios, e.g. `scenarios/` (built-in catalog when omitted)
    #[arg(short, long)]
    scenarios: Option<PathBuf>,

    /// Run only scenarios matching this tag
    #[arg(short, long)]
    tag: Option<String>,

    /// Run only a specific scenario by name
    #[arg(short, long)]
    name: Option<String>,

    /// Role whose credentials establish the shared session
    #[arg(long, default_value = "standard_user")]
    role: String,

    /// Output directory for results
    #[arg(short, long, default_value = "playwright/output")]
    output: PathBuf,
}

fn main() {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: failed to create tokio runtime: {}", e);
            std::process::exit(2);
        }
    };

    match rt.block_on(async_main(args)) {
        Ok(true) => std::process::exit(0),
        Ok(false) => std::process::exit(1),
        Err(e) => {
            error!("{:#}", e);
            std::process::exit(2);
        }
    }
}

async fn async_main(args: Args) -> anyhow::Result<bool> {
    let resolver = ConfigResolver::for_project(&args.project_root, EnvOverrides::from_env());
    let context = RunContext::bootstrap(&resolver);
    info!(
        "Environment {} against {}",
        context.config.environment, context.config.base_url
    );

    let mut specs = match &args.scenarios {
        Some(dir) => ScenarioSpec::load_all(dir)?,
        None => {
            let creds = context.config.credentials_for(&args.role);
            catalog::builtin(&creds, &catalog::random_customer())
        }
    };
    if let Some(tag) = &args.tag {
        specs = ScenarioSpec::filter_by_tag(&specs, tag)
            .into_iter()
            .cloned()
            .collect();
    }
    if let Some(name) = &args.name {
        specs.retain(|s| &s.name == name);
        if specs.is_empty() {
            anyhow::bail!("Scenario not found: {}", name);
        }
    }

    let driver = PlaywrightDriver::new(&args.project_root).await?;
    let runner = SuiteRunner::new(context, Arc::new(driver), &args.project_root).with_role(args.role);

    let results = runner.run(&specs).await?;
    results.write(&args.output)?;

    Ok(results.success())
}
