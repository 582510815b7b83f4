//! Named steps for reporting
//!
//! Operations are wrapped at the call site with [`run_step`]. The title may
//! carry positional placeholders (`{0}`, `{1}`, ...) filled from the step
//! arguments. Running without a [`StepReport`] is allowed: the operation
//! still runs and the step is only logged.

use std::future::Future;
use std::sync::OnceLock;
use std::time::Instant;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info_span, Instrument};

use crate::error::E2eResult;

/// Outcome of one named step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub name: String,
    pub success: bool,
    pub duration_ms: u64,
    pub error: Option<String>,
}

/// Collects step records for one scenario or lifecycle phase
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StepReport {
    pub steps: Vec<StepRecord>,
}

impl StepReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: StepRecord) {
        self.steps.push(record);
    }

    pub fn extend(&mut self, records: impl IntoIterator<Item = StepRecord>) {
        self.steps.extend(records);
    }

    pub fn all_passed(&self) -> bool {
        self.steps.iter().all(|s| s.success)
    }
}

fn placeholder() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| Regex::new(r"\{(\d+)\}").expect("placeholder pattern is valid"))
}

/// Substitute `{N}` with the N-th argument.
///
/// Strings render bare, objects and arrays as compact JSON and an index with
/// no argument as `undefined`.
pub fn format_title(title: &str, args: &[Value]) -> String {
    placeholder()
        .replace_all(title, |caps: &regex::Captures<'_>| {
            let arg = caps[1].parse::<usize>().ok().and_then(|i| args.get(i));
            match arg {
                None => "undefined".to_string(),
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
            }
        })
        .into_owned()
}

/// Run `op` as a named step, recording it when a report is given.
pub async fn run_step<T, F, Fut>(
    report: Option<&mut StepReport>,
    title: &str,
    args: &[Value],
    op: F,
) -> E2eResult<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = E2eResult<T>>,
{
    let name = format_title(title, args);
    let span = info_span!("step", name = %name);
    let started = Instant::now();

    let result = op().instrument(span).await;

    match report {
        Some(report) => report.push(StepRecord {
            name,
            success: result.is_ok(),
            duration_ms: started.elapsed().as_millis() as u64,
            error: result.as_ref().err().map(|e| e.to_string()),
        }),
        None => debug!(step = %name, ok = result.is_ok(), "step ran outside a report"),
    }

    result
}
