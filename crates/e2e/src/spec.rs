//! Declarative YAML scenario specification

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{E2eError, E2eResult};

/// A complete scenario parsed from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioSpec {
    /// Unique name for this scenario
    pub name: String,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Tags for filtering scenarios
    #[serde(default)]
    pub tags: Vec<String>,

    /// Start from a fresh context instead of the shared login session
    #[serde(default)]
    pub no_auth: bool,

    /// Actions to execute in order
    pub steps: Vec<Action>,
}

/// A single browser action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// Navigate to a URL (relative to the base URL)
    Navigate {
        url: String,
        #[serde(default)]
        wait_for_selector: Option<String>,
    },

    /// Click an element
    Click {
        selector: String,
        #[serde(default)]
        timeout_ms: Option<u64>,
    },

    /// Fill an input field
    Fill {
        selector: String,
        value: String,
    },

    /// Wait until the page URL matches a glob such as `**/inventory.html`
    WaitForUrl {
        pattern: String,
    },

    /// Assert something about an element
    Assert {
        selector: String,
        #[serde(default)]
        visible: Option<bool>,
        #[serde(default)]
        text: Option<String>,
        #[serde(default)]
        text_contains: Option<String>,
        #[serde(default)]
        count: Option<usize>,
    },

    /// Read an element's text into the outcome under `name`
    Capture {
        name: String,
        selector: String,
    },

    /// Log a message (for debugging)
    Log {
        message: String,
    },
}

impl Action {
    /// Short step label; never includes filled values
    pub fn label(&self) -> String {
        match self {
            Action::Navigate { url, .. } => format!("navigate:{}", url),
            Action::Click { selector, .. } => format!("click:{}", selector),
            Action::Fill { selector, .. } => format!("fill:{}", selector),
            Action::WaitForUrl { pattern } => format!("wait_for_url:{}", pattern),
            Action::Assert { selector, .. } => format!("assert:{}", selector),
            Action::Capture { name, .. } => format!("capture:{}", name),
            Action::Log { message } => {
                let short: String = message.chars().take(30).collect();
                format!("log:{}", short)
            }
        }
    }
}

impl ScenarioSpec {
    /// Parse a scenario from YAML string
    pub fn from_yaml(yaml: &str) -> E2eResult<Self> {
        let spec: Self = serde_yaml::from_str(yaml)?;
        if spec.steps.is_empty() {
            return Err(E2eError::SpecParse(format!(
                "scenario '{}' has no steps",
                spec.name
            )));
        }
        Ok(spec)
    }

    /// Parse a scenario from a YAML file
    pub fn from_file(path: &Path) -> E2eResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
            .map_err(|e| E2eError::SpecParse(format!("{}: {}", path.display(), e)))
    }

    /// Load all scenarios from a directory, sorted by name
    pub fn load_all(dir: &Path) -> E2eResult<Vec<Self>> {
        let mut specs = Vec::new();

        for entry in walkdir::WalkDir::new(dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .extension()
                    .map(|ext| ext == "yaml" || ext == "yml")
                    .unwrap_or(false)
            })
        {
            specs.push(Self::from_file(entry.path())?);
        }

        specs.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(specs)
    }

    /// Filter scenarios by tag
    pub fn filter_by_tag<'a>(specs: &'a [Self], tag: &str) -> Vec<&'a Self> {
        specs.iter().filter(|s| s.tags.iter().any(|t| t == tag)).collect()
    }
}
