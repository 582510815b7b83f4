//! The persisted login session shared with workers
//!
//! Written once per run through a temp file in the same directory and a
//! rename, so a reader sees either a complete file or none at all.

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::error::{E2eError, E2eResult};

/// Location of the artifact relative to the project root
pub const ARTIFACT_RELATIVE_PATH: &str = ".auth/user.json";

/// Browser storage state as saved by Playwright
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageState {
    #[serde(default)]
    pub cookies: Vec<Cookie>,
    #[serde(default)]
    pub origins: Vec<OriginState>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
    #[serde(default)]
    pub expires: f64,
    #[serde(default)]
    pub http_only: bool,
    #[serde(default)]
    pub secure: bool,
    #[serde(default)]
    pub same_site: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OriginState {
    pub origin: String,
    #[serde(default)]
    pub local_storage: Vec<StorageEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageEntry {
    pub name: String,
    pub value: String,
}

/// Handle to the artifact path; holds no open file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionArtifact {
    path: PathBuf,
}

impl SessionArtifact {
    pub fn for_project(root: &Path) -> Self {
        Self::at(root.join(ARTIFACT_RELATIVE_PATH))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    fn io_error(&self, source: io::Error) -> E2eError {
        E2eError::ArtifactIo {
            path: self.path.clone(),
            source,
        }
    }

    /// Temp file next to the artifact, creating the directory if needed.
    ///
    /// Dropping it without [`commit`](Self::commit) deletes it.
    pub fn staging(&self) -> E2eResult<NamedTempFile> {
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(|e| self.io_error(e))?;
        tempfile::Builder::new()
            .prefix(".user-")
            .suffix(".json.tmp")
            .tempfile_in(&dir)
            .map_err(|e| self.io_error(e))
    }

    /// Validate a staged file and move it over the artifact
    pub fn commit(&self, staged: NamedTempFile) -> E2eResult<StorageState> {
        let content = std::fs::read_to_string(staged.path()).map_err(|e| self.io_error(e))?;
        let state = parse_state(&content).map_err(|e| self.io_error(e))?;
        staged.persist(&self.path).map_err(|e| self.io_error(e.error))?;
        Ok(state)
    }

    /// Read the artifact as a worker would
    pub fn load(&self) -> E2eResult<StorageState> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| self.io_error(e))?;
        parse_state(&content).map_err(|e| self.io_error(e))
    }

    /// Delete the artifact. Returns whether a file was removed.
    pub fn remove(&self) -> E2eResult<bool> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(self.io_error(e)),
        }
    }
}

fn parse_state(content: &str) -> io::Result<StorageState> {
    if content.trim().is_empty() {
        return Err(io::Error::new(io::ErrorKind::InvalidData, "storage state is empty"));
    }
    serde_json::from_str(content).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const STATE: &str = r#"{
        "cookies": [{
            "name": "session-username",
            "value": "standard_user",
            "domain": "www.saucedemo.com",
            "path": "/",
            "expires": 1760000000.5,
            "httpOnly": false,
            "secure": false,
            "sameSite": "Lax"
        }],
        "origins": []
    }"#;

    #[test]
    fn test_artifact_path_under_project() {
        let artifact = SessionArtifact::for_project(Path::new("/work/suite"));
        assert_eq!(artifact.path(), Path::new("/work/suite/.auth/user.json"));
    }

    #[test]
    fn test_commit_creates_artifact() {
        let tmp = tempfile::tempdir().unwrap();
        let artifact = SessionArtifact::for_project(tmp.path());

        let mut staged = artifact.staging().unwrap();
        staged.write_all(STATE.as_bytes()).unwrap();
        let state = artifact.commit(staged).unwrap();

        assert!(artifact.exists());
        assert_eq!(state.cookies[0].name, "session-username");
        assert_eq!(artifact.load().unwrap(), state);
    }

    #[test]
    fn test_commit_rejects_empty_state() {
        let tmp = tempfile::tempdir().unwrap();
        let artifact = SessionArtifact::for_project(tmp.path());

        let staged = artifact.staging().unwrap();
        let staged_path = staged.path().to_path_buf();
        assert!(matches!(artifact.commit(staged), Err(E2eError::ArtifactIo { .. })));
        assert!(!artifact.exists());
        assert!(!staged_path.exists());
    }

    #[test]
    fn test_dropped_staging_leaves_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let artifact = SessionArtifact::for_project(tmp.path());

        let staged = artifact.staging().unwrap();
        let staged_path = staged.path().to_path_buf();
        drop(staged);

        assert!(!staged_path.exists());
        assert!(!artifact.exists());
    }

    #[test]
    fn test_commit_overwrites_stale_artifact() {
        let tmp = tempfile::tempdir().unwrap();
        let artifact = SessionArtifact::for_project(tmp.path());
        std::fs::create_dir_all(artifact.path().parent().unwrap()).unwrap();
        std::fs::write(artifact.path(), r#"{"cookies":[],"origins":[]}"#).unwrap();

        let mut staged = artifact.staging().unwrap();
        staged.write_all(STATE.as_bytes()).unwrap();
        artifact.commit(staged).unwrap();

        assert_eq!(artifact.load().unwrap().cookies.len(), 1);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let artifact = SessionArtifact::for_project(tmp.path());
        std::fs::create_dir_all(artifact.path().parent().unwrap()).unwrap();
        std::fs::write(artifact.path(), STATE).unwrap();

        assert!(artifact.remove().unwrap());
        assert!(!artifact.remove().unwrap());
        assert!(!artifact.exists());
    }
}
