use crate::constants::{CONFIG_DIR_NAME, WORKSPACE_FILE_NAME};
use crate::workspace::{Workspace, WorkspaceDocument};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Serialization format, picked from the file extension
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
}

impl Format {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Format::Json,
            _ => Format::Yaml,
        }
    }
}

/// Reads and writes workspace documents on disk
pub struct Storage {
    path: PathBuf,
}

impl Storage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Storage { path: path.into() }
    }

    /// `~/.courier/workspace.yaml`
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(CONFIG_DIR_NAME)
            .join(WORKSPACE_FILE_NAME)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the workspace; a missing file is an empty workspace
    pub fn load(&self) -> Result<Workspace> {
        let mut workspace = Workspace::new();
        if !self.path.exists() {
            return Ok(workspace);
        }
        let doc = read_document(&self.path)?;
        workspace.import(doc)?;
        Ok(workspace)
    }

    pub fn save(&self, workspace: &Workspace) -> Result<()> {
        write_document(&self.path, &workspace.export())
    }
}

/// Reads and validates a document
pub fn read_document(path: &Path) -> Result<WorkspaceDocument> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let doc: WorkspaceDocument = match Format::from_path(path) {
        Format::Json => serde_json::from_str(&content)?,
        Format::Yaml => serde_yaml::from_str(&content)?,
    };
    doc.validate()?;
    Ok(doc)
}

pub fn write_document(path: &Path, doc: &WorkspaceDocument) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        if !dir.exists() {
            fs::create_dir_all(dir)?;
        }
    }
    let content = match Format::from_path(path) {
        Format::Json => serde_json::to_string_pretty(doc)?,
        Format::Yaml => serde_yaml::to_string(doc)?,
    };
    fs::write(path, content).with_context(|| format!("writing {}", path.display()))?;
    tracing::debug!(path = %path.display(), "Workspace written");
    Ok(())
}
