//! Workspace state: collections, environments and history
//!
//! One owned value holds everything a session mutates. Export/import moves
//! collections and environments (never history) through a
//! [`WorkspaceDocument`].

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::WorkspaceError;
use crate::models::{Collection, Environment, HistoryEntry, Outcome, SavedRequest};

/// Whether a save added a new request or replaced one of the same name
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SaveOutcome {
    Added,
    Replaced,
}

/// Counts reported after an import
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub collections_added: usize,
    pub collections_replaced: usize,
    pub environments_added: usize,
    pub environments_replaced: usize,
}

/// Export/import document
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkspaceDocument {
    pub collections: Vec<Collection>,
    pub environments: Vec<Environment>,
}

impl WorkspaceDocument {
    /// Parses and validates a JSON document
    pub fn from_json(text: &str) -> Result<Self, WorkspaceError> {
        let doc: WorkspaceDocument = serde_json::from_str(text)
            .map_err(|e| WorkspaceError::InvalidDocument(e.to_string()))?;
        doc.validate()?;
        Ok(doc)
    }

    pub fn to_json(&self) -> Result<String, WorkspaceError> {
        serde_json::to_string_pretty(self).map_err(|e| WorkspaceError::InvalidDocument(e.to_string()))
    }

    /// Trims surrounding whitespace from every collection, request and
    /// environment name
    pub fn normalize_names(&mut self) {
        for collection in &mut self.collections {
            trim_in_place(&mut collection.name);
            for request in &mut collection.requests {
                trim_in_place(&mut request.name);
            }
        }
        for environment in &mut self.environments {
            trim_in_place(&mut environment.name);
        }
    }

    /// Rejects empty or duplicated names anywhere in the document. Names are
    /// compared after trimming.
    pub fn validate(&self) -> Result<(), WorkspaceError> {
        let invalid = |msg: String| Err(WorkspaceError::InvalidDocument(msg));

        let mut collections = HashSet::new();
        for collection in &self.collections {
            if collection.name.trim().is_empty() {
                return invalid("collection with an empty name".to_string());
            }
            if !collections.insert(collection.name.trim()) {
                return invalid(format!("collection '{}' appears more than once", collection.name));
            }
            let mut requests = HashSet::new();
            for request in &collection.requests {
                if request.name.trim().is_empty() {
                    return invalid(format!("unnamed request in collection '{}'", collection.name));
                }
                if !requests.insert(request.name.trim()) {
                    return invalid(format!(
                        "request '{}' appears more than once in collection '{}'",
                        request.name, collection.name
                    ));
                }
            }
        }

        let mut environments = HashSet::new();
        for environment in &self.environments {
            if environment.name.trim().is_empty() {
                return invalid("environment with an empty name".to_string());
            }
            if !environments.insert(environment.name.trim()) {
                return invalid(format!("environment '{}' appears more than once", environment.name));
            }
        }
        Ok(())
    }
}

fn trim_in_place(name: &mut String) {
    let trimmed = name.trim();
    if trimmed.len() != name.len() {
        *name = trimmed.to_string();
    }
}

/// A row of the history comparison view
#[derive(Clone, Debug, PartialEq)]
pub struct ComparisonRow {
    pub index: usize,
    pub request: String,
    pub status: Option<u16>,
    pub elapsed_ms: Option<f64>,
    pub size_kb: Option<f64>,
}

/// Main workspace state - pure data, no I/O
#[derive(Debug, Default)]
pub struct Workspace {
    collections: Vec<Collection>,
    environments: Vec<Environment>,
    active_collection: Option<String>,
    active_environment: Option<String>,
    history: Vec<HistoryEntry>,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================
    // Collections
    // ========================

    pub fn collections(&self) -> &[Collection] {
        &self.collections
    }

    pub fn collection(&self, name: &str) -> Option<&Collection> {
        self.collections.iter().find(|c| c.name == name)
    }

    fn collection_mut(&mut self, name: &str) -> Result<&mut Collection, WorkspaceError> {
        self.collections
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or_else(|| WorkspaceError::UnknownCollection(name.to_string()))
    }

    /// Adds an empty collection and makes it active
    pub fn create_collection(&mut self, name: &str) -> Result<(), WorkspaceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(WorkspaceError::EmptyName("collection"));
        }
        if self.collection(name).is_some() {
            return Err(WorkspaceError::DuplicateName {
                kind: "collection",
                name: name.to_string(),
            });
        }
        self.collections.push(Collection::new(name));
        self.active_collection = Some(name.to_string());
        tracing::debug!(collection = name, "Collection created");
        Ok(())
    }

    pub fn delete_collection(&mut self, name: &str) -> Result<Collection, WorkspaceError> {
        let pos = self
            .collections
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| WorkspaceError::UnknownCollection(name.to_string()))?;
        if self.active_collection.as_deref() == Some(name) {
            self.active_collection = None;
        }
        tracing::debug!(collection = name, "Collection deleted");
        Ok(self.collections.remove(pos))
    }

    pub fn set_active_collection(&mut self, name: &str) -> Result<(), WorkspaceError> {
        if self.collection(name).is_none() {
            return Err(WorkspaceError::UnknownCollection(name.to_string()));
        }
        self.active_collection = Some(name.to_string());
        Ok(())
    }

    pub fn active_collection(&self) -> Option<&Collection> {
        self.active_collection.as_deref().and_then(|name| self.collection(name))
    }

    /// Saves by name: a request with the same name is overwritten in place,
    /// otherwise it is appended.
    pub fn save_request(
        &mut self,
        collection: &str,
        mut request: SavedRequest,
    ) -> Result<SaveOutcome, WorkspaceError> {
        trim_in_place(&mut request.name);
        if request.name.is_empty() {
            return Err(WorkspaceError::EmptyName("request"));
        }
        let target = self.collection_mut(collection)?;
        let outcome = match target.requests.iter_mut().find(|r| r.name == request.name) {
            Some(existing) => {
                *existing = request;
                SaveOutcome::Replaced
            }
            None => {
                target.requests.push(request);
                SaveOutcome::Added
            }
        };
        tracing::debug!(collection, ?outcome, "Request saved");
        Ok(outcome)
    }

    pub fn save_to_active(&mut self, request: SavedRequest) -> Result<SaveOutcome, WorkspaceError> {
        let active = self
            .active_collection
            .clone()
            .ok_or(WorkspaceError::NoActiveCollection)?;
        self.save_request(&active, request)
    }

    /// Removes a request. Returns `Ok(false)` when no request has that name.
    pub fn delete_request(&mut self, collection: &str, name: &str) -> Result<bool, WorkspaceError> {
        let target = self.collection_mut(collection)?;
        let before = target.requests.len();
        target.requests.retain(|r| r.name != name);
        let removed = target.requests.len() != before;
        if !removed {
            tracing::debug!(collection, request = name, "Nothing to delete");
        }
        Ok(removed)
    }

    pub fn request(&self, collection: &str, name: &str) -> Option<&SavedRequest> {
        self.collection(collection).and_then(|c| c.get(name))
    }

    // ========================
    // Environments
    // ========================

    pub fn environments(&self) -> &[Environment] {
        &self.environments
    }

    pub fn environment(&self, name: &str) -> Option<&Environment> {
        self.environments.iter().find(|e| e.name == name)
    }

    fn environment_mut(&mut self, name: &str) -> Result<&mut Environment, WorkspaceError> {
        self.environments
            .iter_mut()
            .find(|e| e.name == name)
            .ok_or_else(|| WorkspaceError::UnknownEnvironment(name.to_string()))
    }

    pub fn add_environment(&mut self, mut environment: Environment) -> Result<(), WorkspaceError> {
        trim_in_place(&mut environment.name);
        if environment.name.is_empty() {
            return Err(WorkspaceError::EmptyName("environment"));
        }
        if self.environment(&environment.name).is_some() {
            return Err(WorkspaceError::DuplicateName {
                kind: "environment",
                name: environment.name,
            });
        }
        tracing::debug!(environment = %environment.name, "Environment added");
        self.environments.push(environment);
        Ok(())
    }

    pub fn delete_environment(&mut self, name: &str) -> Result<Environment, WorkspaceError> {
        let pos = self
            .environments
            .iter()
            .position(|e| e.name == name)
            .ok_or_else(|| WorkspaceError::UnknownEnvironment(name.to_string()))?;
        if self.active_environment.as_deref() == Some(name) {
            self.active_environment = None;
        }
        Ok(self.environments.remove(pos))
    }

    pub fn set_variable(
        &mut self,
        environment: &str,
        key: &str,
        value: &str,
    ) -> Result<(), WorkspaceError> {
        if key.trim().is_empty() {
            return Err(WorkspaceError::EmptyName("variable"));
        }
        self.environment_mut(environment)?.set(key, value);
        Ok(())
    }

    pub fn remove_variable(&mut self, environment: &str, key: &str) -> Result<bool, WorkspaceError> {
        Ok(self.environment_mut(environment)?.remove(key).is_some())
    }

    /// Activates an environment, or deactivates with `None`
    pub fn set_active_environment(&mut self, name: Option<&str>) -> Result<(), WorkspaceError> {
        match name {
            Some(name) if self.environment(name).is_none() => {
                Err(WorkspaceError::UnknownEnvironment(name.to_string()))
            }
            Some(name) => {
                self.active_environment = Some(name.to_string());
                Ok(())
            }
            None => {
                self.active_environment = None;
                Ok(())
            }
        }
    }

    pub fn active_environment(&self) -> Option<&Environment> {
        self.active_environment.as_deref().and_then(|name| self.environment(name))
    }

    // ========================
    // History
    // ========================

    pub fn append_history(&mut self, entry: HistoryEntry) -> usize {
        self.history.push(entry);
        self.history.len() - 1
    }

    /// Oldest first
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Projects the selected entries for side-by-side comparison.
    /// Unknown indices are skipped.
    pub fn compare_history(&self, indices: &[usize]) -> Vec<ComparisonRow> {
        indices
            .iter()
            .filter_map(|&index| self.history.get(index).map(|entry| (index, entry)))
            .map(|(index, entry)| {
                let response = entry.outcome.response();
                ComparisonRow {
                    index,
                    request: entry.request.label(),
                    status: response.map(|r| r.status),
                    elapsed_ms: response.map(|r| r.elapsed_ms),
                    size_kb: response.map(|r| r.size as f64 / 1024.0),
                }
            })
            .collect()
    }

    /// Number of history entries that never got a response
    pub fn failed_sends(&self) -> usize {
        self.history
            .iter()
            .filter(|e| matches!(e.outcome, Outcome::Failed { .. }))
            .count()
    }

    // ========================
    // Export / import
    // ========================

    pub fn export(&self) -> WorkspaceDocument {
        WorkspaceDocument {
            collections: self.collections.clone(),
            environments: self.environments.clone(),
        }
    }

    /// Merges a validated document, last-imported-wins: an imported
    /// collection or environment replaces the existing one of the same name
    /// in place; new names are appended in document order. Nothing is
    /// applied if validation fails. Names are trimmed first, as everywhere
    /// else in the workspace.
    pub fn import(&mut self, mut doc: WorkspaceDocument) -> Result<ImportSummary, WorkspaceError> {
        doc.normalize_names();
        doc.validate()?;
        let mut summary = ImportSummary::default();

        let mut positions: BTreeMap<String, usize> = self
            .collections
            .iter()
            .enumerate()
            .map(|(i, c)| (c.name.clone(), i))
            .collect();
        for collection in doc.collections {
            match positions.get(&collection.name) {
                Some(&i) => {
                    self.collections[i] = collection;
                    summary.collections_replaced += 1;
                }
                None => {
                    positions.insert(collection.name.clone(), self.collections.len());
                    self.collections.push(collection);
                    summary.collections_added += 1;
                }
            }
        }

        for environment in doc.environments {
            match self.environments.iter_mut().find(|e| e.name == environment.name) {
                Some(existing) => {
                    *existing = environment;
                    summary.environments_replaced += 1;
                }
                None => {
                    self.environments.push(environment);
                    summary.environments_added += 1;
                }
            }
        }

        tracing::info!(?summary, "Workspace imported");
        Ok(summary)
    }
}
