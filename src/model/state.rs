use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::registry::WindowRegistry;
use super::window::WindowId;
use super::workspace::{Workspace, WorkspaceId, find_lowest_available_number};
use crate::common::collections::{HashMap, HashSet};
use crate::layout_engine::{LayoutConfig, LayoutError, MosaicNode};

/// The whole shell state the layout engine threads through its operations.
///
/// Engine operations never mutate a state in place; they return a new one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState<P = serde_json::Value> {
    pub workspaces: HashMap<WorkspaceId, Workspace>,
    pub windows: WindowRegistry<P>,
    pub active_workspace_id: WorkspaceId,
    #[serde(default)]
    pub layout_config: LayoutConfig,
}

impl<P> Default for AppState<P> {
    fn default() -> Self { Self::new() }
}

impl<P> AppState<P> {
    /// A state with a single empty workspace numbered 1.
    pub fn new() -> Self { Self::with_workspaces([None]) }

    /// One workspace per label, numbered from 1 in order. The first one is
    /// active. An empty iterator still yields a single workspace.
    pub fn with_workspaces(labels: impl IntoIterator<Item = Option<String>>) -> Self {
        let mut workspaces = HashMap::default();
        let mut first = None;
        for label in labels {
            let id = fresh_workspace_id(&workspaces);
            let number =
                find_lowest_available_number(workspaces.values().map(|ws: &Workspace| ws.number));
            first.get_or_insert_with(|| id.clone());
            workspaces.insert(id.clone(), Workspace::new(id, number, label));
        }
        let active_workspace_id = match first {
            Some(id) => id,
            None => {
                let id = WorkspaceId::random();
                workspaces.insert(id.clone(), Workspace::new(id.clone(), 1, None));
                id
            }
        };
        Self {
            workspaces,
            windows: WindowRegistry::default(),
            active_workspace_id,
            layout_config: LayoutConfig::default(),
        }
    }

    pub fn with_layout_config(mut self, layout_config: LayoutConfig) -> Self {
        self.layout_config = layout_config;
        self
    }

    pub fn workspace(&self, id: &WorkspaceId) -> Option<&Workspace> { self.workspaces.get(id) }

    pub fn active_workspace(&self) -> Option<&Workspace> {
        self.workspaces.get(&self.active_workspace_id)
    }

    /// Workspaces ordered by their number.
    pub fn workspaces_by_number(&self) -> Vec<&Workspace> {
        let mut out: Vec<_> = self.workspaces.values().collect();
        out.sort_by_key(|ws| ws.number);
        out
    }

    pub fn workspace_by_number(&self, number: u32) -> Option<&Workspace> {
        self.workspaces.values().find(|ws| ws.number == number)
    }

    /// Workspace whose list or tree holds `window_id`.
    pub fn workspace_of_window(&self, window_id: &WindowId) -> Option<&WorkspaceId> {
        self.workspaces
            .values()
            .find(|ws| {
                ws.contains_window(window_id)
                    || ws.layout.as_ref().is_some_and(|tree| tree.contains(window_id))
            })
            .map(|ws| &ws.id)
    }

    pub fn next_workspace_number(&self) -> u32 {
        find_lowest_available_number(self.workspaces.values().map(|ws| ws.number))
    }

    pub(crate) fn fresh_workspace_id(&self) -> WorkspaceId { fresh_workspace_id(&self.workspaces) }

    /// Checks the data-model invariants and describes every violation found.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if !self.workspaces.contains_key(&self.active_workspace_id) {
            issues.push(format!(
                "active workspace {} does not exist",
                self.active_workspace_id
            ));
        }

        let mut numbers = HashSet::default();
        let mut owners: HashMap<&WindowId, &WorkspaceId> = HashMap::default();

        for (key, workspace) in &self.workspaces {
            if key != &workspace.id {
                issues.push(format!(
                    "workspace stored under {} has id {}",
                    key, workspace.id
                ));
            }
            if workspace.number == 0 {
                issues.push(format!("workspace {} has number 0", workspace.id));
            }
            if !numbers.insert(workspace.number) {
                issues.push(format!(
                    "workspace number {} is used more than once",
                    workspace.number
                ));
            }
            issues.extend(validate_workspace(workspace, &self.windows));

            for window_id in &workspace.window_ids {
                if let Some(other) = owners.insert(window_id, &workspace.id) {
                    if other != &workspace.id {
                        issues.push(format!(
                            "window {} is listed in workspaces {} and {}",
                            window_id, other, workspace.id
                        ));
                    }
                }
            }
        }

        for window_id in self.windows.ids() {
            if !owners.contains_key(window_id) {
                issues.push(format!("window {window_id} is not placed in any workspace"));
            }
        }

        issues
    }
}

fn validate_workspace<P>(workspace: &Workspace, windows: &WindowRegistry<P>) -> Vec<String> {
    let mut issues = Vec::new();
    let id = &workspace.id;

    match (&workspace.layout, workspace.window_ids.is_empty()) {
        (None, false) => issues.push(format!("workspace {id} has windows but no layout")),
        (Some(_), true) => issues.push(format!("workspace {id} has a layout but no windows")),
        _ => {}
    }

    let mut listed = HashSet::default();
    for window_id in &workspace.window_ids {
        if !listed.insert(window_id) {
            issues.push(format!("workspace {id} lists window {window_id} twice"));
        }
        if !windows.contains(window_id) {
            issues.push(format!(
                "workspace {id} lists window {window_id} missing from the registry"
            ));
        }
    }

    if let Some(split) = workspace.layout.as_ref().and_then(MosaicNode::invalid_split) {
        issues.push(format!(
            "workspace {id} layout has split percentage {split} outside (0, 100)"
        ));
    }

    let leaves = workspace.layout.as_ref().map(|tree| tree.leaves()).unwrap_or_default();
    let mut seen = HashSet::default();
    for leaf in &leaves {
        if !seen.insert(*leaf) {
            issues.push(format!("workspace {id} layout holds window {leaf} twice"));
        }
        if !listed.contains(*leaf) {
            issues.push(format!("workspace {id} layout holds unlisted window {leaf}"));
        }
    }
    for window_id in &workspace.window_ids {
        if !seen.contains(window_id) {
            issues.push(format!(
                "workspace {id} lists window {window_id} that is not in its layout"
            ));
        }
    }

    issues
}

fn fresh_workspace_id(workspaces: &HashMap<WorkspaceId, Workspace>) -> WorkspaceId {
    loop {
        let id = WorkspaceId::random();
        if !workspaces.contains_key(&id) {
            return id;
        }
    }
}

impl<P: Serialize> AppState<P> {
    pub fn to_json(&self) -> Result<String, LayoutError> { Ok(serde_json::to_string_pretty(self)?) }

    pub fn save(&self, path: &Path) -> Result<(), LayoutError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, self.to_json()?)?;
        debug!(path = %path.display(), workspaces = self.workspaces.len(), "saved snapshot");
        Ok(())
    }
}

impl<P: DeserializeOwned> AppState<P> {
    /// Parses a snapshot. Layout trees nest one level per split, so the usual
    /// JSON recursion limit does not apply.
    pub fn from_json(buf: &str) -> Result<Self, LayoutError> {
        let mut de = serde_json::Deserializer::from_str(buf);
        de.disable_recursion_limit();
        let state = Self::deserialize(&mut de)?;
        de.end()?;
        Ok(state)
    }

    pub fn load(path: &Path) -> Result<Self, LayoutError> {
        let buf = fs::read_to_string(path)?;
        Self::from_json(&buf)
    }
}
