use std::fmt;

use serde::{Deserialize, Serialize};

use super::window::WindowId;
use crate::layout_engine::MosaicNode;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkspaceId(String);

impl WorkspaceId {
    pub fn new(id: impl Into<String>) -> Self { Self(id.into()) }

    pub fn random() -> Self { Self(uuid::Uuid::new_v4().to_string()) }

    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for WorkspaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl From<&str> for WorkspaceId {
    fn from(value: &str) -> Self { Self::new(value) }
}

/// One tab of the shell: a layout tree plus the windows placed in it.
///
/// `window_ids` keeps the order windows were opened in, which is unrelated to
/// where they sit in `layout`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    pub id: WorkspaceId,
    pub number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub layout: Option<MosaicNode>,
    #[serde(default)]
    pub window_ids: Vec<WindowId>,
}

impl Workspace {
    pub fn new(id: WorkspaceId, number: u32, label: Option<String>) -> Self {
        Self {
            id,
            number,
            label,
            layout: None,
            window_ids: Vec::new(),
        }
    }

    pub fn contains_window(&self, window_id: &WindowId) -> bool {
        self.window_ids.contains(window_id)
    }

    pub fn window_count(&self) -> usize { self.window_ids.len() }

    /// Label if one was set, otherwise the workspace number.
    pub fn display_name(&self) -> String {
        match &self.label {
            Some(label) => label.clone(),
            None => self.number.to_string(),
        }
    }
}

/// Smallest positive integer missing from `existing`.
///
/// The answer can never exceed `count + 1`, so only numbers in that range are
/// tracked and memory stays proportional to the number of inputs.
pub fn find_lowest_available_number(existing: impl IntoIterator<Item = u32>) -> u32 {
    let existing: Vec<u32> = existing.into_iter().collect();
    let mut taken = vec![false; existing.len() + 1];
    for number in existing {
        if number == 0 {
            continue;
        }
        if let Some(slot) = taken.get_mut(number as usize - 1) {
            *slot = true;
        }
    }
    let free = taken.iter().position(|taken| !taken).unwrap_or(taken.len());
    free as u32 + 1
}

/// Orders workspaces by number and returns the id after `current`,
/// wrapping around at the end.
pub(crate) fn next_by_number<'a>(
    workspaces: impl IntoIterator<Item = &'a Workspace>,
    current: &WorkspaceId,
) -> Option<WorkspaceId> {
    let ordered = sorted_ids(workspaces);
    let current_pos = ordered.iter().position(|id| id == current)?;
    let next_pos = (current_pos + 1) % ordered.len();
    ordered.get(next_pos).cloned()
}

pub(crate) fn prev_by_number<'a>(
    workspaces: impl IntoIterator<Item = &'a Workspace>,
    current: &WorkspaceId,
) -> Option<WorkspaceId> {
    let ordered = sorted_ids(workspaces);
    let current_pos = ordered.iter().position(|id| id == current)?;
    let prev_pos = if current_pos == 0 {
        ordered.len() - 1
    } else {
        current_pos - 1
    };
    ordered.get(prev_pos).cloned()
}

fn sorted_ids<'a>(workspaces: impl IntoIterator<Item = &'a Workspace>) -> Vec<WorkspaceId> {
    let mut workspaces: Vec<_> = workspaces.into_iter().collect();
    workspaces.sort_by_key(|ws| ws.number);
    workspaces.into_iter().map(|ws| ws.id.clone()).collect()
}
