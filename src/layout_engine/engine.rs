//! Reducers over [`AppState`].
//!
//! Nothing here keeps state between calls. Each operation reads the state it
//! is handed, re-checks the active workspace, and returns a fresh value; the
//! input is never modified.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use super::error::LayoutError;
use super::insertion::LayoutConfig;
use super::mosaic::{MosaicNode, insert_leaf, remove_leaf};
use super::workspaces;
use crate::model::{AppState, WindowId, WindowInstance, WindowSpec, Workspace, WorkspaceId};

/// Everything the shell can ask the layout engine to do.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutCommand<P = serde_json::Value> {
    OpenWindow(WindowSpec<P>),
    CloseWindow(WindowId),
    CreateWorkspace {
        #[serde(default)]
        label: Option<String>,
    },
    DeleteWorkspace(WorkspaceId),
    SwitchWorkspace(WorkspaceId),
    NextWorkspace,
    PrevWorkspace,
    RenameWorkspace {
        workspace: WorkspaceId,
        #[serde(default)]
        label: Option<String>,
    },
    SetLayoutConfig(LayoutConfig),
    SetLayout {
        workspace: WorkspaceId,
        layout: Option<MosaicNode>,
    },
    MoveWindowToWorkspace {
        window: WindowId,
        workspace: WorkspaceId,
    },
}

/// New state plus whatever the command created.
#[derive(Clone, Debug, PartialEq)]
pub struct EventResponse<P = serde_json::Value> {
    pub state: AppState<P>,
    pub window: Option<WindowId>,
    pub workspace: Option<WorkspaceId>,
}

impl<P> EventResponse<P> {
    fn state(state: AppState<P>) -> Self {
        Self {
            state,
            window: None,
            workspace: None,
        }
    }
}

pub fn apply<P: Clone>(
    state: &AppState<P>,
    command: LayoutCommand<P>,
) -> Result<EventResponse<P>, LayoutError> {
    use LayoutCommand::*;
    let response = match command {
        OpenWindow(spec) => {
            let (state, id) = add_window(state, spec)?;
            EventResponse {
                window: Some(id),
                ..EventResponse::state(state)
            }
        }
        CloseWindow(id) => EventResponse::state(remove_window(state, &id)),
        CreateWorkspace { label } => {
            let (state, id) = workspaces::create_workspace(state, label);
            EventResponse {
                workspace: Some(id),
                ..EventResponse::state(state)
            }
        }
        DeleteWorkspace(id) => EventResponse::state(workspaces::delete_workspace(state, &id)?),
        SwitchWorkspace(id) => {
            EventResponse::state(workspaces::set_active_workspace(state, &id)?)
        }
        NextWorkspace => EventResponse::state(workspaces::next_workspace(state)?),
        PrevWorkspace => EventResponse::state(workspaces::prev_workspace(state)?),
        RenameWorkspace { workspace, label } => {
            EventResponse::state(workspaces::rename_workspace(state, &workspace, label)?)
        }
        SetLayoutConfig(config) => {
            EventResponse::state(workspaces::set_layout_config(state, config)?)
        }
        SetLayout { workspace, layout } => {
            EventResponse::state(workspaces::set_layout(state, &workspace, layout)?)
        }
        MoveWindowToWorkspace { window, workspace } => EventResponse::state(
            workspaces::move_window_to_workspace(state, &window, &workspace)?,
        ),
    };
    Ok(response)
}

/// Opens a window in the active workspace.
///
/// The window gets an id unused by any existing window, is inserted into the
/// active workspace's tree per the current [`LayoutConfig`] and appended to
/// its window list.
pub fn add_window<P: Clone>(
    state: &AppState<P>,
    spec: WindowSpec<P>,
) -> Result<(AppState<P>, WindowId), LayoutError> {
    let workspace = active_workspace(state)?;
    state.layout_config.validate()?;

    let id = state.windows.fresh_id();
    let placed = place_window(workspace, id.clone(), &state.layout_config);

    debug!(
        window = %id,
        app_id = %spec.app_id,
        workspace = workspace.number,
        mode = %state.layout_config.insertion_mode,
        "opening window"
    );

    let mut next = state.clone();
    next.windows.insert(WindowInstance::from_spec(id.clone(), spec));
    next.workspaces.insert(placed.id.clone(), placed);
    Ok((next, id))
}

/// Closes a window wherever it lives. Closing a window that is already gone
/// returns an equal state.
pub fn remove_window<P: Clone>(state: &AppState<P>, window_id: &WindowId) -> AppState<P> {
    let owner = state.workspace_of_window(window_id).cloned();
    if owner.is_none() && !state.windows.contains(window_id) {
        trace!(window = %window_id, "window already closed");
        return state.clone();
    }

    let mut next = state.clone();
    next.windows.remove(window_id);
    let Some(owner) = owner else {
        return next;
    };
    if let Some(workspace) = next.workspaces.get_mut(&owner) {
        detach_window(workspace, window_id);
        debug!(
            window = %window_id,
            workspace = workspace.number,
            remaining = workspace.window_count(),
            "closed window"
        );
    }
    next
}

pub(crate) fn active_workspace<P>(state: &AppState<P>) -> Result<&Workspace, LayoutError> {
    state.active_workspace().ok_or_else(|| {
        warn!(
            workspace = %state.active_workspace_id,
            "active workspace no longer exists"
        );
        LayoutError::WorkspaceNotFound(state.active_workspace_id.clone())
    })
}

/// Copy of `workspace` with `id` inserted into its tree and appended to its
/// window list.
pub(crate) fn place_window(
    workspace: &Workspace,
    id: WindowId,
    config: &LayoutConfig,
) -> Workspace {
    let layout = insert_leaf(workspace.layout.as_ref(), id.clone(), config);
    let mut window_ids = workspace.window_ids.clone();
    window_ids.push(id);
    Workspace {
        layout: Some(layout),
        window_ids,
        ..workspace.clone()
    }
}

pub(crate) fn detach_window(workspace: &mut Workspace, id: &WindowId) {
    workspace.layout = workspace.layout.take().and_then(|tree| remove_leaf(&tree, id));
    workspace.window_ids.retain(|w| w != id);
}
