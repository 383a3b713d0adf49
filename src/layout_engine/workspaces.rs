use tracing::{debug, trace};

use super::engine::{detach_window, place_window};
use super::error::LayoutError;
use super::insertion::LayoutConfig;
use super::mosaic::MosaicNode;
use crate::common::collections::HashSet;
use crate::model::workspace::{next_by_number, prev_by_number};
use crate::model::{AppState, WindowId, Workspace, WorkspaceId};

/// Adds an empty workspace with the lowest free number and makes it active.
pub fn create_workspace<P: Clone>(
    state: &AppState<P>,
    label: Option<String>,
) -> (AppState<P>, WorkspaceId) {
    let id = state.fresh_workspace_id();
    let number = state.next_workspace_number();
    debug!(workspace = %id, number, ?label, "creating workspace");

    let mut next = state.clone();
    next.workspaces.insert(id.clone(), Workspace::new(id.clone(), number, label));
    next.active_workspace_id = id.clone();
    (next, id)
}

/// Drops a workspace together with every window placed in it. Its number
/// becomes free for the next workspace created.
///
/// When the active workspace goes away the remaining workspace with the
/// lowest number takes over.
pub fn delete_workspace<P: Clone>(
    state: &AppState<P>,
    id: &WorkspaceId,
) -> Result<AppState<P>, LayoutError> {
    let workspace = workspace(state, id)?;
    if state.workspaces.len() == 1 {
        return Err(LayoutError::LastWorkspace);
    }

    let mut next = state.clone();
    for window_id in &workspace.window_ids {
        next.windows.remove(window_id);
    }
    next.workspaces.remove(id);

    if next.active_workspace_id == *id {
        if let Some(fallback) = next.workspaces_by_number().first().map(|ws| ws.id.clone()) {
            next.active_workspace_id = fallback;
        }
    }
    debug!(
        workspace = %id,
        number = workspace.number,
        windows = workspace.window_count(),
        active = %next.active_workspace_id,
        "deleted workspace"
    );
    Ok(next)
}

pub fn set_active_workspace<P: Clone>(
    state: &AppState<P>,
    id: &WorkspaceId,
) -> Result<AppState<P>, LayoutError> {
    workspace(state, id)?;
    let mut next = state.clone();
    next.active_workspace_id = id.clone();
    trace!(workspace = %id, "activated workspace");
    Ok(next)
}

/// Activates the workspace numbered after the active one, wrapping around.
pub fn next_workspace<P: Clone>(state: &AppState<P>) -> Result<AppState<P>, LayoutError> {
    let target = next_by_number(state.workspaces.values(), &state.active_workspace_id)
        .ok_or_else(|| LayoutError::WorkspaceNotFound(state.active_workspace_id.clone()))?;
    set_active_workspace(state, &target)
}

pub fn prev_workspace<P: Clone>(state: &AppState<P>) -> Result<AppState<P>, LayoutError> {
    let target = prev_by_number(state.workspaces.values(), &state.active_workspace_id)
        .ok_or_else(|| LayoutError::WorkspaceNotFound(state.active_workspace_id.clone()))?;
    set_active_workspace(state, &target)
}

pub fn rename_workspace<P: Clone>(
    state: &AppState<P>,
    id: &WorkspaceId,
    label: Option<String>,
) -> Result<AppState<P>, LayoutError> {
    workspace(state, id)?;
    let mut next = state.clone();
    if let Some(workspace) = next.workspaces.get_mut(id) {
        workspace.label = label;
    }
    Ok(next)
}

pub fn set_layout_config<P: Clone>(
    state: &AppState<P>,
    config: LayoutConfig,
) -> Result<AppState<P>, LayoutError> {
    config.validate()?;
    debug!(?config, "layout config changed");
    Ok(state.clone().with_layout_config(config))
}

/// Replaces a workspace's tree wholesale, as a drag or resize gesture does.
///
/// The new tree must hold exactly the workspace's windows, each once, and
/// every split must lie strictly between 0 and 100.
pub fn set_layout<P: Clone>(
    state: &AppState<P>,
    id: &WorkspaceId,
    layout: Option<MosaicNode>,
) -> Result<AppState<P>, LayoutError> {
    let workspace = workspace(state, id)?;
    check_layout_matches(workspace, layout.as_ref())?;
    if let Some(split) = layout.as_ref().and_then(MosaicNode::invalid_split) {
        return Err(LayoutError::InvalidLayoutConfig(format!(
            "split_percentage must be strictly between 0 and 100, got {split}"
        )));
    }

    let mut next = state.clone();
    if let Some(workspace) = next.workspaces.get_mut(id) {
        workspace.layout = layout;
    }
    Ok(next)
}

fn check_layout_matches(workspace: &Workspace, layout: Option<&MosaicNode>) -> Result<(), LayoutError> {
    let leaves = layout.map(|tree| tree.leaves()).unwrap_or_default();

    let mut seen = HashSet::default();
    for leaf in &leaves {
        if !seen.insert(*leaf) {
            return Err(LayoutError::LayoutMismatch(format!("window {leaf} appears twice")));
        }
        if !workspace.contains_window(leaf) {
            return Err(LayoutError::LayoutMismatch(format!(
                "window {leaf} does not belong to workspace {}",
                workspace.id
            )));
        }
    }
    if let Some(missing) = workspace.window_ids.iter().find(|id| !seen.contains(id)) {
        return Err(LayoutError::LayoutMismatch(format!("window {missing} is missing")));
    }
    Ok(())
}

/// Moves a window into `target`, inserting it there with the current
/// [`LayoutConfig`]. The window instance itself is kept as is.
pub fn move_window_to_workspace<P: Clone>(
    state: &AppState<P>,
    window_id: &WindowId,
    target: &WorkspaceId,
) -> Result<AppState<P>, LayoutError> {
    let target_workspace = workspace(state, target)?;
    let Some(source) = state.workspace_of_window(window_id) else {
        trace!(window = %window_id, "move of unknown window ignored");
        return Ok(state.clone());
    };
    if source == target {
        return Ok(state.clone());
    }
    state.layout_config.validate()?;

    let placed = place_window(target_workspace, window_id.clone(), &state.layout_config);
    let mut next = state.clone();
    if let Some(source) = next.workspaces.get_mut(source) {
        detach_window(source, window_id);
    }
    next.workspaces.insert(target.clone(), placed);
    debug!(window = %window_id, from = %source, to = %target, "moved window");
    Ok(next)
}

fn workspace<'a, P>(state: &'a AppState<P>, id: &WorkspaceId) -> Result<&'a Workspace, LayoutError> {
    state
        .workspace(id)
        .ok_or_else(|| LayoutError::WorkspaceNotFound(id.clone()))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::layout_engine::engine::add_window;
    use crate::layout_engine::{Direction, InsertionMode, InsertionPosition};
    use crate::model::WindowSpec;

    fn spec() -> WindowSpec { WindowSpec::new("feed", json!({ "relay": "wss://example" })) }

    fn numbers(state: &AppState) -> Vec<u32> {
        state.workspaces_by_number().iter().map(|ws| ws.number).collect()
    }

    #[test]
    fn created_workspaces_fill_gaps() {
        let state: AppState = AppState::new();
        let (state, second) = create_workspace(&state, None);
        let (state, _third) = create_workspace(&state, Some("Third".into()));
        assert_eq!(numbers(&state), vec![1, 2, 3]);

        let state = delete_workspace(&state, &second).unwrap();
        assert_eq!(numbers(&state), vec![1, 3]);

        let (state, refill) = create_workspace(&state, None);
        assert_eq!(state.workspace(&refill).unwrap().number, 2);
        assert_eq!(state.active_workspace_id, refill);
    }

    #[test]
    fn delete_drops_windows_and_moves_focus() {
        let state: AppState = AppState::new();
        let first = state.active_workspace_id.clone();
        let (state, second) = create_workspace(&state, None);
        let (state, doomed) = add_window(&state, spec()).unwrap();

        let state = delete_workspace(&state, &second).unwrap();
        assert!(!state.windows.contains(&doomed));
        assert_eq!(state.active_workspace_id, first);
        assert!(state.validate().is_empty());
    }

    #[test]
    fn delete_refuses_last_and_unknown() {
        let state: AppState = AppState::new();
        let only = state.active_workspace_id.clone();
        assert!(matches!(delete_workspace(&state, &only), Err(LayoutError::LastWorkspace)));
        assert!(matches!(
            delete_workspace(&state, &WorkspaceId::new("nope")),
            Err(LayoutError::WorkspaceNotFound(_))
        ));
    }

    #[test]
    fn stale_switch_is_rejected() {
        let state: AppState = AppState::new();
        let (state, second) = create_workspace(&state, None);
        let state = delete_workspace(&state, &second).unwrap();
        assert!(matches!(
            set_active_workspace(&state, &second),
            Err(LayoutError::WorkspaceNotFound(id)) if id == second
        ));
    }

    #[test]
    fn next_and_prev_cycle_by_number() {
        let state: AppState = AppState::new();
        let first = state.active_workspace_id.clone();
        let (state, second) = create_workspace(&state, None);
        let (state, third) = create_workspace(&state, None);
        let state = set_active_workspace(&state, &first).unwrap();

        let state = next_workspace(&state).unwrap();
        assert_eq!(state.active_workspace_id, second);
        let state = next_workspace(&state).unwrap();
        assert_eq!(state.active_workspace_id, third);
        let state = next_workspace(&state).unwrap();
        assert_eq!(state.active_workspace_id, first);
        let state = prev_workspace(&state).unwrap();
        assert_eq!(state.active_workspace_id, third);
    }

    #[test]
    fn rename_sets_and_clears_label() {
        let state: AppState = AppState::new();
        let id = state.active_workspace_id.clone();
        let state = rename_workspace(&state, &id, Some("Notes".into())).unwrap();
        assert_eq!(state.workspace(&id).unwrap().label.as_deref(), Some("Notes"));
        let state = rename_workspace(&state, &id, None).unwrap();
        assert_eq!(state.workspace(&id).unwrap().label, None);
    }

    #[test]
    fn layout_config_is_validated() {
        let state: AppState = AppState::new();
        let config = LayoutConfig::new(InsertionMode::Column, 120.0, InsertionPosition::First);
        assert!(matches!(
            set_layout_config(&state, config),
            Err(LayoutError::InvalidLayoutConfig(_))
        ));

        let config = LayoutConfig::new(InsertionMode::Column, 35.0, InsertionPosition::First);
        let state = set_layout_config(&state, config).unwrap();
        assert_eq!(state.layout_config, config);
    }

    #[test]
    fn set_layout_accepts_rearranged_tree() {
        let state: AppState = AppState::new();
        let (state, a) = add_window(&state, spec()).unwrap();
        let (state, b) = add_window(&state, spec()).unwrap();
        let id = state.active_workspace_id.clone();

        let swapped = MosaicNode::branch(
            Direction::Column,
            MosaicNode::Leaf(b.clone()),
            MosaicNode::Leaf(a.clone()),
            70.0,
        );
        let state = set_layout(&state, &id, Some(swapped.clone())).unwrap();
        assert_eq!(state.workspace(&id).unwrap().layout, Some(swapped));
        assert_eq!(state.workspace(&id).unwrap().window_ids, vec![a, b]);
    }

    #[test]
    fn set_layout_rejects_mismatched_trees() {
        let state: AppState = AppState::new();
        let (state, a) = add_window(&state, spec()).unwrap();
        let (state, b) = add_window(&state, spec()).unwrap();
        let id = state.active_workspace_id.clone();

        let missing = Some(MosaicNode::Leaf(a.clone()));
        let doubled = Some(MosaicNode::branch(
            Direction::Row,
            MosaicNode::Leaf(a.clone()),
            MosaicNode::Leaf(a.clone()),
            50.0,
        ));
        let foreign = Some(MosaicNode::branch(
            Direction::Row,
            MosaicNode::Leaf(b),
            MosaicNode::leaf("stranger"),
            50.0,
        ));
        for layout in [None, missing, doubled, foreign] {
            assert!(matches!(
                set_layout(&state, &id, layout),
                Err(LayoutError::LayoutMismatch(_))
            ));
        }
    }

    #[test]
    fn set_layout_rejects_out_of_range_splits() {
        let state: AppState = AppState::new();
        let (state, a) = add_window(&state, spec()).unwrap();
        let (state, b) = add_window(&state, spec()).unwrap();
        let id = state.active_workspace_id.clone();

        for split in [0.0, 100.0, 150.0, -3.0, f64::NAN] {
            let tree = MosaicNode::branch(
                Direction::Row,
                MosaicNode::Leaf(a.clone()),
                MosaicNode::Leaf(b.clone()),
                split,
            );
            assert!(
                matches!(set_layout(&state, &id, Some(tree)), Err(LayoutError::InvalidLayoutConfig(_))),
                "split {split} accepted"
            );
        }
    }

    #[test]
    fn move_window_between_workspaces() {
        let state: AppState = AppState::new();
        let source = state.active_workspace_id.clone();
        let (state, a) = add_window(&state, spec()).unwrap();
        let (state, b) = add_window(&state, spec()).unwrap();
        let (state, target) = create_workspace(&state, None);

        let state = move_window_to_workspace(&state, &a, &target).unwrap();
        assert_eq!(state.workspace(&source).unwrap().layout, Some(MosaicNode::Leaf(b)));
        assert_eq!(state.workspace(&target).unwrap().layout, Some(MosaicNode::Leaf(a.clone())));
        assert!(state.windows.contains(&a));
        assert!(state.validate().is_empty());

        let again = move_window_to_workspace(&state, &a, &target).unwrap();
        assert_eq!(again, state);
        let unknown = move_window_to_workspace(&state, &WindowId::new("ghost"), &target).unwrap();
        assert_eq!(unknown, state);
        assert!(matches!(
            move_window_to_workspace(&state, &a, &WorkspaceId::new("nowhere")),
            Err(LayoutError::WorkspaceNotFound(_))
        ));
    }
}
