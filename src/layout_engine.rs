pub mod engine;
mod error;
pub(crate) mod graph;
pub mod insertion;
pub mod mosaic;
mod workspaces;

pub use engine::{EventResponse, LayoutCommand, add_window, apply, remove_window};
pub use error::LayoutError;
pub use graph::Direction;
pub use insertion::{DEFAULT_SPLIT_PERCENTAGE, InsertionMode, InsertionPosition, LayoutConfig};
pub use mosaic::{MosaicBranch, MosaicNode, ShallowestLeaf, find_shallowest_leaf, insert_leaf, remove_leaf};
pub use workspaces::{
    create_workspace, delete_workspace, move_window_to_workspace, next_workspace, prev_workspace,
    rename_workspace, set_active_workspace, set_layout, set_layout_config,
};
