pub mod registry;
pub mod state;
pub mod window;
pub mod workspace;

pub use registry::WindowRegistry;
pub use state::AppState;
pub use window::{WindowId, WindowInstance, WindowSpec};
pub use workspace::{Workspace, WorkspaceId, find_lowest_available_number};
