pub mod bom;
pub mod connectivity;
pub mod definitions;
pub mod designator;
pub mod error;
pub mod ids;
pub mod instance;
pub mod netlist;
pub mod placement;
pub mod project;
pub mod schematic;
pub mod snap;
pub mod types;

pub use connectivity::{ConnectivityManager, Net, NetMember, NodeType};
pub use error::{AnnotateError, PlacementError};
pub use project::Project;
pub use types::NodeId;

use std::path::Path;

/// World-space distance within which a click snaps onto an existing node.
pub const DEFAULT_SNAP_DISTANCE: f64 = 8.0;

#[derive(Debug, Clone, PartialEq)]
pub struct EditorOptions {
    pub snap_distance: f64,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            snap_distance: DEFAULT_SNAP_DISTANCE,
        }
    }
}

/// Load a project file and build its connectivity.
pub fn load_project(
    path: &Path,
    opts: &EditorOptions,
) -> Result<(Project, ConnectivityManager), AnnotateError> {
    let mut project = Project::load(path)?;
    project.options = opts.clone();
    let manager = project.connectivity();
    log::debug!("{}: {} nets", path.display(), manager.stats().nets);
    Ok((project, manager))
}
