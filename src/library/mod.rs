mod links;
mod manager;
mod paths;
mod restore;

pub use manager::MovieLibrary;
pub use paths::LibraryPaths;
pub use restore::{relink_library, restore_catalog, RelinkSummary, RestoreSummary};
