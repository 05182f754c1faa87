mod models;
mod schema;
mod store;

pub use models::*;
pub use store::SqliteCatalog;
