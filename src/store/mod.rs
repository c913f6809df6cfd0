pub mod project;
pub mod schema_gen;
pub mod sqlite;

pub use project::*;
pub use sqlite::*;
