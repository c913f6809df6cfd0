pub mod clean;
pub mod cli;
pub mod config;
pub mod extract;
pub mod lifecycle;
pub mod load;
pub mod pipeline;
pub mod report;
pub mod schema;
pub mod store;
pub mod table;

pub use cli::{Cli, Commands};
pub use config::Config;
