use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "obras-urbanas")]
#[command(version, about = "Load the urban public works dataset into SQLite and manage projects")]
pub struct Cli {
    #[command(flatten)]
    pub paths: PathArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Clone)]
pub struct PathArgs {
    /// SQLite database path
    #[arg(long, global = true, env = "OBRAS_DB", default_value = "obras_urbanas.db")]
    pub db: PathBuf,

    /// Source CSV (`;` delimited, `,` decimals)
    #[arg(
        long,
        global = true,
        env = "OBRAS_CSV",
        default_value = "observatorio-de-obras-urbanas.csv"
    )]
    pub csv: PathBuf,

    /// Text encoding of the source CSV
    #[arg(long, global = true, env = "OBRAS_ENCODING", default_value = "latin1")]
    pub encoding: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the database tables if they do not exist
    Init,

    /// Clean the CSV and load it into the database
    Load,

    /// Create and advance projects interactively, then print the indicators
    Manage,

    /// Print the indicators
    Report {
        /// Print as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Init, load and manage in one go
    Run,
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
