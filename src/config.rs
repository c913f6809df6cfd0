use anyhow::Result;
use encoding_rs::Encoding;
use std::path::PathBuf;

use crate::cli::PathArgs;
use crate::extract::encoding_for_label;

/// Resolved runtime settings shared by every command
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub csv_path: PathBuf,
    pub encoding: &'static Encoding,
}

impl Config {
    pub fn from_args(args: &PathArgs) -> Result<Self> {
        Ok(Self {
            db_path: args.db.clone(),
            csv_path: args.csv.clone(),
            encoding: encoding_for_label(&args.encoding)?,
        })
    }
}
