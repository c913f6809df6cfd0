//! Top-level operations; each opens its own connection and closes it when done

use anyhow::{Context, Result};
use std::io::Write;

use crate::clean::{clean, CleanSummary};
use crate::config::Config;
use crate::extract::read_source;
use crate::lifecycle::{manage, Prompter};
use crate::load::{load, LoadSummary};
use crate::report::Indicators;
use crate::store::Store;

/// Create the schema
pub fn init_database(config: &Config) -> Result<()> {
    let store = Store::open(&config.db_path)?;
    store.init_schema()?;
    store.close()
}

/// Extract, clean and load the source CSV.
/// `Ok(None)` means the source file does not exist.
pub fn clean_and_load(config: &Config) -> Result<Option<(CleanSummary, LoadSummary)>> {
    let Some(raw) = read_source(&config.csv_path, config.encoding)? else {
        return Ok(None);
    };
    let (cleaned, clean_summary) = clean(raw).context("Failed to clean source data")?;

    let store = Store::open(&config.db_path)?;
    store.init_schema()?;
    let load_summary = load(&store, &cleaned)?;
    store.close()?;

    Ok(Some((clean_summary, load_summary)))
}

/// Run the interactive workflow loop; returns how many projects were created
pub fn manage_projects(config: &Config, prompter: &mut impl Prompter) -> Result<usize> {
    let store = Store::open(&config.db_path)?;
    let created = manage(&store, prompter)?;
    store.close()?;
    Ok(created)
}

pub fn print_report(config: &Config, out: &mut impl Write, json: bool) -> Result<Indicators> {
    let store = Store::open(&config.db_path)?;
    let indicators = Indicators::collect(&store)?;
    store.close()?;

    if json {
        serde_json::to_writer_pretty(&mut *out, &indicators)
            .context("Failed to write indicators as JSON")?;
        writeln!(out)?;
    } else {
        writeln!(out, "\nAquí están los datos solicitados:")?;
        indicators.render(out).context("Failed to write indicators")?;
    }

    Ok(indicators)
}
