use anyhow::{bail, Result};
use obras_urbanas::{
    cli::{Cli, Commands},
    config::Config,
    lifecycle::ConsolePrompter,
    pipeline::{clean_and_load, init_database, manage_projects, print_report},
};
use std::io;
use std::time::Instant;

fn load(config: &Config) -> Result<()> {
    let start = Instant::now();

    println!("Cleaning and loading {:?}...", config.csv_path);
    let Some((cleaned, loaded)) = clean_and_load(config)? else {
        bail!("Source dataset {:?} not found", config.csv_path);
    };

    let elapsed = start.elapsed();
    println!(
        "\nLoaded {} of {} projects ({} rows kept, {} rejected, {} unresolved) into {:?} in {:.1}s",
        loaded.projects_inserted,
        cleaned.rows_in,
        cleaned.rows_out,
        loaded.project_conflicts,
        loaded.unresolved,
        config.db_path,
        elapsed.as_secs_f64()
    );
    Ok(())
}

fn manage(config: &Config) -> Result<()> {
    let mut prompter = ConsolePrompter::stdio();
    let created = manage_projects(config, &mut prompter)?;
    log::info!("{} projects created this session", created);
    print_report(config, &mut io::stdout(), false)?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse_args();
    let config = Config::from_args(&cli.paths)?;

    match cli.command {
        Commands::Init => {
            init_database(&config)?;
            println!("Tables ready in {:?}", config.db_path);
        }

        Commands::Load => load(&config)?,

        Commands::Manage => manage(&config)?,

        Commands::Report { json } => {
            print_report(&config, &mut io::stdout(), json)?;
        }

        Commands::Run => {
            init_database(&config)?;
            load(&config)?;
            manage(&config)?;
        }
    }

    Ok(())
}
