//! taskdeck - personal task tracker with CSV import/export

use clap::Parser;
use taskdeck_cli::{logging, run, Cli};
use taskdeck_core::{Result, TaskStore, TaskdeckConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let mut config = TaskdeckConfig::from_env()?;
    if let Some(database) = &cli.database {
        config.database_path.clone_from(database);
    }
    if let Some(owner) = cli.owner {
        config.default_owner = owner;
    }

    config.ensure_parent_dir()?;
    let store = TaskStore::new(&config.database_path).await?;

    run(
        cli.command,
        &store,
        config.default_owner,
        &mut std::io::stdout(),
    )
    .await
}
