use clap::Parser;
use ledger::{LedgerStore, Session, User};

use crate::{client::HttpGateway, error::Result, settings::Cli};

mod client;
mod commands;
mod error;
mod render;
mod settings;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = settings::load(&cli)?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "cost_tracker={level},ledger={level}",
            level = settings.level
        ))
        .with_writer(std::io::stderr)
        .init();

    let gateway = HttpGateway::new(&settings.base_url, settings.token.clone())?;
    let mut session = Session::new(LedgerStore::builder(gateway).build());

    if let Err(err) = session
        .on_user_changed(Some(User::new(settings.user_id.clone())))
        .await
    {
        tracing::error!("failed to load the ledger: {err}");
        if cli.command.reads_ledger() {
            return Err(err.into());
        }
    }

    let mut stdout = std::io::stdout().lock();
    commands::run(&mut session, cli.command, &mut stdout).await
}
