mod api;
mod format;
#[cfg(test)]
mod test_utils;

use clap::{Parser, Subcommand};
use eyre::{eyre, Result, WrapErr};
use sea_orm_migration::MigratorTrait;
use std::net::SocketAddr;
use std::path::PathBuf;

use base::database::open_database;
use base::setting::{generate_default, load};
use base::CLI_NAME;

#[derive(Parser)]
#[command(name = CLI_NAME, author, version, about, long_about = None)]
#[command(next_line_help = true)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Overrides the listen address from the settings
    #[arg(short, long, name = "ADDRESS")]
    listen_address: Option<String>,

    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    DefaultConfig,
    Serve,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    match cli.command.unwrap_or(Command::Serve) {
        Command::DefaultConfig => {
            let default = generate_default()?;
            let str = toml::to_string(&default)?;
            println!("{}", str);
            Ok(())
        }
        Command::Serve => {
            let settings = load(cli.config)?;
            base::logging::init(&settings)?;

            let db = open_database(&settings).await?;
            migration::Migrator::up(&db, None).await?;

            let addr: SocketAddr = cli
                .listen_address
                .unwrap_or_else(|| settings.listen_address.clone())
                .parse()
                .wrap_err(eyre!("Invalid listen address"))?;
            tracing::info! {%addr, "Listening"};
            let router = api::router(db);
            axum::Server::bind(&addr)
                .serve(router.into_make_service())
                .await?;
            Ok(())
        }
    }
}
