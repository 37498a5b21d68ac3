use clap::Subcommand;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::database::DatabaseManager;

#[derive(Subcommand)]
pub enum DbCommands {
    #[command(about = "Apply pending migrations")]
    Migrate,

    #[command(about = "Check database connectivity")]
    Health,
}

pub async fn handle(cmd: DbCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let result = match cmd {
        DbCommands::Migrate => DatabaseManager::migrate()
            .await
            .map(|_| "Migrations applied"),
        DbCommands::Health => DatabaseManager::health_check()
            .await
            .map(|_| "Database is reachable"),
    };

    DatabaseManager::close().await;
    output_success(&output_format, result?, None)
}
