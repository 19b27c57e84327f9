use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::time::Duration;
use thiserror::Error;

use crate::setting::Settings;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Error while connecting to the database: {0}")]
    Database(#[from] DbErr),
}

pub async fn open_database(settings: &Settings) -> Result<DatabaseConnection, DatabaseError> {
    let url = &settings.db;
    tracing::trace! {%url, "Connecting to database"};
    let mut opt = ConnectOptions::new(url.to_owned());
    opt.max_connections(100)
        .min_connections(5)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(8))
        .max_lifetime(Duration::from_secs(8))
        .sqlx_logging(true);
    Database::connect(opt)
        .await
        .map_err(DatabaseError::Database)
}
