//! Connection and schema bootstrap

use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Schema};
use std::time::Duration;
use tracing::{debug, info};

use crate::entities::{Profiles, Users};
use crate::error::StorageResult;

/// Open a connection pool
pub async fn connect(url: &str, max_connections: u32) -> StorageResult<DatabaseConnection> {
    info!("Connecting to database: {}", redact(url));

    let mut opts = ConnectOptions::new(url);
    opts.max_connections(max_connections)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(300))
        .sqlx_logging(false);

    let connection = Database::connect(opts).await?;
    debug!(max_connections, "Database connection established");
    Ok(connection)
}

/// Create the `users` and `profiles` tables if missing
pub async fn create_schema(db: &DatabaseConnection) -> StorageResult<()> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let statements = [
        schema.create_table_from_entity(Users).if_not_exists().to_owned(),
        schema.create_table_from_entity(Profiles).if_not_exists().to_owned(),
    ];
    for statement in &statements {
        db.execute(backend.build(statement)).await?;
    }

    debug!("Schema ready");
    Ok(())
}

/// Strip credentials from a connection URL for logging
fn redact(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://***{}", &url[..scheme_end], &url[at..])
        }
        _ => url.to_string(),
    }
}
