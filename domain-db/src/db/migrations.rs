use diesel::pg::PgConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("./migrations");

#[derive(thiserror::Error, Debug)]
#[error("Migration error: {0}")]
pub struct MigrationError(String);

pub fn any_pending_migrations(conn: &mut PgConnection) -> Result<bool, MigrationError> {
    conn.has_pending_migration(MIGRATIONS)
        .map_err(|e| MigrationError(e.to_string()))
}

pub fn run_pending_migrations(conn: &mut PgConnection) -> Result<(), MigrationError> {
    conn.run_pending_migrations(MIGRATIONS)
        .map(|_| ())
        .map_err(|e| MigrationError(e.to_string()))
}
