use anyhow::{Context, Result};
use diesel::pg::{Pg, PgConnection};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};

pub mod migrations;
pub mod models;
pub mod schema;

#[derive(thiserror::Error, Debug)]
#[error("Database error.")]
pub struct DatabaseError {
    #[from]
    source: diesel::r2d2::PoolError,
}

pub type PgPooledConnection = PooledConnection<ConnectionManager<PgConnection>>;

pub struct PostgresRepository {
    pool: Pool<ConnectionManager<PgConnection>>,
}

impl PostgresRepository {
    pub fn new(database_url: &str) -> Result<Self, DatabaseError> {
        let manager = ConnectionManager::<PgConnection>::new(database_url);
        let pool = Pool::new(manager)?;
        Ok(Self { pool })
    }

    /// Checks out the connection used for one sync run. A run holds exactly
    /// one connection; dropping it returns it to the pool on every exit path.
    pub fn connection(&self) -> Result<PgPooledConnection, DatabaseError> {
        Ok(self.pool.get()?)
    }

    pub fn any_pending_migrations(&self) -> Result<bool> {
        let mut conn = self.pool.get()?;
        migrations::any_pending_migrations(&mut conn).context("failed checking pending migrations")
    }

    pub fn run_pending_migrations(&self) -> Result<()> {
        let mut conn = self.pool.get()?;
        migrations::run_pending_migrations(&mut conn).context("failed running pending migrations")
    }
}

// One upsert function per table, each keyed on the table's declared natural
// key. A batch is applied row by row inside a single transaction: either the
// whole batch commits or it rolls back, and the error names the offending row
// and the generated statement. An empty batch is a no-op.

pub fn upsert_cves(conn: &mut PgConnection, rows: &[models::NewCve]) -> Result<usize> {
    use schema::cves::dsl::*;

    if rows.is_empty() {
        return Ok(0);
    }

    conn.transaction(|conn| {
        for row in rows {
            let statement = diesel::insert_into(cves)
                .values(row)
                .on_conflict(id)
                .do_update()
                .set(row);
            let sql = diesel::debug_query::<Pg, _>(&statement).to_string();
            statement
                .execute(conn)
                .with_context(|| format!("error upserting {row:?} into cves [{sql}]"))?;
        }
        Ok(rows.len())
    })
}

pub fn upsert_descriptions(
    conn: &mut PgConnection,
    rows: &[models::NewCveDescription],
) -> Result<usize> {
    use schema::cve_description::dsl::*;

    if rows.is_empty() {
        return Ok(0);
    }

    conn.transaction(|conn| {
        for row in rows {
            let statement = diesel::insert_into(cve_description)
                .values(row)
                .on_conflict((cve_id, lang))
                .do_update()
                .set(row);
            let sql = diesel::debug_query::<Pg, _>(&statement).to_string();
            statement
                .execute(conn)
                .with_context(|| format!("error upserting {row:?} into cve_description [{sql}]"))?;
        }
        Ok(rows.len())
    })
}

pub fn upsert_impacts(conn: &mut PgConnection, rows: &[models::NewCveImpact]) -> Result<usize> {
    use schema::cve_impact::dsl::*;

    if rows.is_empty() {
        return Ok(0);
    }

    conn.transaction(|conn| {
        for row in rows {
            let statement = diesel::insert_into(cve_impact)
                .values(row)
                .on_conflict((cve_id, version))
                .do_update()
                .set(row);
            let sql = diesel::debug_query::<Pg, _>(&statement).to_string();
            statement
                .execute(conn)
                .with_context(|| format!("error upserting {row:?} into cve_impact [{sql}]"))?;
        }
        Ok(rows.len())
    })
}

pub fn upsert_cpe_matches(conn: &mut PgConnection, rows: &[models::NewCveCpe]) -> Result<usize> {
    use schema::cve_cpe::dsl::*;

    if rows.is_empty() {
        return Ok(0);
    }

    conn.transaction(|conn| {
        for row in rows {
            let statement = diesel::insert_into(cve_cpe)
                .values(row)
                .on_conflict((cve_id, match_criteria_id))
                .do_update()
                .set(row);
            let sql = diesel::debug_query::<Pg, _>(&statement).to_string();
            statement
                .execute(conn)
                .with_context(|| format!("error upserting {row:?} into cve_cpe [{sql}]"))?;
        }
        Ok(rows.len())
    })
}

pub fn upsert_references(
    conn: &mut PgConnection,
    rows: &[models::NewCveReference],
) -> Result<usize> {
    use schema::cve_references::dsl::*;

    if rows.is_empty() {
        return Ok(0);
    }

    conn.transaction(|conn| {
        for row in rows {
            let statement = diesel::insert_into(cve_references)
                .values(row)
                .on_conflict((cve_id, url))
                .do_update()
                .set(row);
            let sql = diesel::debug_query::<Pg, _>(&statement).to_string();
            statement
                .execute(conn)
                .with_context(|| format!("error upserting {row:?} into cve_references [{sql}]"))?;
        }
        Ok(rows.len())
    })
}
