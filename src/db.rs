use sqlx::{postgres::PgPoolOptions, PgPool};

/// Statements creating the worker collection. Safe to run on every start.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS workers (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        phone TEXT NOT NULL,
        email TEXT NOT NULL,
        role TEXT NOT NULL,
        experience INTEGER NOT NULL CHECK (experience >= 0),
        location JSONB NOT NULL DEFAULT '{}'::jsonb,
        languages JSONB NOT NULL DEFAULT '[]'::jsonb,
        skills JSONB NOT NULL DEFAULT '[]'::jsonb,
        salary JSONB NOT NULL,
        availability TEXT,
        documents JSONB NOT NULL DEFAULT '{}'::jsonb,
        rating DOUBLE PRECISION NOT NULL DEFAULT 0,
        verified BOOLEAN NOT NULL DEFAULT FALSE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    "CREATE UNIQUE INDEX IF NOT EXISTS workers_email_key ON workers (email)",
    "CREATE INDEX IF NOT EXISTS workers_role_idx ON workers (role)",
];

pub struct Database {
    pub pool: PgPool,
}

impl Database {
    pub async fn new(database_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        sqlx::query("SELECT 1").execute(&pool).await?;

        Ok(Self { pool })
    }

    /// Creates the `workers` table and its indexes if they are missing.
    pub async fn migrate(&self) -> anyhow::Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        tracing::info!("Worker schema is up to date");
        Ok(())
    }
}
