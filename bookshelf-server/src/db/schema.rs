//! Schema provisioning for the catalog tables
//!
//! Every statement is `IF NOT EXISTS`, so this runs on every startup. Several
//! instances may start at once and race on the same DDL; the loser gets an
//! error that is logged and ignored. A request against a table that really
//! is missing fails on its own query later.

use sqlx::PgPool;

const BOOKS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS books (
        id VARCHAR(36) PRIMARY KEY DEFAULT gen_random_uuid(),
        title VARCHAR(255) NOT NULL,
        author VARCHAR(255) NOT NULL,
        description TEXT,
        cover_url TEXT,
        year VARCHAR(4),
        created_at TIMESTAMP DEFAULT NOW(),
        updated_at TIMESTAMP DEFAULT NOW()
    )
"#;

const CHAPTERS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS chapters (
        id VARCHAR(36) PRIMARY KEY DEFAULT gen_random_uuid(),
        book_id VARCHAR(36) NOT NULL REFERENCES books(id) ON DELETE CASCADE,
        title VARCHAR(255) NOT NULL,
        summary TEXT,
        audio_url TEXT,
        order_num INTEGER DEFAULT 0,
        created_at TIMESTAMP DEFAULT NOW()
    )
"#;

const INDEXES: [&str; 2] = [
    "CREATE INDEX IF NOT EXISTS idx_books_author ON books(author)",
    "CREATE INDEX IF NOT EXISTS idx_chapters_book_id ON chapters(book_id)",
];

/// Provisioning step names, in execution order.
pub const STEPS: [&str; 3] = ["books table", "chapters table", "indexes"];

/// Outcome of one [`ensure_schema`] run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaReport {
    pub applied: Vec<&'static str>,
    /// Failed steps with the database error text.
    pub failed: Vec<(&'static str, String)>,
}

impl SchemaReport {
    /// True when every step succeeded.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    fn record(&mut self, step: &'static str, result: Result<(), sqlx::Error>) {
        match result {
            Ok(()) => self.applied.push(step),
            Err(e) => {
                tracing::warn!(step, error = %e, "Could not provision schema step");
                self.failed.push((step, e.to_string()));
            }
        }
    }
}

/// Ensure the `books` and `chapters` tables and their indexes exist.
///
/// Idempotent. Each step is attempted even if an earlier one failed, and
/// failures are reported rather than returned.
pub async fn ensure_schema(pool: &PgPool) -> SchemaReport {
    tracing::info!("Provisioning database schema...");
    let mut report = SchemaReport::default();

    report.record(STEPS[0], execute(pool, BOOKS_TABLE).await);
    report.record(STEPS[1], execute(pool, CHAPTERS_TABLE).await);
    report.record(STEPS[2], create_indexes(pool).await);

    if report.is_complete() {
        tracing::info!("Database schema ready");
    } else {
        tracing::warn!(
            failed = report.failed.len(),
            "Database schema provisioned with failures"
        );
    }
    report
}

async fn execute(pool: &PgPool, sql: &str) -> Result<(), sqlx::Error> {
    sqlx::query(sql).execute(pool).await.map(|_| ())
}

async fn create_indexes(pool: &PgPool) -> Result<(), sqlx::Error> {
    for sql in INDEXES {
        execute(pool, sql).await?;
    }
    Ok(())
}
