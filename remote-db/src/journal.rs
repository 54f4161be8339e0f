//! Journal-folder migrator.
//!
//! Reads a migrations folder laid out as `meta/_journal.json` plus one
//! `{tag}.sql` file per entry, compares it with the tracking table and hands
//! the pending statements to the applier.

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use sha2::{Digest, Sha256};

use common::errors::{AppError, AppResult};
use common::models::{QueryMethod, QueryResult};
use common::utils::split_statements;

use crate::executor::StatementExecutor;
use crate::migrate::{MigrationApplier, Migrator};

/// Default name of the table recording applied migrations.
pub const DEFAULT_MIGRATIONS_TABLE: &str = "__drizzle_migrations";

#[derive(Debug, Deserialize)]
struct Journal {
    entries: Vec<JournalEntry>,
}

#[derive(Debug, Deserialize)]
struct JournalEntry {
    when: i64,
    tag: String,
    #[serde(default)]
    breakpoints: bool,
}

/// One migration file, ready to apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationMeta {
    /// File stem of the migration, e.g. `0000_init`.
    pub tag: String,
    /// Statements in file order.
    pub sql: Vec<String>,
    /// Journal timestamp in milliseconds; compared with `created_at`.
    pub folder_millis: i64,
    /// Lowercase hex SHA-256 of the file contents.
    pub hash: String,
}

/// Reads every migration listed in `{folder}/meta/_journal.json`, in journal order.
pub async fn read_migration_files(folder: &Path) -> AppResult<Vec<MigrationMeta>> {
    let journal_path = folder.join("meta").join("_journal.json");
    let raw = tokio::fs::read_to_string(&journal_path).await.map_err(|e| {
        AppError::Migration(format!(
            "can't find meta/_journal.json at {}: {}",
            journal_path.display(),
            e
        ))
    })?;
    let journal: Journal = serde_json::from_str(&raw).map_err(|e| {
        AppError::Migration(format!("invalid journal {}: {}", journal_path.display(), e))
    })?;

    let mut migrations = Vec::with_capacity(journal.entries.len());
    for entry in journal.entries {
        let path = folder.join(format!("{}.sql", entry.tag));
        let query = tokio::fs::read_to_string(&path).await.map_err(|e| {
            AppError::Migration(format!("no file {} found: {}", path.display(), e))
        })?;

        let sql = if entry.breakpoints {
            split_statements(&query)
        } else {
            vec![query.trim().to_string()]
        };

        migrations.push(MigrationMeta {
            tag: entry.tag,
            sql,
            folder_millis: entry.when,
            hash: format!("{:x}", Sha256::digest(query.as_bytes())),
        });
    }
    Ok(migrations)
}

/// Latest row of the tracking table, as far as it can be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LastApplied {
    /// The tracking table is empty.
    Nothing,
    /// Newest recorded migration timestamp, in milliseconds.
    At(i64),
    /// A row exists but its `created_at` is not a number.
    Unreadable,
}

impl LastApplied {
    /// Reads the `values` answer of the last-migration query.
    pub fn from_result(result: &QueryResult) -> Self {
        let Some(row) = result.rows.first() else {
            return LastApplied::Nothing;
        };
        let created_at = row.as_array().and_then(|row| row.get(2));
        let millis = created_at.and_then(|value| {
            value
                .as_i64()
                .or_else(|| value.as_f64().map(|v| v as i64))
                .or_else(|| value.as_str().and_then(|s| s.trim().parse::<f64>().ok()).map(|v| v as i64))
        });
        match millis {
            Some(millis) => LastApplied::At(millis),
            None => LastApplied::Unreadable,
        }
    }

    /// Whether a migration stamped `folder_millis` still has to run.
    ///
    /// An unreadable row never compares as older, so nothing is re-applied.
    fn is_pending(&self, folder_millis: i64) -> bool {
        match self {
            LastApplied::Nothing => true,
            LastApplied::At(last) => *last < folder_millis,
            LastApplied::Unreadable => false,
        }
    }
}

/// [`Migrator`] backed by a journal folder and a tracking table.
#[derive(Debug, Clone)]
pub struct JournalMigrator {
    migrations_table: String,
}

impl Default for JournalMigrator {
    fn default() -> Self {
        Self::new()
    }
}

impl JournalMigrator {
    pub fn new() -> Self {
        Self {
            migrations_table: DEFAULT_MIGRATIONS_TABLE.to_string(),
        }
    }

    /// Uses `table` instead of [`DEFAULT_MIGRATIONS_TABLE`].
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.migrations_table = table.into();
        self
    }

    fn create_table_sql(&self) -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS \"{}\" (id SERIAL PRIMARY KEY, hash text NOT NULL, created_at numeric)",
            self.migrations_table
        )
    }

    fn last_migration_sql(&self) -> String {
        format!(
            "SELECT id, hash, created_at FROM \"{}\" ORDER BY created_at DESC LIMIT 1",
            self.migrations_table
        )
    }

    fn record_sql(&self, migration: &MigrationMeta) -> String {
        format!(
            "INSERT INTO \"{}\" (\"hash\", \"created_at\") VALUES('{}', '{}')",
            self.migrations_table, migration.hash, migration.folder_millis
        )
    }

    /// Statements still to apply, each migration followed by its tracking row.
    pub fn pending_queries(
        &self,
        migrations: &[MigrationMeta],
        last_applied: LastApplied,
    ) -> Vec<String> {
        let mut queries = Vec::new();
        for migration in migrations {
            if !last_applied.is_pending(migration.folder_millis) {
                continue;
            }
            tracing::debug!(
                tag = %migration.tag,
                created = ?DateTime::<Utc>::from_timestamp_millis(migration.folder_millis),
                statements = migration.sql.len(),
                "待执行迁移"
            );
            queries.extend(migration.sql.iter().cloned());
            queries.push(self.record_sql(migration));
        }
        queries
    }
}

#[async_trait]
impl Migrator for JournalMigrator {
    async fn migrate(
        &self,
        db: &dyn StatementExecutor,
        apply: &dyn MigrationApplier,
        migrations_folder: &Path,
    ) -> AppResult<()> {
        let migrations = read_migration_files(migrations_folder).await?;

        db.execute(&self.create_table_sql(), &[], QueryMethod::Run)
            .await?;
        let last = db
            .execute(&self.last_migration_sql(), &[], QueryMethod::Values)
            .await?;
        let last_applied = LastApplied::from_result(&last);
        if last_applied == LastApplied::Unreadable {
            tracing::warn!(table = %self.migrations_table, "迁移记录的 created_at 无法解析");
        }

        let queries = self.pending_queries(&migrations, last_applied);
        if queries.is_empty() {
            tracing::info!(migrations = migrations.len(), "没有待执行的迁移");
            return Ok(());
        }
        apply.apply(queries).await
    }
}
