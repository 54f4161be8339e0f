//! Migration runner.
//!
//! Drives a [`Migrator`] and executes every statement it decides must run,
//! strictly in order, through a freshly built executor. A failing statement
//! stops the run and its error propagates unchanged; there is no rollback
//! and no resumption bookkeeping here.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use common::config::DatabaseConfig;
use common::errors::AppResult;
use common::models::QueryMethod;
use common::utils::StatementKind;

use crate::database::Database;
use crate::executor::{create_execute_query, StatementExecutor};
use crate::journal::JournalMigrator;

/// Folder used when no migrations folder is given.
pub const DEFAULT_MIGRATIONS_FOLDER: &str = "./src/db/migrations";

/// Options for running migrations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationOptions {
    /// Path to the migrations folder.
    pub migrations_folder: PathBuf,
}

impl MigrationOptions {
    pub fn new(migrations_folder: impl Into<PathBuf>) -> Self {
        Self {
            migrations_folder: migrations_folder.into(),
        }
    }
}

impl Default for MigrationOptions {
    fn default() -> Self {
        Self::new(DEFAULT_MIGRATIONS_FOLDER)
    }
}

/// Receives the statements a [`Migrator`] wants applied.
#[async_trait]
pub trait MigrationApplier: Send + Sync {
    async fn apply(&self, queries: Vec<String>) -> AppResult<()>;
}

/// Decides which migration statements must run and hands them to an applier.
#[async_trait]
pub trait Migrator: Send + Sync {
    /// `db` is the handle's own executor, used for bookkeeping queries.
    /// Statements to apply go to `apply`.
    async fn migrate(
        &self,
        db: &dyn StatementExecutor,
        apply: &dyn MigrationApplier,
        migrations_folder: &Path,
    ) -> AppResult<()>;
}

/// Applies statements one at a time with `run` and no parameters.
pub struct SequentialApplier<'a> {
    executor: &'a dyn StatementExecutor,
}

impl<'a> SequentialApplier<'a> {
    pub fn new(executor: &'a dyn StatementExecutor) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl<'a> MigrationApplier for SequentialApplier<'a> {
    async fn apply(&self, queries: Vec<String>) -> AppResult<()> {
        let total = queries.len();
        for (index, query) in queries.iter().enumerate() {
            tracing::debug!(
                statement = index + 1,
                total,
                kind = StatementKind::of(query).as_str(),
                "执行迁移语句"
            );
            self.executor.execute(query, &[], QueryMethod::Run).await?;
        }
        tracing::info!(statements = total, "迁移语句执行完成");
        Ok(())
    }
}

/// Runs the migrations in `options.migrations_folder` against `db`.
///
/// Statements are executed through a new executor built from `config`,
/// independent of the one `db` was created with.
pub async fn run_migrations<S>(
    db: &Database<S>,
    config: &DatabaseConfig,
    options: MigrationOptions,
) -> AppResult<()> {
    let executor = create_execute_query(config)?;
    run_migrations_with(&JournalMigrator::new(), db, &executor, &options).await
}

/// Runs migrations with an explicit migrator and statement executor.
pub async fn run_migrations_with<S, M>(
    migrator: &M,
    db: &Database<S>,
    executor: &dyn StatementExecutor,
    options: &MigrationOptions,
) -> AppResult<()>
where
    M: Migrator + ?Sized,
{
    tracing::info!(
        folder = %options.migrations_folder.display(),
        "开始执行数据库迁移"
    );
    let applier = SequentialApplier::new(executor);
    migrator
        .migrate(db.executor(), &applier, &options.migrations_folder)
        .await
}

/// Creates a reusable runner for migration scripts.
pub fn create_migration_runner<S>(db: &Database<S>, config: DatabaseConfig) -> MigrationRunner<S> {
    MigrationRunner {
        db: db.clone(),
        config,
    }
}

/// Runs migrations for a fixed handle and configuration.
#[derive(Debug)]
pub struct MigrationRunner<S = ()> {
    db: Database<S>,
    config: DatabaseConfig,
}

impl<S> MigrationRunner<S> {
    /// Options for a run; `None` selects [`DEFAULT_MIGRATIONS_FOLDER`].
    pub fn options_for(migrations_folder: Option<&Path>) -> MigrationOptions {
        migrations_folder
            .map(MigrationOptions::new)
            .unwrap_or_default()
    }

    /// Runs the migrations in `migrations_folder`, or the default folder.
    pub async fn run(&self, migrations_folder: Option<&Path>) -> AppResult<()> {
        run_migrations(&self.db, &self.config, Self::options_for(migrations_folder)).await
    }
}
