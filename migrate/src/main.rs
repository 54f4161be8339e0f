//! 数据库迁移脚本
//!
//! 一次性执行迁移目录中尚未应用的迁移：
//! - 读取 .env 与环境变量中的数据库配置
//! - 按顺序逐条执行迁移语句
//! - 任一语句失败即中止并以非零状态退出
//!
//! 用法：`migrate [迁移目录]`，默认目录为 `./src/db/migrations`。

use std::path::PathBuf;

use anyhow::Context;
use remote_db::{
    create_database_without_schema, create_migration_runner, DatabaseConfig, EndpointShape,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Selects the endpoint layout (`app-scoped` or `direct`).
const ENDPOINT_SHAPE_ENV: &str = "DB_ENDPOINT_SHAPE";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file (if present) before anything else
    load_dotenv();

    // 初始化日志追踪
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // 加载配置（仅在入口处读取一次环境变量）
    let shape = match std::env::var(ENDPOINT_SHAPE_ENV) {
        Ok(value) => value.parse::<EndpointShape>()?,
        Err(_) => EndpointShape::default(),
    };
    let config = DatabaseConfig::from_env().with_shape(shape);
    let folder = std::env::args().nth(1).map(PathBuf::from);

    let db = create_database_without_schema(&config).context("无法创建数据库连接")?;
    let runner = create_migration_runner(&db, config);

    info!(shape = %shape, "开始迁移");
    runner
        .run(folder.as_deref())
        .await
        .context("迁移失败")?;
    info!("迁移完成");

    Ok(())
}

/// Load .env file from the working directory (best-effort, no error if missing).
fn load_dotenv() {
    let env_path = std::path::Path::new(".env");
    if !env_path.exists() {
        return;
    }
    let Ok(content) = std::fs::read_to_string(env_path) else {
        return;
    };
    for (key, value) in parse_dotenv(&content) {
        // Only set if not already set by the environment
        if std::env::var(key).is_err() {
            std::env::set_var(key, value);
        }
    }
}

/// Parses `KEY=VALUE` lines, skipping blanks and `#` comments.
fn parse_dotenv(content: &str) -> Vec<(&str, &str)> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.trim(), value.trim().trim_matches('"')))
        .collect()
}
