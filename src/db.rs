// ==========================================
// BOM 助手 - 配置库初始化
// ==========================================
// 职责: 打开配置库、应用 PRAGMA、建 config_kv 表并登记 schema_version
// ==========================================

use rusqlite::Connection;
use std::path::Path;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前配置库的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

const CONFIG_SCHEMA: &str = r#"
PRAGMA foreign_keys = ON;
CREATE TABLE IF NOT EXISTS config_kv (
    scope_id   TEXT NOT NULL,
    key        TEXT NOT NULL,
    value      TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (scope_id, key)
);
CREATE TABLE IF NOT EXISTS schema_version (
    version    INTEGER NOT NULL,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

/// 打开配置库文件并完成初始化
pub fn open_config_db(path: impl AsRef<Path>) -> rusqlite::Result<Connection> {
    let conn = Connection::open(path)?;
    prepare_config_connection(&conn)?;
    Ok(conn)
}

/// 内存配置库
pub fn open_config_db_in_memory() -> rusqlite::Result<Connection> {
    let conn = Connection::open_in_memory()?;
    prepare_config_connection(&conn)?;
    Ok(conn)
}

/// 对已有连接应用 busy_timeout 并建表（幂等）
///
/// # 返回
/// 库中登记的 schema_version（空库首次初始化时写入当前版本）
pub fn prepare_config_connection(conn: &Connection) -> rusqlite::Result<i64> {
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    conn.execute_batch(CONFIG_SCHEMA)?;

    let recorded: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    match recorded {
        Some(version) => Ok(version),
        None => {
            conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                [CURRENT_SCHEMA_VERSION],
            )?;
            Ok(CURRENT_SCHEMA_VERSION)
        }
    }
}
