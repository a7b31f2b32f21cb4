// ==========================================
// 二手车挂牌数据入库 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一连接的 PRAGMA 行为（外键 / busy_timeout）
// - 目标 schema 非 main 时以该名称 ATTACH
// - 只连接已存在的库文件，不隐式建库
// ==========================================

use crate::config::DatabaseConfig;
use crate::importer::error::{LoadError, LoadResult};
use rusqlite::{Connection, OpenFlags};
use std::time::Duration;
use tracing::{debug, info, warn};

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// SQL 标识符加双引号（内部双引号转义）
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开目标库连接
///
/// # 返回
/// - Ok(Connection): 已配置 PRAGMA、已 ATTACH 目标 schema
/// - Err(Connectivity): 库文件不存在/无法打开/ATTACH 失败
pub fn connect(config: &DatabaseConfig) -> LoadResult<Connection> {
    let target = config.path.display().to_string();
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_URI
        | OpenFlags::SQLITE_OPEN_NO_MUTEX;

    let conn = Connection::open_with_flags(&config.path, flags).map_err(|source| {
        LoadError::Connectivity {
            target: target.clone(),
            source,
        }
    })?;

    configure_sqlite_connection(&conn).map_err(|source| LoadError::Connectivity {
        target: target.clone(),
        source,
    })?;

    if !config.is_main_schema() {
        attach_schema(&conn, config)?;
    }

    info!(database = %target, schema = %config.schema, "数据库连接已建立");
    Ok(conn)
}

fn attach_schema(conn: &Connection, config: &DatabaseConfig) -> LoadResult<()> {
    let schema_path = config
        .schema_path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_default();

    // ATTACH 不会创建父目录，但会隐式建空库；先确认文件存在
    if !std::path::Path::new(&schema_path).exists() {
        return Err(LoadError::Connectivity {
            target: schema_path,
            source: rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CANTOPEN),
                Some("目标 schema 库文件不存在".to_string()),
            ),
        });
    }

    let sql = format!("ATTACH DATABASE ?1 AS {}", quote_identifier(&config.schema));
    conn.execute(&sql, [&schema_path])
        .map_err(|source| LoadError::Connectivity {
            target: schema_path.clone(),
            source,
        })?;

    debug!(schema = %config.schema, path = %schema_path, "目标 schema 已 ATTACH");
    Ok(())
}

/// 关闭连接（失败只记录，不上抛）
pub fn release_connection(conn: Connection) {
    match conn.close() {
        Ok(()) => debug!("数据库连接已关闭"),
        Err((_conn, e)) => warn!(error = %e, "数据库连接关闭失败"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("core"), "\"core\"");
        assert_eq!(quote_identifier("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn test_connect_missing_file_is_connectivity_error() {
        let config = DatabaseConfig::new("/nonexistent/dir/car_market.db");
        let err = connect(&config).unwrap_err();
        assert!(matches!(err, LoadError::Connectivity { .. }));
    }

    #[test]
    fn test_connect_enables_foreign_keys() {
        let temp_file = NamedTempFile::new().unwrap();
        let conn = connect(&DatabaseConfig::new(temp_file.path())).unwrap();

        let fk: i64 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(fk, 1);
        release_connection(conn);
    }

    #[test]
    fn test_connect_attaches_schema() {
        let main_file = NamedTempFile::new().unwrap();
        let schema_file = NamedTempFile::new().unwrap();
        let config = DatabaseConfig {
            path: main_file.path().to_path_buf(),
            schema: "car_market".to_string(),
            schema_path: Some(schema_file.path().to_path_buf()),
        };

        let conn = connect(&config).unwrap();
        conn.execute_batch(
            "CREATE TABLE car_market.core (listing_id INTEGER PRIMARY KEY, url TEXT)",
        )
        .unwrap();

        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM car_market.sqlite_master WHERE name = 'core'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 1);
    }

    #[test]
    fn test_connect_missing_schema_file() {
        let main_file = NamedTempFile::new().unwrap();
        let config = DatabaseConfig {
            path: main_file.path().to_path_buf(),
            schema: "car_market".to_string(),
            schema_path: Some("/nonexistent/car_market.db".into()),
        };

        assert!(matches!(
            connect(&config).unwrap_err(),
            LoadError::Connectivity { .. }
        ));
    }
}
