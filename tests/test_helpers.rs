// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的目标库初始化、CSV 数据源生成等功能
// ==========================================

#![allow(dead_code)]

use listing_loader::{DatabaseConfig, PipelineConfig, SourcePaths, TableKind};
use rusqlite::Connection;
use std::error::Error;
use std::fs;
use std::path::Path;
use tempfile::NamedTempFile;

/// 目标库 schema（六张表，子表外键指向 core）
pub const SCHEMA_SQL: &str = r#"
    CREATE TABLE core (
        listing_id INTEGER PRIMARY KEY,
        url TEXT NOT NULL
    );
    CREATE TABLE pricing (
        listing_id INTEGER PRIMARY KEY REFERENCES core(listing_id),
        price REAL,
        year INTEGER,
        mileage INTEGER
    );
    CREATE TABLE vehicle (
        listing_id INTEGER PRIMARY KEY REFERENCES core(listing_id),
        make TEXT,
        model TEXT
    );
    CREATE TABLE specs (
        listing_id INTEGER PRIMARY KEY REFERENCES core(listing_id),
        engine_size REAL CHECK (engine_size IS NULL OR engine_size < 20),
        engine_type TEXT,
        transmission TEXT,
        drive_type TEXT,
        steering_wheel TEXT,
        wheel_size REAL,
        comfort TEXT
    );
    CREATE TABLE appearance (
        listing_id INTEGER PRIMARY KEY REFERENCES core(listing_id),
        body_type TEXT,
        color TEXT,
        interior_material TEXT,
        sunroof INTEGER
    );
    CREATE TABLE status (
        listing_id INTEGER PRIMARY KEY REFERENCES core(listing_id),
        cleared_customs INTEGER,
        condition TEXT
    );
"#;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_str().ok_or("非 UTF-8 路径")?.to_string();

    let conn = Connection::open(&db_path)?;
    conn.execute_batch(SCHEMA_SQL)?;

    Ok((temp_file, db_path))
}

/// 打开测试连接（开启外键）
pub fn open_test_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    Ok(conn)
}

/// 各表的默认 CSV 内容
///
/// 清洗后: core=3, pricing=3, vehicle=3, specs=2, appearance=3, status=3
pub fn default_source(kind: TableKind) -> &'static str {
    match kind {
        TableKind::Core => {
            "listing_id,url\n\
             1, https://cars.example/1 \n\
             2,https://cars.example/2\n\
             2,https://cars.example/2-dup\n\
             3,\n\
             abc,https://cars.example/bad\n\
             4,https://cars.example/4\n"
        }
        TableKind::Pricing => {
            "listing_id,price,year,mileage\n\
             1,15000,2015,120000\n\
             2,-5,1899,-1\n\
             4,9800.5,2999,abc\n"
        }
        TableKind::Vehicle => {
            "listing_id,make,model\n\
             1,BMW,X5\n\
             2, Toyota , Camry \n\
             4,Lada,\n"
        }
        TableKind::Specs => {
            "listing_id,engine_size,engine_type,transmission,drive_type,steering_wheel,wheel_size,comfort\n\
             1,3.0,Petrol,Automatic,AWD,Left,19,full\n\
             2,0,Hybrid,CVT,FWD,Left,-1,\n"
        }
        TableKind::Appearance => {
            "listing_id,body_type,color,interior_material,sunroof\n\
             1,SUV,Black,Leather,Yes\n\
             2,Sedan,White,Fabric,0\n\
             4,Hatchback,Red,,maybe\n"
        }
        TableKind::Status => {
            "listing_id,cleared_customs,condition\n\
             1,yes,used\n\
             2,FALSE,new\n\
             4,,\n"
        }
    }
}

/// 在目录中写入六个 CSV 数据源（可覆盖个别表的内容）
pub fn write_sources(
    dir: &Path,
    overrides: &[(TableKind, &str)],
) -> Result<SourcePaths, Box<dyn Error>> {
    let sources = SourcePaths::from_dir(dir);
    for kind in TableKind::ALL {
        let content = overrides
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, content)| *content)
            .unwrap_or_else(|| default_source(kind));
        fs::write(sources.get(kind), content)?;
    }
    Ok(sources)
}

/// 测试配置（批次大小 2，确保多批次）
pub fn test_config(sources: SourcePaths, db_path: &str) -> PipelineConfig {
    let mut config = PipelineConfig::new(sources, DatabaseConfig::new(db_path));
    config.batch_size = 2;
    config
}

/// 统计表行数
pub fn count_rows(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
        row.get(0)
    })
    .unwrap_or(-1)
}

/// 统计六张表行数（按 TableKind::ALL 顺序）
pub fn count_all(db_path: &str) -> Vec<i64> {
    let conn = open_test_connection(db_path).expect("打开测试库失败");
    TableKind::ALL
        .iter()
        .map(|kind| count_rows(&conn, kind.table_name()))
        .collect()
}
