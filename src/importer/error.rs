// ==========================================
// 二手车挂牌数据入库 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 传播: 清洗阶段错误直接上抛；事务阶段错误先回滚再原样上抛
// ==========================================

use std::fmt;
use thiserror::Error;

/// 单张表缺失的列
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingColumns {
    pub table: String,
    pub columns: Vec<String>,
}

impl fmt::Display for MissingColumns {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: [{}]", self.table, self.columns.join(", "))
    }
}

fn join_missing(missing: &[MissingColumns]) -> String {
    missing
        .iter()
        .map(|m| m.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum LoadError {
    // ===== 配置错误 =====
    #[error("缺少必需配置项: {}", .missing.join(", "))]
    Configuration { missing: Vec<String> },

    #[error("配置值格式错误 (key: {key}, value: {value}): {message}")]
    InvalidConfig {
        key: String,
        value: String,
        message: String,
    },

    // ===== 数据源错误 =====
    #[error("数据源不存在: {0}")]
    SourceNotFound(String),

    #[error("数据源格式不支持: {0}（仅支持 .csv/.xlsx/.xls/.xlsm/.ods）")]
    UnsupportedFormat(String),

    #[error("数据源读取失败: {0}")]
    SourceRead(String),

    #[error("数据源缺少必需列: {}", join_missing(.missing))]
    SchemaMismatch { missing: Vec<MissingColumns> },

    // ===== 数据库错误 =====
    #[error("数据库连接失败: {target}")]
    Connectivity {
        target: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("写入失败 (表 {table})")]
    LoadFailure {
        table: String,
        #[source]
        source: rusqlite::Error,
    },
}

impl LoadError {
    pub fn schema_mismatch(table: &str, columns: Vec<String>) -> Self {
        LoadError::SchemaMismatch {
            missing: vec![MissingColumns {
                table: table.to_string(),
                columns,
            }],
        }
    }

    pub fn load_failure(table: &str, source: rusqlite::Error) -> Self {
        LoadError::LoadFailure {
            table: table.to_string(),
            source,
        }
    }

    /// 是否属于约束违反（外键/唯一/CHECK/NOT NULL）
    pub fn is_constraint_violation(&self) -> bool {
        match self {
            LoadError::LoadFailure { source, .. } => matches!(
                source.sqlite_error_code(),
                Some(rusqlite::ErrorCode::ConstraintViolation)
            ),
            _ => false,
        }
    }
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for LoadError {
    fn from(err: std::io::Error) -> Self {
        LoadError::SourceRead(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for LoadError {
    fn from(err: csv::Error) -> Self {
        LoadError::SourceRead(format!("CSV 解析失败: {}", err))
    }
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for LoadError {
    fn from(err: calamine::Error) -> Self {
        LoadError::SourceRead(format!("Excel 解析失败: {}", err))
    }
}

/// Result 类型别名
pub type LoadResult<T> = Result<T, LoadError>;
