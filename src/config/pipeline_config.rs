// ==========================================
// 二手车挂牌数据入库 - 管道配置
// ==========================================
// 职责: 启动时一次性构造配置（数据源路径 / 目标库 / 批次大小）
// 来源: 环境变量（生产）或任意键值查找函数（测试）
// 红线: 缺失的必需配置一次性全部列出
// ==========================================

use crate::domain::types::TableKind;
use crate::importer::batch_loader::DEFAULT_BATCH_SIZE;
use crate::importer::error::{LoadError, LoadResult};
use std::path::{Path, PathBuf};

/// 默认目标 schema（SQLite 主库）
pub const DEFAULT_SCHEMA: &str = "main";

// ==========================================
// 配置键
// ==========================================
pub mod config_keys {
    // 数据源
    pub const DATA_DIR: &str = "LISTING_LOADER_DATA_DIR";
    pub const CORE_PATH: &str = "LISTING_LOADER_CORE_PATH";
    pub const PRICING_PATH: &str = "LISTING_LOADER_PRICING_PATH";
    pub const VEHICLE_PATH: &str = "LISTING_LOADER_VEHICLE_PATH";
    pub const SPECS_PATH: &str = "LISTING_LOADER_SPECS_PATH";
    pub const APPEARANCE_PATH: &str = "LISTING_LOADER_APPEARANCE_PATH";
    pub const STATUS_PATH: &str = "LISTING_LOADER_STATUS_PATH";

    // 目标库
    pub const DB_PATH: &str = "LISTING_LOADER_DB_PATH";
    pub const SCHEMA: &str = "LISTING_LOADER_SCHEMA";
    pub const SCHEMA_DB_PATH: &str = "LISTING_LOADER_SCHEMA_DB_PATH";

    // 写入
    pub const BATCH_SIZE: &str = "LISTING_LOADER_BATCH_SIZE";
}

/// 各表对应的数据源路径键
pub fn source_path_key(kind: TableKind) -> &'static str {
    match kind {
        TableKind::Core => config_keys::CORE_PATH,
        TableKind::Pricing => config_keys::PRICING_PATH,
        TableKind::Vehicle => config_keys::VEHICLE_PATH,
        TableKind::Specs => config_keys::SPECS_PATH,
        TableKind::Appearance => config_keys::APPEARANCE_PATH,
        TableKind::Status => config_keys::STATUS_PATH,
    }
}

// ==========================================
// SourcePaths - 六个数据源路径
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePaths {
    pub core: PathBuf,
    pub pricing: PathBuf,
    pub vehicle: PathBuf,
    pub specs: PathBuf,
    pub appearance: PathBuf,
    pub status: PathBuf,
}

impl SourcePaths {
    /// `<dir>/<表名>.csv`
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        let csv = |kind: TableKind| dir.join(format!("{}.csv", kind.table_name()));
        Self {
            core: csv(TableKind::Core),
            pricing: csv(TableKind::Pricing),
            vehicle: csv(TableKind::Vehicle),
            specs: csv(TableKind::Specs),
            appearance: csv(TableKind::Appearance),
            status: csv(TableKind::Status),
        }
    }

    pub fn get(&self, kind: TableKind) -> &Path {
        match kind {
            TableKind::Core => &self.core,
            TableKind::Pricing => &self.pricing,
            TableKind::Vehicle => &self.vehicle,
            TableKind::Specs => &self.specs,
            TableKind::Appearance => &self.appearance,
            TableKind::Status => &self.status,
        }
    }

    fn slot_mut(&mut self, kind: TableKind) -> &mut PathBuf {
        match kind {
            TableKind::Core => &mut self.core,
            TableKind::Pricing => &mut self.pricing,
            TableKind::Vehicle => &mut self.vehicle,
            TableKind::Specs => &mut self.specs,
            TableKind::Appearance => &mut self.appearance,
            TableKind::Status => &mut self.status,
        }
    }
}

// ==========================================
// DatabaseConfig - 目标库
// ==========================================
// schema 为 main 时直接写主库；否则把 schema_path 以该名称 ATTACH
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    pub schema: String,
    pub schema_path: Option<PathBuf>,
}

impl DatabaseConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            schema: DEFAULT_SCHEMA.to_string(),
            schema_path: None,
        }
    }

    pub fn is_main_schema(&self) -> bool {
        self.schema.eq_ignore_ascii_case(DEFAULT_SCHEMA)
    }
}

// ==========================================
// PipelineConfig
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub sources: SourcePaths,
    pub database: DatabaseConfig,
    pub batch_size: usize,
}

impl PipelineConfig {
    pub fn new(sources: SourcePaths, database: DatabaseConfig) -> Self {
        Self {
            sources,
            database,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// 从进程环境变量构造
    pub fn from_env() -> LoadResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从键值查找函数构造
    ///
    /// # 规则
    /// - 每个数据源：`<TABLE>_PATH` 优先，否则 `DATA_DIR/<表名>.csv`
    /// - DB_PATH 必需；SCHEMA 默认 main，非 main 时 SCHEMA_DB_PATH 必需
    /// - BATCH_SIZE 默认 5000，必须为正整数
    pub fn from_lookup<F>(lookup: F) -> LoadResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // 空白值视为未设置
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut missing = Vec::new();

        let data_dir = get(config_keys::DATA_DIR).map(PathBuf::from);
        let mut sources = SourcePaths::from_dir(data_dir.clone().unwrap_or_default());
        for kind in TableKind::ALL {
            let key = source_path_key(kind);
            match (get(key), &data_dir) {
                (Some(path), _) => *sources.slot_mut(kind) = PathBuf::from(path),
                (None, Some(_)) => {}
                (None, None) => missing.push(key.to_string()),
            }
        }

        let db_path = get(config_keys::DB_PATH);
        if db_path.is_none() {
            missing.push(config_keys::DB_PATH.to_string());
        }

        let schema = get(config_keys::SCHEMA).unwrap_or_else(|| DEFAULT_SCHEMA.to_string());
        let schema_path = get(config_keys::SCHEMA_DB_PATH).map(PathBuf::from);
        if !schema.eq_ignore_ascii_case(DEFAULT_SCHEMA) && schema_path.is_none() {
            missing.push(config_keys::SCHEMA_DB_PATH.to_string());
        }

        if !missing.is_empty() {
            return Err(LoadError::Configuration { missing });
        }

        let batch_size = match get(config_keys::BATCH_SIZE) {
            None => DEFAULT_BATCH_SIZE,
            Some(raw) => match raw.parse::<usize>() {
                Ok(size) if size > 0 => size,
                _ => {
                    return Err(LoadError::InvalidConfig {
                        key: config_keys::BATCH_SIZE.to_string(),
                        value: raw,
                        message: "批次大小必须为正整数".to_string(),
                    })
                }
            },
        };

        Ok(Self {
            sources,
            database: DatabaseConfig {
                path: PathBuf::from(db_path.unwrap_or_default()),
                schema,
                schema_path,
            },
            batch_size,
        })
    }
}
