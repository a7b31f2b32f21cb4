// ==========================================
// 二手车挂牌数据入库 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 六张挂牌表的清洗与事务化批量入库
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 表结构与类型
pub mod domain;

// 导入层 - 读取/清洗/写入
pub mod importer;

// 配置层 - 启动配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

pub use config::{DatabaseConfig, PipelineConfig, SourcePaths};
pub use domain::{CellValue, LoadSummary, PipelineState, Table, TableKind, TableLoadStats};
pub use importer::{LoadError, LoadPipeline, LoadResult, UniversalSourceReader};

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "二手车挂牌数据入库";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
