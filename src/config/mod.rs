// ==========================================
// 二手车挂牌数据入库 - 配置层
// ==========================================
// 职责: 启动时构造显式配置结构，按引用传给管道
// 来源: 环境变量（可由 .env 预先注入）
// ==========================================

pub mod pipeline_config;

// 重导出核心配置
pub use pipeline_config::{
    config_keys, source_path_key, DatabaseConfig, PipelineConfig, SourcePaths, DEFAULT_SCHEMA,
};
