// ==========================================
// 二手车挂牌数据入库 - 导入层
// ==========================================
// 职责: 数据源读取 → 清洗 → 物化 → 批量写入
// 支持: CSV, Excel
// ==========================================

// 模块声明
pub mod batch_loader;
pub mod conflict_handler;
pub mod data_cleaner;
pub mod dq_validator;
pub mod error;
pub mod file_parser;
pub mod pipeline;
pub mod row_materializer;
pub mod scalar_normalizer;

// 重导出核心类型
pub use batch_loader::{BatchLoader, BatchOutcome, DEFAULT_BATCH_SIZE};
pub use conflict_handler::ConflictHandler;
pub use data_cleaner::DataCleaner;
pub use dq_validator::DqValidator;
pub use error::{LoadError, LoadResult, MissingColumns};
pub use file_parser::{CsvSourceReader, ExcelSourceReader, SourceReader, UniversalSourceReader};
pub use pipeline::LoadPipeline;
pub use row_materializer::{materialize, ParamRow};
