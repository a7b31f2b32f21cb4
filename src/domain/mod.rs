// ==========================================
// 二手车挂牌数据入库 - 领域模型层
// ==========================================
// 职责: 表结构、单元格值、表类型、运行汇总
// 红线: 不含数据访问逻辑
// ==========================================

pub mod report;
pub mod table;
pub mod types;

// 重导出核心类型
pub use report::{LoadSummary, TableLoadStats};
pub use table::{CellValue, Table};
pub use types::{load_order, PipelineState, TableKind, KEY_COLUMN};
