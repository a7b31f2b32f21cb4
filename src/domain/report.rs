// ==========================================
// 二手车挂牌数据入库 - 运行汇总
// ==========================================

use crate::domain::types::TableKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 单表写入统计
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableLoadStats {
    pub table: TableKind,
    pub read_rows: usize,
    pub cleaned_rows: usize,
    /// 实际新增行数（主键冲突跳过的行不计入）
    pub inserted_rows: usize,
    pub chunks: usize,
}

/// 一次已提交运行的汇总
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadSummary {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: u64,
    pub tables: Vec<TableLoadStats>,
}

impl LoadSummary {
    pub fn total_inserted(&self) -> usize {
        self.tables.iter().map(|t| t.inserted_rows).sum()
    }

    pub fn table(&self, kind: TableKind) -> Option<&TableLoadStats> {
        self.tables.iter().find(|t| t.table == kind)
    }
}
