// ==========================================
// 二手车挂牌数据入库 - 列校验器实现
// ==========================================
// 职责: 清洗前校验各数据源是否包含全部入库列
// 红线: 一次性汇总所有表的缺失列，校验失败时不打开数据库连接
// ==========================================

use crate::domain::table::Table;
use crate::domain::types::TableKind;
use crate::importer::error::{LoadError, LoadResult, MissingColumns};
use tracing::{debug, error};

pub struct DqValidator;

impl DqValidator {
    /// 单表缺失列（按入库列顺序）
    pub fn missing_columns(&self, kind: TableKind, table: &Table) -> Vec<String> {
        kind.load_columns()
            .iter()
            .filter(|column| !table.has_column(column))
            .map(|column| column.to_string())
            .collect()
    }

    /// 校验全部数据源
    ///
    /// # 返回
    /// - Ok(()): 所有表列齐全
    /// - Err(SchemaMismatch): 列出每张表缺失的列
    pub fn validate_columns(&self, sources: &[(TableKind, Table)]) -> LoadResult<()> {
        let missing: Vec<MissingColumns> = sources
            .iter()
            .filter_map(|(kind, table)| {
                let columns = self.missing_columns(*kind, table);
                if columns.is_empty() {
                    debug!(table = %kind, "列校验通过");
                    None
                } else {
                    Some(MissingColumns {
                        table: kind.table_name().to_string(),
                        columns,
                    })
                }
            })
            .collect();

        if missing.is_empty() {
            return Ok(());
        }

        let err = LoadError::SchemaMismatch { missing };
        error!(error = %err, "列校验失败");
        Err(err)
    }
}
