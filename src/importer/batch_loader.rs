// ==========================================
// 二手车挂牌数据入库 - 批量写入器
// ==========================================
// 职责: 参数化多行 INSERT，按批次写入，主键冲突跳过
// 前提: 目标表在 listing_id 上有唯一约束（不在运行时校验）
// 红线: 不提交、不回滚，事务边界由调用方持有
// ==========================================

use crate::db::quote_identifier;
use crate::importer::error::{LoadError, LoadResult};
use crate::importer::row_materializer::ParamRow;
use rusqlite::{params_from_iter, Connection};
use tracing::{debug, info, warn};

/// 默认批次大小（行）
pub const DEFAULT_BATCH_SIZE: usize = 5_000;

/// SQLite 单条语句可绑定的参数上限（SQLITE_MAX_VARIABLE_NUMBER 默认值）
pub const SQLITE_MAX_PARAMS: usize = 32_766;

/// 单表写入结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    /// 实际新增行数
    pub inserted: usize,
    /// 提交的批次数
    pub chunks: usize,
}

pub struct BatchLoader {
    schema: String,
    batch_size: usize,
}

impl BatchLoader {
    pub fn new(schema: impl Into<String>, batch_size: usize) -> Self {
        Self {
            schema: schema.into(),
            batch_size: batch_size.max(1),
        }
    }

    /// 分批写入
    ///
    /// # 参数
    /// - conn: 已开启事务的连接
    /// - table: 目标表名
    /// - columns: INSERT 列顺序
    /// - rows: 绑定参数（每行长度等于列数）
    ///
    /// # 返回
    /// - Ok(BatchOutcome): 新增行数（冲突跳过的不计）与批次数
    /// - Err(LoadFailure): 任一语句失败
    pub fn insert_batches(
        &self,
        conn: &Connection,
        table: &str,
        columns: &[&str],
        rows: &[ParamRow],
    ) -> LoadResult<BatchOutcome> {
        if rows.is_empty() {
            warn!(table = table, "{}: 0 行待写入", table);
            return Ok(BatchOutcome::default());
        }

        let total = rows.len();
        let rows_per_statement = (SQLITE_MAX_PARAMS / columns.len().max(1)).max(1);
        let mut outcome = BatchOutcome::default();

        for (chunk_idx, chunk) in rows.chunks(self.batch_size).enumerate() {
            let start = chunk_idx * self.batch_size;

            for statement_rows in chunk.chunks(rows_per_statement) {
                outcome.inserted += self.execute_insert(conn, table, columns, statement_rows)?;
            }
            outcome.chunks += 1;

            info!(
                table = table,
                start = start,
                end = start + chunk.len(),
                total = total,
                "{}: 已写入批次 {}..{} / {}",
                table,
                start,
                start + chunk.len(),
                total
            );
        }

        debug!(
            table = table,
            inserted = outcome.inserted,
            skipped = total - outcome.inserted,
            "批量写入完成"
        );
        Ok(outcome)
    }

    /// 构造多行 INSERT ... ON CONFLICT DO NOTHING
    pub fn build_insert_sql(&self, table: &str, columns: &[&str], row_count: usize) -> String {
        let column_sql = columns
            .iter()
            .map(|c| quote_identifier(c))
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = format!("({})", vec!["?"; columns.len()].join(", "));
        let values_sql = vec![placeholders.as_str(); row_count].join(", ");

        format!(
            "INSERT INTO {}.{} ({}) VALUES {} ON CONFLICT DO NOTHING",
            quote_identifier(&self.schema),
            quote_identifier(table),
            column_sql,
            values_sql
        )
    }

    fn execute_insert(
        &self,
        conn: &Connection,
        table: &str,
        columns: &[&str],
        rows: &[ParamRow],
    ) -> LoadResult<usize> {
        let sql = self.build_insert_sql(table, columns, rows.len());
        let mut stmt = conn
            .prepare_cached(&sql)
            .map_err(|e| LoadError::load_failure(table, e))?;

        stmt.execute(params_from_iter(rows.iter().flatten()))
            .map_err(|e| LoadError::load_failure(table, e))
    }
}
