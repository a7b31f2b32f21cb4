// ==========================================
// 二手车挂牌数据入库 - 入库管道编排
// ==========================================
// 流程: 读取 → 列校验 → 清洗 → 事务内按父子顺序写入 → 提交/回滚
// 红线:
// - 清洗阶段出错直接上抛（尚无事务）
// - 事务阶段出错先尽力回滚，回滚失败只记录，上抛原始错误
// - 任一出口都关闭连接
// ==========================================

use crate::config::PipelineConfig;
use crate::db;
use crate::domain::report::{LoadSummary, TableLoadStats};
use crate::domain::table::Table;
use crate::domain::types::{load_order, PipelineState, TableKind};
use crate::importer::batch_loader::BatchLoader;
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::dq_validator::DqValidator;
use crate::importer::error::{LoadError, LoadResult};
use crate::importer::file_parser::SourceReader;
use crate::importer::row_materializer::materialize;
use chrono::Utc;
use rusqlite::Connection;
use std::cell::Cell;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// 清洗后的表（附带读取行数）
struct CleanedTable {
    kind: TableKind,
    read_rows: usize,
    table: Table,
}

// ==========================================
// LoadPipeline - 入库管道
// ==========================================
pub struct LoadPipeline<'a, S>
where
    S: SourceReader,
{
    config: &'a PipelineConfig,
    reader: S,
    cleaner: DataCleaner,
    validator: DqValidator,
    state: Cell<PipelineState>,
}

impl<'a, S> LoadPipeline<'a, S>
where
    S: SourceReader,
{
    pub fn new(config: &'a PipelineConfig, reader: S) -> Self {
        Self::with_cleaner(config, reader, DataCleaner::new())
    }

    /// 指定清洗器（如固定年份上限）
    pub fn with_cleaner(config: &'a PipelineConfig, reader: S, cleaner: DataCleaner) -> Self {
        Self {
            config,
            reader,
            cleaner,
            validator: DqValidator,
            state: Cell::new(PipelineState::Loading),
        }
    }

    /// 当前（或最终）状态
    pub fn state(&self) -> PipelineState {
        self.state.get()
    }

    fn enter(&self, state: PipelineState) {
        debug!(from = %self.state.get(), to = %state, "管道状态切换");
        self.state.set(state);
    }

    /// 执行一次完整入库
    ///
    /// # 返回
    /// - Ok(LoadSummary): 已提交
    /// - Err: 清洗阶段错误（未开启事务）或事务阶段的原始错误（已回滚）
    #[instrument(skip(self), fields(run_id))]
    pub fn run(&self) -> LoadResult<LoadSummary> {
        let start_time = Instant::now();
        let started_at = Utc::now();
        let run_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("run_id", run_id.as_str());
        info!(run_id = %run_id, "开始挂牌数据入库");

        // === 步骤 1: 读取数据源 ===
        self.enter(PipelineState::Loading);
        let sources = self.load_sources()?;

        // === 步骤 2: 列校验 ===
        self.enter(PipelineState::Validating);
        self.validator.validate_columns(&sources)?;

        // === 步骤 3: 清洗 ===
        self.enter(PipelineState::Cleaning);
        let cleaned = self.clean_sources(sources);

        // === 步骤 4: 事务内写入 ===
        self.enter(PipelineState::Transacting);
        let mut conn = db::connect(&self.config.database).map_err(|e| self.abort(e))?;
        let outcome = self.transact(&mut conn, &cleaned);
        db::release_connection(conn);
        let tables = outcome?;

        let summary = LoadSummary {
            run_id,
            started_at,
            elapsed_ms: start_time.elapsed().as_millis() as u64,
            tables,
        };

        info!(
            run_id = %summary.run_id,
            inserted = summary.total_inserted(),
            elapsed_ms = summary.elapsed_ms,
            "全部写入已提交"
        );
        match serde_json::to_string(&summary) {
            Ok(json) => info!(summary = %json, "入库汇总"),
            Err(e) => warn!(error = %e, "入库汇总序列化失败"),
        }

        Ok(summary)
    }

    fn load_sources(&self) -> LoadResult<Vec<(TableKind, Table)>> {
        let mut sources = Vec::with_capacity(TableKind::ALL.len());
        for kind in TableKind::ALL {
            let path = self.config.sources.get(kind);
            let table = self.reader.read(path).map_err(|e| {
                error!(table = %kind, path = %path.display(), error = %e, "数据源读取失败");
                e
            })?;
            info!(
                table = %kind,
                rows = table.len(),
                "Loaded {}: {} rows from {}",
                kind,
                table.len(),
                path.display()
            );
            sources.push((kind, table));
        }
        Ok(sources)
    }

    fn clean_sources(&self, sources: Vec<(TableKind, Table)>) -> Vec<CleanedTable> {
        let cleaned: Vec<CleanedTable> = sources
            .into_iter()
            .map(|(kind, table)| CleanedTable {
                kind,
                read_rows: table.len(),
                table: self.cleaner.clean(kind, table),
            })
            .collect();

        let counts = cleaned
            .iter()
            .map(|c| format!("{}={}", c.kind, c.table.len()))
            .collect::<Vec<_>>()
            .join(", ");
        info!("清洗后行数: {}", counts);

        cleaned
    }

    /// 单事务写入全部表；失败时回滚并返回原始错误
    fn transact(
        &self,
        conn: &mut Connection,
        cleaned: &[CleanedTable],
    ) -> LoadResult<Vec<TableLoadStats>> {
        let tx = conn
            .transaction()
            .map_err(|e| self.abort(LoadError::load_failure("transaction", e)))?;

        match self.load_all(&tx, cleaned) {
            Ok(stats) => match tx.commit() {
                Ok(()) => {
                    self.enter(PipelineState::Committed);
                    Ok(stats)
                }
                Err(e) => {
                    // commit 失败时连接关闭会丢弃未提交的写入
                    self.enter(PipelineState::RolledBack);
                    error!(error = %e, "事务提交失败");
                    Err(LoadError::load_failure("transaction", e))
                }
            },
            Err(err) => {
                error!(error = %err, "写入失败，回滚事务");
                match tx.rollback() {
                    Ok(()) => info!("事务已回滚"),
                    Err(rollback_err) => warn!(error = %rollback_err, "事务回滚失败"),
                }
                self.enter(PipelineState::RolledBack);
                Err(err)
            }
        }
    }

    /// 事务尚未开启时失败：无需回滚，直接进入终态
    fn abort(&self, err: LoadError) -> LoadError {
        error!(error = %err, "事务未开启，无需回滚");
        self.enter(PipelineState::RolledBack);
        err
    }

    fn load_all(
        &self,
        conn: &Connection,
        cleaned: &[CleanedTable],
    ) -> LoadResult<Vec<TableLoadStats>> {
        let loader = BatchLoader::new(self.config.database.schema.as_str(), self.config.batch_size);
        let kinds: Vec<TableKind> = cleaned.iter().map(|c| c.kind).collect();

        let mut stats = Vec::with_capacity(cleaned.len());
        for kind in load_order(&kinds) {
            let Some(entry) = cleaned.iter().find(|c| c.kind == kind) else {
                continue;
            };
            let columns = kind.load_columns();
            let rows = materialize(kind.table_name(), &entry.table, columns)?;
            let outcome = loader.insert_batches(conn, kind.table_name(), columns, &rows)?;

            stats.push(TableLoadStats {
                table: kind,
                read_rows: entry.read_rows,
                cleaned_rows: entry.table.len(),
                inserted_rows: outcome.inserted,
                chunks: outcome.chunks,
            });
        }
        Ok(stats)
    }
}
