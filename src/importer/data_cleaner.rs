// ==========================================
// 二手车挂牌数据入库 - 数据清洗器实现
// ==========================================
// 职责: 六张表的清洗规则（去重 / 主键转换 / 值域校验 / TRIM / 布尔映射）
// 红线: 单个字段非法只置为缺失，不阻断整行，不做截断或默认值
// ==========================================

use crate::domain::table::{CellValue, Table};
use crate::domain::types::{TableKind, KEY_COLUMN};
use crate::importer::conflict_handler::ConflictHandler;
use crate::importer::scalar_normalizer::{to_flag, to_integer, to_number, to_text};
use chrono::Datelike;
use std::collections::HashSet;
use tracing::{debug, info};

/// 年份下限（含）
pub const MIN_YEAR: i64 = 1950;

pub struct DataCleaner {
    current_year: i64,
    conflict_handler: ConflictHandler,
}

impl Default for DataCleaner {
    fn default() -> Self {
        Self::new()
    }
}

impl DataCleaner {
    /// 以本地时钟的当前年份作为年份上限
    pub fn new() -> Self {
        Self::with_current_year(i64::from(chrono::Local::now().year()))
    }

    /// 固定年份上限（测试与重放使用）
    pub fn with_current_year(current_year: i64) -> Self {
        Self {
            current_year,
            conflict_handler: ConflictHandler,
        }
    }

    /// 按表类型分发清洗
    pub fn clean(&self, kind: TableKind, table: Table) -> Table {
        let cleaned = match kind {
            TableKind::Core => self.clean_core(table),
            TableKind::Pricing => self.clean_pricing(table),
            TableKind::Vehicle => self.clean_vehicle(table),
            TableKind::Specs => self.clean_specs(table),
            TableKind::Appearance => self.clean_appearance(table),
            TableKind::Status => self.clean_status(table),
        };
        info!(table = %kind, rows = cleaned.len(), "清洗完成");
        cleaned
    }

    /// core: 主键 + url 必填
    pub fn clean_core(&self, mut table: Table) -> Table {
        self.prepare_key(&mut table);
        table.map_column("url", clean_text);
        drop_missing(&mut table, TableKind::Core.required_fields());
        table
    }

    /// pricing: price >= 0, year ∈ [1950, 当前年], mileage >= 0
    pub fn clean_pricing(&self, mut table: Table) -> Table {
        self.prepare_key(&mut table);

        table.map_column("price", |v| {
            to_number(v).filter(|price| *price >= 0.0).into()
        });

        let current_year = self.current_year;
        table.map_column("year", |v| {
            to_integer(v)
                .filter(|year| (MIN_YEAR..=current_year).contains(year))
                .into()
        });

        table.map_column("mileage", |v| {
            to_integer(v).filter(|mileage| *mileage >= 0).into()
        });

        drop_missing(&mut table, TableKind::Pricing.required_fields());
        table
    }

    /// vehicle: make / model TRIM
    pub fn clean_vehicle(&self, mut table: Table) -> Table {
        self.prepare_key(&mut table);
        for column in ["make", "model"] {
            table.map_column(column, clean_text);
        }
        drop_missing(&mut table, TableKind::Vehicle.required_fields());
        table
    }

    /// specs: engine_size / wheel_size > 0，其余文本 TRIM
    pub fn clean_specs(&self, mut table: Table) -> Table {
        self.prepare_key(&mut table);

        for column in ["engine_size", "wheel_size"] {
            table.map_column(column, positive_number);
        }

        for column in [
            "engine_type",
            "transmission",
            "drive_type",
            "steering_wheel",
            "comfort",
        ] {
            table.map_column(column, clean_text);
        }

        drop_missing(&mut table, TableKind::Specs.required_fields());
        table
    }

    /// appearance: 文本 TRIM，sunroof 三态布尔
    pub fn clean_appearance(&self, mut table: Table) -> Table {
        self.prepare_key(&mut table);
        for column in ["body_type", "color", "interior_material"] {
            table.map_column(column, clean_text);
        }
        table.map_column("sunroof", clean_flag);
        drop_missing(&mut table, TableKind::Appearance.required_fields());
        table
    }

    /// status: cleared_customs 三态布尔，condition TRIM
    pub fn clean_status(&self, mut table: Table) -> Table {
        self.prepare_key(&mut table);
        table.map_column("cleared_customs", clean_flag);
        table.map_column("condition", clean_text);
        drop_missing(&mut table, TableKind::Status.required_fields());
        table
    }

    /// 主键转换为整数并按主键去重（保留首次出现）
    ///
    /// 按转换后的主键判重，"7" 与 "7.0" 视为同一主键
    fn prepare_key(&self, table: &mut Table) {
        if !table.map_column(KEY_COLUMN, |v| to_integer(v).into()) {
            return;
        }

        let keys: Vec<Option<i64>> = table
            .column_values(KEY_COLUMN)
            .unwrap_or_default()
            .into_iter()
            .map(|v| match v {
                CellValue::Int(id) => Some(*id),
                _ => None,
            })
            .collect();

        let duplicates = self.conflict_handler.detect_duplicates(&keys);
        if duplicates.is_empty() {
            return;
        }

        debug!(duplicates = duplicates.len(), "丢弃重复主键行");
        let duplicate_rows: HashSet<usize> = duplicates.into_iter().map(|(pos, _)| pos).collect();
        table.retain_rows(|pos, _| !duplicate_rows.contains(&pos));
    }
}

fn clean_text(value: &CellValue) -> CellValue {
    to_text(value).into()
}

fn clean_flag(value: &CellValue) -> CellValue {
    to_flag(value).into()
}

fn positive_number(value: &CellValue) -> CellValue {
    to_number(value).filter(|v| *v > 0.0).into()
}

/// 丢弃必填列缺失的行；必填列本身不存在时丢弃全部行
fn drop_missing(table: &mut Table, required: &[&str]) {
    let indices: Option<Vec<usize>> = required.iter().map(|c| table.column_index(c)).collect();
    let before = table.len();

    match indices {
        Some(indices) => table.retain_rows(|_, row| indices.iter().all(|&i| !row[i].is_null())),
        None => table.retain_rows(|_, _| false),
    }

    let dropped = before - table.len();
    if dropped > 0 {
        debug!(dropped = dropped, required = ?required, "丢弃必填字段缺失行");
    }
}
