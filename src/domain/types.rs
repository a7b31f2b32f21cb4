// ==========================================
// 二手车挂牌数据入库 - 领域类型定义
// ==========================================
// 职责: 六张挂牌表的表名、入库列、必填列、父子关系
// 红线: 子表必须在父表之后写入
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

/// 六张表共享的主键列
pub const KEY_COLUMN: &str = "listing_id";

// ==========================================
// 挂牌表类型 (Table Kind)
// ==========================================
// core 为父表，其余五张为一对一子表
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    Core,       // 挂牌主表
    Pricing,    // 价格/年份/里程
    Vehicle,    // 品牌/车型
    Specs,      // 技术参数
    Appearance, // 外观
    Status,     // 清关与车况
}

impl TableKind {
    /// 全部表（声明顺序，不保证是写入顺序，写入顺序见 [`load_order`]）
    pub const ALL: [TableKind; 6] = [
        TableKind::Core,
        TableKind::Pricing,
        TableKind::Vehicle,
        TableKind::Specs,
        TableKind::Appearance,
        TableKind::Status,
    ];

    /// 目标库中的表名（同时也是数据源文件的默认文件名）
    pub fn table_name(self) -> &'static str {
        match self {
            TableKind::Core => "core",
            TableKind::Pricing => "pricing",
            TableKind::Vehicle => "vehicle",
            TableKind::Specs => "specs",
            TableKind::Appearance => "appearance",
            TableKind::Status => "status",
        }
    }

    /// 外键指向的父表
    pub fn parent(self) -> Option<TableKind> {
        match self {
            TableKind::Core => None,
            _ => Some(TableKind::Core),
        }
    }

    /// 入库列（按 INSERT 列顺序）
    pub fn load_columns(self) -> &'static [&'static str] {
        match self {
            TableKind::Core => &["listing_id", "url"],
            TableKind::Pricing => &["listing_id", "price", "year", "mileage"],
            TableKind::Vehicle => &["listing_id", "make", "model"],
            TableKind::Specs => &[
                "listing_id",
                "engine_size",
                "engine_type",
                "transmission",
                "drive_type",
                "steering_wheel",
                "wheel_size",
                "comfort",
            ],
            TableKind::Appearance => &[
                "listing_id",
                "body_type",
                "color",
                "interior_material",
                "sunroof",
            ],
            TableKind::Status => &["listing_id", "cleared_customs", "condition"],
        }
    }

    /// 清洗后不允许为空的列
    pub fn required_fields(self) -> &'static [&'static str] {
        match self {
            TableKind::Core => &["listing_id", "url"],
            _ => &["listing_id"],
        }
    }

    /// 父表链深度（core = 0）
    fn depth(self) -> usize {
        let mut depth = 0;
        let mut current = self.parent();
        while let Some(parent) = current {
            depth += 1;
            current = parent.parent();
        }
        depth
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.table_name())
    }
}

/// 按父子关系排定写入顺序
///
/// 父表总在子表之前；同一深度的表保持传入顺序。
pub fn load_order(kinds: &[TableKind]) -> Vec<TableKind> {
    let mut ordered = kinds.to_vec();
    ordered.sort_by_key(|kind| kind.depth());
    ordered
}

// ==========================================
// 管道状态 (Pipeline State)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Loading,     // 读取数据源
    Validating,  // 校验列
    Cleaning,    // 清洗
    Transacting, // 事务内写入
    Committed,   // 已提交（终态）
    RolledBack,  // 已回滚（终态）
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineState::Loading => write!(f, "LOADING"),
            PipelineState::Validating => write!(f, "VALIDATING"),
            PipelineState::Cleaning => write!(f, "CLEANING"),
            PipelineState::Transacting => write!(f, "TRANSACTING"),
            PipelineState::Committed => write!(f, "COMMITTED"),
            PipelineState::RolledBack => write!(f, "ROLLED_BACK"),
        }
    }
}
