// ==========================================
// 二手车挂牌数据入库 - 内存表结构
// ==========================================
// 职责: 数据源读入后的行列结构，供清洗与物化使用
// ==========================================

use std::fmt;

// ==========================================
// CellValue - 单元格值
// ==========================================
// Null 即“缺失”，与 0 / 空串 / false 区分
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// 便于构造测试数据
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => write!(f, "<NA>"),
            CellValue::Int(v) => write!(f, "{}", v),
            CellValue::Float(v) => write!(f, "{}", v),
            CellValue::Text(v) => write!(f, "{}", v),
            CellValue::Bool(v) => write!(f, "{}", v),
        }
    }
}

impl From<Option<i64>> for CellValue {
    fn from(value: Option<i64>) -> Self {
        value.map_or(CellValue::Null, CellValue::Int)
    }
}

impl From<Option<f64>> for CellValue {
    fn from(value: Option<f64>) -> Self {
        value.map_or(CellValue::Null, CellValue::Float)
    }
}

impl From<Option<String>> for CellValue {
    fn from(value: Option<String>) -> Self {
        value.map_or(CellValue::Null, CellValue::Text)
    }
}

impl From<Option<bool>> for CellValue {
    fn from(value: Option<bool>) -> Self {
        value.map_or(CellValue::Null, CellValue::Bool)
    }
}

// ==========================================
// Table - 具名列 + 行
// ==========================================
// 每行长度恒等于列数（不足补 Null，多余截断）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn with_rows(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let mut table = Self::new(columns);
        for row in rows {
            table.push_row(row);
        }
        table
    }

    pub fn push_row(&mut self, mut row: Vec<CellValue>) {
        row.resize(self.columns.len(), CellValue::Null);
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn value(&self, row: usize, column: &str) -> Option<&CellValue> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[idx])
    }

    /// 返回整列的值；列不存在时返回 None
    pub fn column_values(&self, name: &str) -> Option<Vec<&CellValue>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|r| &r[idx]).collect())
    }

    /// 原地改写一列
    ///
    /// # 返回
    /// - true: 列存在并已改写
    /// - false: 列不存在，表保持不变
    pub fn map_column<F>(&mut self, name: &str, mut f: F) -> bool
    where
        F: FnMut(&CellValue) -> CellValue,
    {
        let Some(idx) = self.column_index(name) else {
            return false;
        };
        for row in &mut self.rows {
            row[idx] = f(&row[idx]);
        }
        true
    }

    /// 按行号保留（行号为当前表内位置）
    pub fn retain_rows<F>(&mut self, mut keep: F)
    where
        F: FnMut(usize, &[CellValue]) -> bool,
    {
        let mut idx = 0;
        self.rows.retain(|row| {
            let keep_row = keep(idx, row);
            idx += 1;
            keep_row
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::with_rows(
            vec!["listing_id".to_string(), "url".to_string()],
            vec![
                vec![CellValue::text("1"), CellValue::text("a")],
                vec![CellValue::text("2")],
            ],
        )
    }

    #[test]
    fn test_short_rows_are_padded() {
        let table = sample();
        assert_eq!(table.len(), 2);
        assert_eq!(table.value(1, "url"), Some(&CellValue::Null));
    }

    #[test]
    fn test_map_column_missing_is_noop() {
        let mut table = sample();
        let before = table.clone();
        assert!(!table.map_column("price", |_| CellValue::Null));
        assert_eq!(table, before);
    }

    #[test]
    fn test_retain_rows_by_position() {
        let mut table = sample();
        table.retain_rows(|idx, _| idx != 0);
        assert_eq!(table.len(), 1);
        assert_eq!(table.value(0, "listing_id"), Some(&CellValue::text("2")));
    }
}
