// ==========================================
// 二手车挂牌数据入库 - 行物化
// ==========================================
// 职责: 清洗后的表 → 按列顺序排列的绑定参数元组
// ==========================================

use crate::domain::table::Table;
use crate::importer::error::{LoadError, LoadResult};
use crate::importer::scalar_normalizer::to_sql_value;
use rusqlite::types::Value;

/// 一行绑定参数（长度等于列数）
pub type ParamRow = Vec<Value>;

/// 按列顺序物化所有行
///
/// # 返回
/// - Ok(Vec<ParamRow>): 保持原行序
/// - Err(SchemaMismatch): 请求的列不在表中
pub fn materialize(
    table_name: &str,
    table: &Table,
    columns: &[&str],
) -> LoadResult<Vec<ParamRow>> {
    let mut indices = Vec::with_capacity(columns.len());
    let mut missing = Vec::new();
    for column in columns {
        match table.column_index(column) {
            Some(idx) => indices.push(idx),
            None => missing.push(column.to_string()),
        }
    }

    if !missing.is_empty() {
        return Err(LoadError::schema_mismatch(table_name, missing));
    }

    Ok(table
        .rows()
        .iter()
        .map(|row| indices.iter().map(|&i| to_sql_value(&row[i])).collect())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::table::CellValue;

    fn sample() -> Table {
        Table::with_rows(
            vec![
                "sunroof".to_string(),
                "listing_id".to_string(),
                "color".to_string(),
            ],
            vec![
                vec![CellValue::Bool(true), CellValue::Int(2), CellValue::text("Red")],
                vec![CellValue::Null, CellValue::Int(1), CellValue::Float(f64::NAN)],
            ],
        )
    }

    #[test]
    fn test_materialize_follows_column_order() {
        let rows =
            materialize("appearance", &sample(), &["listing_id", "color", "sunroof"]).unwrap();

        assert_eq!(
            rows,
            vec![
                vec![
                    Value::Integer(2),
                    Value::Text("Red".to_string()),
                    Value::Integer(1)
                ],
                vec![Value::Integer(1), Value::Null, Value::Null],
            ]
        );
    }

    #[test]
    fn test_materialize_missing_column() {
        let err = materialize("appearance", &sample(), &["listing_id", "body_type"]).unwrap_err();
        match err {
            LoadError::SchemaMismatch { missing } => {
                assert_eq!(missing[0].table, "appearance");
                assert_eq!(missing[0].columns, vec!["body_type".to_string()]);
            }
            other => panic!("期望 SchemaMismatch，实际: {:?}", other),
        }
    }

    #[test]
    fn test_materialize_empty_table() {
        let table = Table::new(vec!["listing_id".to_string()]);
        assert!(materialize("core", &table, &["listing_id"]).unwrap().is_empty());
    }
}
