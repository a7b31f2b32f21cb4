// ==========================================
// 二手车挂牌数据入库 - 标量标准化
// ==========================================
// 职责: 单元格 → 规范基础类型 或 缺失
// 红线: 绑定到数据库的参数只能是 Null/Integer/Real/Text
// ==========================================

use crate::domain::table::CellValue;
use rusqlite::types::Value;

/// 单元格标准化：非有限浮点数视为缺失，空白文本视为缺失
pub fn normalize(value: &CellValue) -> CellValue {
    match value {
        CellValue::Float(v) if !v.is_finite() => CellValue::Null,
        CellValue::Text(s) if s.trim().is_empty() => CellValue::Null,
        other => other.clone(),
    }
}

/// 单元格 → 绑定参数
///
/// 布尔值按 0/1 绑定（SQLite 无独立布尔类型）
pub fn to_sql_value(value: &CellValue) -> Value {
    match normalize(value) {
        CellValue::Null => Value::Null,
        CellValue::Int(v) => Value::Integer(v),
        CellValue::Float(v) => Value::Real(v),
        CellValue::Text(s) => Value::Text(s),
        CellValue::Bool(b) => Value::Integer(i64::from(b)),
    }
}

/// 整数转换
///
/// - 文本按整数解析，失败时按浮点解析且要求无小数部分
/// - 带小数的值视为缺失（不截断）
pub fn to_integer(value: &CellValue) -> Option<i64> {
    match value {
        CellValue::Int(v) => Some(*v),
        CellValue::Float(v) => integral_float(*v),
        CellValue::Bool(b) => Some(i64::from(*b)),
        CellValue::Text(s) => {
            let trimmed = s.trim();
            trimmed
                .parse::<i64>()
                .ok()
                .or_else(|| trimmed.parse::<f64>().ok().and_then(integral_float))
        }
        CellValue::Null => None,
    }
}

fn integral_float(v: f64) -> Option<i64> {
    // i64::MAX as f64 向上取整到 2^63，需用开区间
    if v.is_finite() && v.fract() == 0.0 && v >= i64::MIN as f64 && v < i64::MAX as f64 {
        Some(v as i64)
    } else {
        None
    }
}

/// 数值转换（仅有限值）
pub fn to_number(value: &CellValue) -> Option<f64> {
    let number = match value {
        CellValue::Int(v) => Some(*v as f64),
        CellValue::Float(v) => Some(*v),
        CellValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        CellValue::Text(s) => s.trim().parse::<f64>().ok(),
        CellValue::Null => None,
    };
    number.filter(|v| v.is_finite())
}

/// 文本转换（TRIM，空串视为缺失）
pub fn to_text(value: &CellValue) -> Option<String> {
    match normalize(value) {
        CellValue::Null => None,
        CellValue::Text(s) => Some(s.trim().to_string()),
        other => Some(other.to_string()),
    }
}

/// 三态布尔转换
///
/// {"true","1","yes"} → true, {"false","0","no"} → false, 其余 → 缺失
pub fn to_flag(value: &CellValue) -> Option<bool> {
    match value {
        CellValue::Bool(b) => Some(*b),
        CellValue::Int(1) => Some(true),
        CellValue::Int(0) => Some(false),
        CellValue::Float(v) if *v == 1.0 => Some(true),
        CellValue::Float(v) if *v == 0.0 => Some(false),
        CellValue::Text(s) => match s.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" => Some(true),
            "false" | "0" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    }
}
