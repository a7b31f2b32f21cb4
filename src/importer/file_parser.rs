// ==========================================
// 二手车挂牌数据入库 - 数据源读取实现
// ==========================================
// 支持: CSV (.csv) / Excel (.xlsx/.xls/.xlsm/.ods)
// 输出: 具名列 + 原始单元格（不做清洗）
// ==========================================

use crate::domain::table::{CellValue, Table};
use crate::importer::error::{LoadError, LoadResult};
use calamine::{open_workbook_auto, Data, Reader};
use csv::ReaderBuilder;
use std::fs::File;
use std::path::Path;

/// CSV 中按缺失处理的记号
const NA_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

// ==========================================
// SourceReader Trait
// ==========================================
pub trait SourceReader {
    /// 读取数据源为内存表
    ///
    /// # 返回
    /// - Ok(Table): 表头 + 原始行
    /// - Err(SourceNotFound): 路径不存在
    /// - Err(SourceRead / UnsupportedFormat): 读取或格式错误
    fn read(&self, path: &Path) -> LoadResult<Table>;
}

fn ensure_exists(path: &Path) -> LoadResult<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(LoadError::SourceNotFound(path.display().to_string()))
    }
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

fn csv_cell(raw: &str) -> CellValue {
    if NA_TOKENS.contains(&raw.trim()) {
        CellValue::Null
    } else {
        CellValue::Text(raw.to_string())
    }
}

fn excel_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty | Data::Error(_) => CellValue::Null,
        Data::Int(v) => CellValue::Int(*v),
        Data::Float(v) => CellValue::Float(*v),
        Data::Bool(v) => CellValue::Bool(*v),
        Data::String(s) => csv_cell(s),
        other => CellValue::Text(other.to_string()),
    }
}

// ==========================================
// CSV Reader 实现
// ==========================================
pub struct CsvSourceReader;

impl SourceReader for CsvSourceReader {
    fn read(&self, path: &Path) -> LoadResult<Table> {
        ensure_exists(path)?;

        let file = File::open(path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(file);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().trim_start_matches('\u{feff}').to_string())
            .collect();

        let mut table = Table::new(headers);
        for result in reader.records() {
            let record = result?;
            let row: Vec<CellValue> = record.iter().map(csv_cell).collect();

            // 跳过完全空白的行
            if row.iter().all(CellValue::is_null) {
                continue;
            }

            table.push_row(row);
        }

        Ok(table)
    }
}

// ==========================================
// Excel Reader 实现（读取第一个工作表）
// ==========================================
pub struct ExcelSourceReader;

impl SourceReader for ExcelSourceReader {
    fn read(&self, path: &Path) -> LoadResult<Table> {
        ensure_exists(path)?;

        let mut workbook = open_workbook_auto(path)?;
        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| LoadError::SourceRead("Excel 文件无工作表".to_string()))?;
        let range = workbook.worksheet_range(&sheet_name)?;

        let mut rows = range.rows();
        let header_row = rows
            .next()
            .ok_or_else(|| LoadError::SourceRead("Excel 文件无表头行".to_string()))?;
        let headers: Vec<String> = header_row
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect();

        let mut table = Table::new(headers);
        for data_row in rows {
            let row: Vec<CellValue> = data_row.iter().map(excel_cell).collect();
            if row.iter().all(CellValue::is_null) {
                continue;
            }
            table.push_row(row);
        }

        Ok(table)
    }
}

// ==========================================
// 通用数据源读取器（根据扩展名自动选择）
// ==========================================
pub struct UniversalSourceReader;

impl SourceReader for UniversalSourceReader {
    fn read(&self, path: &Path) -> LoadResult<Table> {
        ensure_exists(path)?;

        match extension_of(path).as_str() {
            "csv" => CsvSourceReader.read(path),
            "xlsx" | "xls" | "xlsm" | "ods" => ExcelSourceReader.read(path),
            other => Err(LoadError::UnsupportedFormat(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    fn csv_file(lines: &[&str]) -> tempfile::NamedTempFile {
        let mut temp_file = Builder::new().suffix(".csv").tempfile().unwrap();
        for line in lines {
            writeln!(temp_file, "{}", line).unwrap();
        }
        temp_file.flush().unwrap();
        temp_file
    }

    #[test]
    fn test_csv_reader_valid_file() {
        let temp_file = csv_file(&["listing_id, url", "1,https://a", "2,https://b"]);

        let table = CsvSourceReader.read(temp_file.path()).unwrap();

        assert_eq!(table.columns(), &["listing_id".to_string(), "url".to_string()]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.value(0, "url"), Some(&CellValue::text("https://a")));
    }

    #[test]
    fn test_csv_reader_na_tokens() {
        let temp_file = csv_file(&["listing_id,price,color", "1,NA,", "2,  ,null", "3,100,Red"]);

        let table = CsvSourceReader.read(temp_file.path()).unwrap();

        assert_eq!(table.value(0, "price"), Some(&CellValue::Null));
        assert_eq!(table.value(0, "color"), Some(&CellValue::Null));
        assert_eq!(table.value(1, "price"), Some(&CellValue::Null));
        assert_eq!(table.value(1, "color"), Some(&CellValue::Null));
        assert_eq!(table.value(2, "price"), Some(&CellValue::text("100")));
    }

    #[test]
    fn test_csv_reader_skip_blank_rows() {
        let temp_file = csv_file(&["listing_id,url", "1,a", ",", "2,b"]);

        let table = CsvSourceReader.read(temp_file.path()).unwrap();

        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_csv_reader_short_rows_padded() {
        let temp_file = csv_file(&["listing_id,make,model", "1,BMW"]);

        let table = CsvSourceReader.read(temp_file.path()).unwrap();

        assert_eq!(table.value(0, "model"), Some(&CellValue::Null));
    }

    #[test]
    fn test_reader_file_not_found() {
        let err = UniversalSourceReader
            .read(Path::new("non_existent_dir/core.csv"))
            .unwrap_err();
        assert!(matches!(err, LoadError::SourceNotFound(_)));
    }

    #[test]
    fn test_reader_unsupported_format() {
        let temp_file = Builder::new().suffix(".json").tempfile().unwrap();
        let err = UniversalSourceReader.read(temp_file.path()).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedFormat(ref ext) if ext == "json"));
    }

    fn fixture(name: &str) -> std::path::PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("fixtures")
            .join(name)
    }

    #[test]
    fn test_excel_reader_first_sheet() {
        let table = ExcelSourceReader.read(&fixture("appearance.xlsx")).unwrap();

        assert_eq!(
            table.columns(),
            &["listing_id".to_string(), "color".to_string(), "sunroof".to_string()]
        );
        // 第 4 行整行空白被跳过
        assert_eq!(table.len(), 3);

        assert_eq!(table.value(0, "listing_id"), Some(&CellValue::Float(1.0)));
        assert_eq!(table.value(0, "color"), Some(&CellValue::text("Black")));
        assert_eq!(table.value(0, "sunroof"), Some(&CellValue::Bool(true)));

        assert_eq!(table.value(1, "color"), Some(&CellValue::Null));
        assert_eq!(table.value(1, "sunroof"), Some(&CellValue::Bool(false)));

        assert_eq!(table.value(2, "listing_id"), Some(&CellValue::Float(3.0)));
        assert_eq!(table.value(2, "color"), Some(&CellValue::text(" White ")));
        assert_eq!(table.value(2, "sunroof"), Some(&CellValue::Null));
    }

    #[test]
    fn test_universal_reader_dispatches_xlsx() {
        let table = UniversalSourceReader
            .read(&fixture("appearance.xlsx"))
            .unwrap();
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_excel_cell_mapping() {
        assert_eq!(excel_cell(&Data::Empty), CellValue::Null);
        assert_eq!(excel_cell(&Data::Int(3)), CellValue::Int(3));
        assert_eq!(excel_cell(&Data::Float(1.5)), CellValue::Float(1.5));
        assert_eq!(excel_cell(&Data::Bool(true)), CellValue::Bool(true));
        assert_eq!(excel_cell(&Data::String("N/A".to_string())), CellValue::Null);
        assert_eq!(excel_cell(&Data::String("BMW".to_string())), CellValue::text("BMW"));
    }
}
