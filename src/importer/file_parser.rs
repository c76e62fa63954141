// ==========================================
// 零售预算预测系统 - 文件解析器实现
// ==========================================
// 阶段 0: 文件读取与解析
// 支持: Excel (.xlsx/.xls) / CSV (.csv)
// 输出: 原始表 (表头 + 行), 重名表头按出现次序加 ".1" / ".2" 后缀
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use calamine::{open_workbook_auto, Reader};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

// ==========================================
// 原始表结构
// ==========================================

/// 原始数据行
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    /// 源文件中的行号 (1 起, 与表格软件一致)
    pub row_number: usize,
    pub values: HashMap<String, String>,
}

impl RawRow {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.values.get(column).map(|v| v.as_str())
    }
}

/// 原始表
#[derive(Debug, Clone, Default)]
pub struct RawSheet {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl RawSheet {
    pub fn has_column(&self, column: &str) -> bool {
        self.headers.iter().any(|h| h == column)
    }
}

/// 解析选项
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// 工作表名称 (仅 Excel; 不存在时回退到第一个工作表)
    pub sheet_name: Option<String>,
    /// 表头所在行 (0 起)
    pub header_row: usize,
}

// ==========================================
// FileParser Trait
// ==========================================
// 实现者: CsvParser, ExcelParser
pub trait FileParser: Send + Sync {
    fn parse_to_raw_sheet(&self, file_path: &Path, options: &ParseOptions) -> ImportResult<RawSheet>;
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse_to_raw_sheet(&self, file_path: &Path, options: &ParseOptions) -> ImportResult<RawSheet> {
        let path = file_path;

        // 检查文件存在
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        // 检查扩展名
        if let Some(ext) = path.extension() {
            if !ext.eq_ignore_ascii_case("csv") {
                return Err(ImportError::UnsupportedFormat(
                    ext.to_string_lossy().to_string(),
                ));
            }
        }

        let file = File::open(path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(false) // 表头行由 header_row 决定
            .flexible(true) // 允许行长度不一致
            .from_reader(file);

        let mut lines: Vec<(usize, Vec<String>)> = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            let record = result?;
            let cells = record.iter().map(|v| v.trim().to_string()).collect();
            lines.push((idx + 1, cells));
        }

        build_sheet(lines, options.header_row)
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn parse_to_raw_sheet(&self, file_path: &Path, options: &ParseOptions) -> ImportResult<RawSheet> {
        let path = file_path;

        // 检查文件存在
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        // 检查扩展名
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        if ext != "xlsx" && ext != "xls" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let mut workbook = open_workbook_auto(path)?;

        let sheet_names = workbook.sheet_names().to_vec();
        if sheet_names.is_empty() {
            return Err(ImportError::ExcelParseError("Excel 文件无工作表".to_string()));
        }

        // 优先使用指定工作表, 否则取第一个
        let sheet_name = match &options.sheet_name {
            Some(name) if sheet_names.iter().any(|s| s == name) => name.clone(),
            Some(name) => {
                tracing::warn!(
                    requested = %name,
                    fallback = %sheet_names[0],
                    "指定工作表不存在, 回退到第一个工作表"
                );
                sheet_names[0].clone()
            }
            None => sheet_names[0].clone(),
        };

        let range = workbook.worksheet_range(&sheet_name)?;

        // Range 从首个非空单元格开始, 行号需加上偏移
        let row_offset = range.start().map(|(row, _)| row as usize).unwrap_or(0);

        let lines: Vec<(usize, Vec<String>)> = range
            .rows()
            .enumerate()
            .map(|(idx, row)| {
                let cells = row
                    .iter()
                    .map(|cell| cell.to_string().trim().to_string())
                    .collect();
                (row_offset + idx + 1, cells)
            })
            .collect();

        build_sheet(lines, options.header_row.saturating_sub(row_offset))
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl UniversalFileParser {
    pub fn parse<P: AsRef<Path>>(&self, file_path: P, options: &ParseOptions) -> ImportResult<RawSheet> {
        let path = file_path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "csv" => CsvParser.parse_to_raw_sheet(path, options),
            "xlsx" | "xls" => ExcelParser.parse_to_raw_sheet(path, options),
            _ => Err(ImportError::UnsupportedFormat(ext)),
        }
    }
}

// ==========================================
// 内部工具
// ==========================================

/// 由 (行号, 单元格) 列表构造原始表
fn build_sheet(lines: Vec<(usize, Vec<String>)>, header_row: usize) -> ImportResult<RawSheet> {
    let mut iter = lines.into_iter().skip(header_row);

    let (_, header_cells) = iter
        .next()
        .ok_or_else(|| ImportError::FileReadError(format!("文件不足 {} 行, 找不到表头", header_row + 1)))?;

    let headers = dedupe_headers(&header_cells);

    let mut rows = Vec::new();
    for (row_number, cells) in iter {
        let mut values = HashMap::new();
        for (col_idx, value) in cells.into_iter().enumerate() {
            if let Some(header) = headers.get(col_idx) {
                values.insert(header.clone(), value);
            }
        }

        // 跳过完全空白的行
        if values.values().all(|v| v.is_empty()) {
            continue;
        }

        rows.push(RawRow { row_number, values });
    }

    Ok(RawSheet { headers, rows })
}

/// 重名表头去重: 第二次出现加 ".1", 第三次加 ".2", 空表头命名为 "Unnamed: {列号}"
pub fn dedupe_headers(raw: &[String]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    raw.iter()
        .enumerate()
        .map(|(idx, name)| {
            let base = name.trim().trim_start_matches('\u{feff}');
            let base = if base.is_empty() {
                format!("Unnamed: {}", idx)
            } else {
                base.to_string()
            };

            let count = seen.entry(base.clone()).or_insert(0);
            let header = if *count == 0 {
                base
            } else {
                format!("{}.{}", base, count)
            };
            *count += 1;
            header
        })
        .collect()
}
