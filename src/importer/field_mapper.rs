// ==========================================
// 零售预算预测系统 - 字段映射器实现
// ==========================================
// 职责: 表头校验 + 双年度列 → 统一结构 (带 year 标识) + 类型转换
// 红线: 年度后缀列名只在本模块出现, 下游只看到 year 字段
// ==========================================

use crate::config::{SourceSchema, YearColumns};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::{RawRow, RawSheet};

/// 映射后的源记录 (尚未清洗)
#[derive(Debug, Clone, PartialEq)]
pub struct MappedRow {
    pub row_number: usize,
    pub year: i32,
    /// 月份原始文本 (可能含小计标记)
    pub month_raw: Option<String>,
    pub main_group: Option<String>,
    pub sales: Option<f64>,
    pub gross_profit: Option<f64>,
    pub gross_margin_pct: Option<f64>,
    pub stock: Option<f64>,
}

pub struct FieldMapper<'a> {
    schema: &'a SourceSchema,
}

impl<'a> FieldMapper<'a> {
    pub fn new(schema: &'a SourceSchema) -> Self {
        Self { schema }
    }

    /// 校验表头是否包含全部必需列
    pub fn check_schema(&self, sheet: &RawSheet) -> ImportResult<()> {
        let missing: Vec<String> = self
            .schema
            .required_columns()
            .into_iter()
            .filter(|column| !sheet.has_column(column))
            .map(|column| column.to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ImportError::SchemaError { missing })
        }
    }

    /// 将原始行映射为两年记录 (先第一年, 后第二年)
    ///
    /// 调用方需先完成表头校验并剔除小计行
    pub fn map_rows(&self, rows: &[RawRow]) -> ImportResult<Vec<MappedRow>> {
        let mut mapped = Vec::with_capacity(rows.len() * 2);
        for columns in self.schema.years() {
            for row in rows {
                mapped.push(self.map_row(row, columns)?);
            }
        }
        Ok(mapped)
    }

    fn map_row(&self, row: &RawRow, columns: &YearColumns) -> ImportResult<MappedRow> {
        Ok(MappedRow {
            row_number: row.row_number,
            year: columns.year,
            month_raw: self.get_string(row, &self.schema.month_column),
            main_group: self.get_string(row, &self.schema.group_column),
            sales: self.parse_f64(row, &columns.sales)?,
            gross_profit: self.parse_f64(row, &columns.gross_profit)?,
            gross_margin_pct: self.parse_f64(row, &columns.gross_margin)?,
            stock: self.parse_f64(row, &columns.stock)?,
        })
    }

    /// 提取字符串字段 (空白视为缺失)
    fn get_string(&self, row: &RawRow, key: &str) -> Option<String> {
        row.get(key)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    /// 解析浮点数
    ///
    /// 兼容 CSV 导出的 "12.5%" 形式 (按百分数除以 100)
    fn parse_f64(&self, row: &RawRow, key: &str) -> ImportResult<Option<f64>> {
        let value = match self.get_string(row, key) {
            None => return Ok(None),
            Some(v) => v,
        };

        let conversion_error = || ImportError::TypeConversionError {
            row: row.row_number,
            field: key.to_string(),
            message: format!("无法解析为浮点数: {}", value),
        };

        if let Some(pct) = value.strip_suffix('%') {
            return pct
                .trim()
                .parse::<f64>()
                .map(|v| Some(v / 100.0))
                .map_err(|_| conversion_error());
        }

        match value.parse::<f64>() {
            Ok(v) if v.is_nan() => Ok(None),
            Ok(v) => Ok(Some(v)),
            Err(_) => Err(conversion_error()),
        }
    }
}
