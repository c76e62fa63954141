// ==========================================
// 零售预算预测系统 - 数据清洗器实现
// ==========================================
// 职责: 小计行剔除 / 月份标准化 / 空主品类剔除 / 缺失数值补 0
// 顺序: 小计行剔除必须先于其他任何处理
// ==========================================

use crate::domain::{HistoricalRecord, LoadNotice, RecordSource};
use crate::importer::field_mapper::MappedRow;
use crate::importer::file_parser::RawRow;

pub struct DataCleaner<'a> {
    month_column: &'a str,
    subtotal_marker: String,
}

/// 清洗结果
#[derive(Debug, Clone, Default)]
pub struct CleanOutcome {
    pub records: Vec<HistoricalRecord>,
    pub notices: Vec<LoadNotice>,
}

impl<'a> DataCleaner<'a> {
    pub fn new(month_column: &'a str, subtotal_marker: &str) -> Self {
        Self {
            month_column,
            subtotal_marker: subtotal_marker.trim().to_lowercase(),
        }
    }

    /// 月份文本是否为小计标记 (不区分大小写)
    pub fn is_subtotal(&self, month_raw: &str) -> bool {
        !self.subtotal_marker.is_empty() && month_raw.to_lowercase().contains(&self.subtotal_marker)
    }

    /// 剔除小计行 (在字段映射之前执行)
    ///
    /// # 返回
    /// (保留的行, 剔除数量)
    pub fn drop_subtotal_rows(&self, rows: Vec<RawRow>) -> (Vec<RawRow>, usize) {
        let before = rows.len();
        let kept: Vec<RawRow> = rows
            .into_iter()
            .filter(|row| !row.get(self.month_column).map(|m| self.is_subtotal(m)).unwrap_or(false))
            .collect();
        let dropped = before - kept.len();
        (kept, dropped)
    }

    /// 月份标准化: 兼容 "3" / "3.0" / " 3 ", 必须为 1..=12 的整数
    pub fn parse_month(&self, month_raw: &str) -> Option<u32> {
        let value = month_raw.trim().parse::<f64>().ok()?;
        if value.fract() != 0.0 || !(1.0..=12.0).contains(&value) {
            return None;
        }
        Some(value as u32)
    }

    /// 主品类标准化 (TRIM, 空白视为缺失)
    pub fn normalize_group(&self, value: Option<&str>) -> Option<String> {
        value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
    }

    /// 清洗映射后的行并生成历史记录
    ///
    /// 月份非法的行与主品类为空的行会被剔除, 并以提示事件返回剔除数量
    pub fn clean(&self, rows: Vec<MappedRow>) -> CleanOutcome {
        let mut records = Vec::with_capacity(rows.len());
        let mut invalid_month = 0usize;
        let mut blank_group = 0usize;

        for row in rows {
            let month = match row.month_raw.as_deref().and_then(|m| self.parse_month(m)) {
                Some(m) => m,
                None => {
                    tracing::debug!(row = row.row_number, month = ?row.month_raw, "月份非法, 剔除");
                    invalid_month += 1;
                    continue;
                }
            };

            let main_group = match self.normalize_group(row.main_group.as_deref()) {
                Some(g) => g,
                None => {
                    blank_group += 1;
                    continue;
                }
            };

            records.push(HistoricalRecord::new(
                row.year,
                month,
                main_group,
                row.sales.unwrap_or(0.0),
                row.gross_profit.unwrap_or(0.0),
                row.gross_margin_pct.unwrap_or(0.0),
                row.stock.unwrap_or(0.0),
                RecordSource::Actual,
            ));
        }

        let mut notices = Vec::new();
        if invalid_month > 0 {
            notices.push(LoadNotice::InvalidMonthRowsDropped { count: invalid_month });
        }
        if blank_group > 0 {
            notices.push(LoadNotice::BlankGroupRowsDropped { count: blank_group });
        }

        CleanOutcome { records, notices }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn mapped(month: Option<&str>, group: Option<&str>, sales: Option<f64>) -> MappedRow {
        MappedRow {
            row_number: 1,
            year: 2024,
            month_raw: month.map(str::to_string),
            main_group: group.map(str::to_string),
            sales,
            gross_profit: Some(10.0),
            gross_margin_pct: None,
            stock: None,
        }
    }

    fn raw(month: &str) -> RawRow {
        let mut values = HashMap::new();
        values.insert("Month".to_string(), month.to_string());
        RawRow {
            row_number: 1,
            values,
        }
    }

    #[test]
    fn test_is_subtotal() {
        let cleaner = DataCleaner::new("Month", "Toplam");
        assert!(cleaner.is_subtotal("Toplam"));
        assert!(cleaner.is_subtotal("1 TOPLAM"));
        assert!(!cleaner.is_subtotal("1"));
    }

    #[test]
    fn test_drop_subtotal_rows() {
        let cleaner = DataCleaner::new("Month", "Toplam");
        let (kept, dropped) = cleaner.drop_subtotal_rows(vec![raw("1"), raw("1 Toplam"), raw("2")]);
        assert_eq!(kept.len(), 2);
        assert_eq!(dropped, 1);
    }

    #[test]
    fn test_parse_month() {
        let cleaner = DataCleaner::new("Month", "Toplam");
        assert_eq!(cleaner.parse_month("3"), Some(3));
        assert_eq!(cleaner.parse_month("12.0"), Some(12));
        assert_eq!(cleaner.parse_month(" 7 "), Some(7));
        assert_eq!(cleaner.parse_month("0"), None);
        assert_eq!(cleaner.parse_month("13"), None);
        assert_eq!(cleaner.parse_month("2.5"), None);
        assert_eq!(cleaner.parse_month("Ocak"), None);
    }

    #[test]
    fn test_clean_fills_zero_and_drops_invalid() {
        let cleaner = DataCleaner::new("Month", "Toplam");
        let outcome = cleaner.clean(vec![
            mapped(Some("1"), Some("A"), None),
            mapped(Some("1"), Some("  "), Some(5.0)),
            mapped(None, Some("A"), Some(5.0)),
        ]);

        assert_eq!(outcome.records.len(), 1);
        let record = &outcome.records[0];
        assert_eq!(record.sales, 0.0);
        assert_eq!(record.stock, 0.0);
        assert_eq!(record.cogs, -10.0);
        assert!(outcome
            .notices
            .contains(&LoadNotice::BlankGroupRowsDropped { count: 1 }));
        assert!(outcome
            .notices
            .contains(&LoadNotice::InvalidMonthRowsDropped { count: 1 }));
    }
}
