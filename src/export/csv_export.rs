// ==========================================
// 零售预算预测系统 - CSV 导出
// ==========================================
// 1. 年度明细: 每年一个文件, 每月明细行后接 "Toplam {月}" 小计行
// 2. 单月三年对比: 主品类 × (三个年度的销售/毛利率/库存/成本/周库存比)
// ==========================================

use crate::domain::{MonthComparisonRow, MonthlyRecord};
use crate::export::error::ExportResult;
use csv::Writer;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

/// 小计行月份列的前缀 (与源文件小计标记一致, 可被再次导入时识别)
pub const SUBTOTAL_LABEL: &str = "Toplam";

const YEAR_SHEET_HEADERS: [&str; 9] = [
    "Month",
    "MainGroup",
    "Sales",
    "GrossProfit",
    "GrossMargin",
    "Stock",
    "COGS",
    "StockCogsRatio",
    "Source",
];

/// 写出单个年度的明细表
pub fn write_year_sheet<W: Write>(writer: W, records: &[&MonthlyRecord]) -> ExportResult<()> {
    let mut csv = Writer::from_writer(writer);
    csv.write_record(YEAR_SHEET_HEADERS)?;

    let mut by_month: BTreeMap<u32, Vec<&MonthlyRecord>> = BTreeMap::new();
    for &record in records {
        by_month.entry(record.month).or_default().push(record);
    }

    for (month, rows) in by_month {
        for r in &rows {
            csv.write_record([
                month.to_string(),
                r.main_group.clone(),
                fmt_amount(r.sales),
                fmt_amount(r.gross_profit),
                fmt_ratio(r.gross_margin_pct),
                fmt_amount(r.stock),
                fmt_amount(r.cogs),
                fmt_ratio(r.stock_cogs_ratio),
                r.source.to_string(),
            ])?;
        }

        // 小计: 金额求和, 毛利率 = 毛利 / 销售, 库存与库存比取均值
        let n = rows.len() as f64;
        let sales: f64 = rows.iter().map(|r| r.sales).sum();
        let gross_profit: f64 = rows.iter().map(|r| r.gross_profit).sum();
        let cogs: f64 = rows.iter().map(|r| r.cogs).sum();
        let stock = rows.iter().map(|r| r.stock).sum::<f64>() / n;
        let ratio = rows.iter().map(|r| r.stock_cogs_ratio).sum::<f64>() / n;
        let margin = if sales != 0.0 { gross_profit / sales } else { 0.0 };

        csv.write_record([
            format!("{} {}", SUBTOTAL_LABEL, month),
            String::new(),
            fmt_amount(sales),
            fmt_amount(gross_profit),
            fmt_ratio(margin),
            fmt_amount(stock),
            fmt_amount(cogs),
            fmt_ratio(ratio),
            String::new(),
        ])?;
    }

    csv.flush()?;
    Ok(())
}

/// 每个年度写出一个文件: {dir}/budget_{year}.csv
///
/// # 返回
/// 写出的文件路径 (按年度升序)
pub fn write_year_sheets(dir: &Path, records: &[MonthlyRecord]) -> ExportResult<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;

    let mut by_year: BTreeMap<i32, Vec<&MonthlyRecord>> = BTreeMap::new();
    for record in records {
        by_year.entry(record.year).or_default().push(record);
    }

    let mut paths = Vec::with_capacity(by_year.len());
    for (year, rows) in by_year {
        let path = dir.join(format!("budget_{}.csv", year));
        write_year_sheet(std::fs::File::create(&path)?, &rows)?;
        tracing::info!(year, rows = rows.len(), file = %path.display(), "年度明细已导出");
        paths.push(path);
    }
    Ok(paths)
}

/// 写出单月三年对比表
pub fn write_month_comparison<W: Write>(writer: W, rows: &[MonthComparisonRow]) -> ExportResult<()> {
    let mut csv = Writer::from_writer(writer);

    let years: Vec<i32> = rows
        .first()
        .map(|r| r.years.iter().map(|y| y.year).collect())
        .unwrap_or_default();

    let mut header = vec!["MainGroup".to_string(), "Month".to_string()];
    for year in &years {
        for metric in ["Sales", "GrossMargin", "Stock", "COGS", "StockCogsWeekly"] {
            header.push(format!("{}_{}", metric, year));
        }
    }
    csv.write_record(&header)?;

    for row in rows {
        let mut record = vec![row.main_group.clone(), row.month.to_string()];
        for slice in &row.years {
            record.push(fmt_amount(slice.sales));
            record.push(fmt_ratio(slice.gross_margin_pct));
            record.push(fmt_amount(slice.stock));
            record.push(fmt_amount(slice.cogs));
            record.push(fmt_ratio(slice.stock_cogs_weekly));
        }
        csv.write_record(&record)?;
    }

    csv.flush()?;
    Ok(())
}

fn fmt_amount(v: f64) -> String {
    format!("{:.2}", v)
}

fn fmt_ratio(v: f64) -> String {
    format!("{:.4}", v)
}
