// ==========================================
// 零售预算预测系统 - 汇总与对比
// ==========================================
// 职责: 历史 + 预测合并表 / 年度汇总 / 单月三年对比
// 周口径库存比按固定月份天数表计算 (2 月 28 天)
// ==========================================

use crate::domain::{
    days_in_month, weekly_stock_cogs_ratio, ForecastRecord, HistoryTable, MonthComparisonRow,
    MonthlyRecord, YearSlice, YearSummary,
};
use std::collections::{BTreeMap, BTreeSet};

pub struct SummaryEngine;

impl SummaryEngine {
    pub fn new() -> Self {
        Self
    }

    /// 合并历史记录与预测记录 (历史在前)
    pub fn combine(&self, history: &HistoryTable, forecast: &[ForecastRecord]) -> Vec<MonthlyRecord> {
        history
            .records
            .iter()
            .chain(forecast.iter())
            .cloned()
            .collect()
    }

    /// 按年度汇总
    ///
    /// - 平均毛利率 = 毛利合计 / 销售合计 × 100 (销售合计不为正时为 0)
    /// - 库存 / 库存比 / 周口径库存比 取记录均值
    pub fn year_summaries(&self, records: &[MonthlyRecord]) -> BTreeMap<i32, YearSummary> {
        let mut by_year: BTreeMap<i32, Vec<&MonthlyRecord>> = BTreeMap::new();
        for record in records {
            by_year.entry(record.year).or_default().push(record);
        }

        by_year
            .into_iter()
            .map(|(year, rows)| (year, summarize_year(year, &rows)))
            .collect()
    }

    /// 单月三年对比 (按主品类外连接, 缺失年度记 0)
    pub fn month_comparison(
        &self,
        records: &[MonthlyRecord],
        month: u32,
        years: &[i32],
    ) -> Vec<MonthComparisonRow> {
        let mut cells: BTreeMap<(&str, i32), ComparisonCell> = BTreeMap::new();
        let mut groups: BTreeSet<&str> = BTreeSet::new();

        for record in records
            .iter()
            .filter(|r| r.month == month && years.contains(&r.year))
        {
            groups.insert(record.main_group.as_str());
            let cell = cells
                .entry((record.main_group.as_str(), record.year))
                .or_default();
            cell.sales += record.sales;
            cell.margin_sum += record.gross_margin_pct;
            cell.stock += record.stock;
            cell.cogs += record.cogs;
            cell.count += 1;
        }

        groups
            .into_iter()
            .map(|group| MonthComparisonRow {
                main_group: group.to_string(),
                month,
                years: years
                    .iter()
                    .map(|&year| {
                        let cell = cells.get(&(group, year)).copied().unwrap_or_default();
                        YearSlice {
                            year,
                            sales: cell.sales,
                            gross_margin_pct: cell.gross_margin_pct(),
                            stock: cell.stock,
                            cogs: cell.cogs,
                            stock_cogs_weekly: weekly_stock_cogs_ratio(
                                cell.stock,
                                cell.cogs,
                                days_in_month(month),
                            ),
                        }
                    })
                    .collect(),
            })
            .collect()
    }
}

/// 单月对比的 (品类, 年) 单元
///
/// 毛利率取记录自身的源值 (多条时取均值), 不由毛利/销售反推
#[derive(Debug, Clone, Copy, Default)]
struct ComparisonCell {
    sales: f64,
    margin_sum: f64,
    stock: f64,
    cogs: f64,
    count: usize,
}

impl ComparisonCell {
    fn gross_margin_pct(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.margin_sum / self.count as f64
        }
    }
}

impl Default for SummaryEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn summarize_year(year: i32, rows: &[&MonthlyRecord]) -> YearSummary {
    let total_sales: f64 = rows.iter().map(|r| r.sales).sum();
    let total_gross_profit: f64 = rows.iter().map(|r| r.gross_profit).sum();

    YearSummary {
        year,
        total_sales,
        total_gross_profit,
        avg_gross_margin_pct: if total_sales > 0.0 {
            total_gross_profit / total_sales * 100.0
        } else {
            0.0
        },
        avg_stock: mean_of(rows, |r| r.stock),
        avg_stock_cogs_ratio: mean_of(rows, |r| r.stock_cogs_ratio),
        avg_stock_cogs_weekly: mean_of(rows, MonthlyRecord::weekly_stock_cogs_ratio),
        row_count: rows.len(),
    }
}

fn mean_of<F>(rows: &[&MonthlyRecord], f: F) -> f64
where
    F: Fn(&MonthlyRecord) -> f64,
{
    if rows.is_empty() {
        0.0
    } else {
        rows.iter().map(|r| f(*r)).sum::<f64>() / rows.len() as f64
    }
}
