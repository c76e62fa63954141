// ==========================================
// 零售预算预测系统 - 趋势分析
// ==========================================
// 有机趋势: 全品类年度销售合计的同比增长率 (预测公式使用)
// 品类趋势 / 近期动能: 品类维度诊断指标 (随报告输出, 不进入预测公式)
// ==========================================

use crate::domain::{GroupMomentum, GroupTrend, HistoryTable};
use std::collections::BTreeMap;

/// 近期动能参考的月份 (第二年 Q4)
pub const RECENT_MONTHS: [u32; 3] = [10, 11, 12];

pub struct TrendAnalyzer;

impl TrendAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// 有机趋势: (第二年合计 - 第一年合计) / 第一年合计
    ///
    /// 第一年合计为 0 时返回 0
    pub fn trend_factor(&self, history: &HistoryTable) -> f64 {
        growth_rate(
            history.total_sales(history.first_year),
            history.total_sales(history.second_year),
        )
    }

    /// 品类同比增长率 (仅两年均出现的品类)
    pub fn group_trends(&self, history: &HistoryTable) -> Vec<GroupTrend> {
        let first = sales_by_group(history, history.first_year, None);
        let second = sales_by_group(history, history.second_year, None);

        first
            .into_iter()
            .filter_map(|(group, (sales_first, _))| {
                let (sales_second, _) = *second.get(&group)?;
                Some(GroupTrend {
                    growth_rate: growth_rate(sales_first, sales_second),
                    main_group: group,
                    sales_first_year: sales_first,
                    sales_second_year: sales_second,
                })
            })
            .collect()
    }

    /// 品类近期动能: 第二年 10-12 月平均销售额 / 第二年全年平均销售额
    ///
    /// 第二年没有任何 10-12 月记录时, 以全年记录作为近期窗口;
    /// 全年均值不为正时动能为 1.0
    pub fn recent_momentum(&self, history: &HistoryTable) -> Vec<GroupMomentum> {
        let year = history.second_year;
        let overall = sales_by_group(history, year, None);

        let mut recent = sales_by_group(history, year, Some(&RECENT_MONTHS));
        if recent.is_empty() {
            tracing::debug!(year, "第二年无 Q4 记录, 近期动能以全年为窗口");
            recent = overall.clone();
        }

        recent
            .into_iter()
            .filter_map(|(group, (recent_sum, recent_n))| {
                let (overall_sum, overall_n) = *overall.get(&group)?;
                let recent_avg = mean(recent_sum, recent_n);
                let overall_avg = mean(overall_sum, overall_n);
                let momentum_score = if overall_avg > 0.0 {
                    recent_avg / overall_avg
                } else {
                    1.0
                };
                Some(GroupMomentum {
                    main_group: group,
                    recent_avg,
                    overall_avg,
                    momentum_score,
                })
            })
            .collect()
    }
}

impl Default for TrendAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// 同比增长率 (基数不为正时为 0)
pub fn growth_rate(base: f64, current: f64) -> f64 {
    if base > 0.0 {
        (current - base) / base
    } else {
        0.0
    }
}

fn mean(sum: f64, n: usize) -> f64 {
    if n > 0 {
        sum / n as f64
    } else {
        0.0
    }
}

/// 品类 → (销售合计, 记录数)
fn sales_by_group(
    history: &HistoryTable,
    year: i32,
    months: Option<&[u32]>,
) -> BTreeMap<String, (f64, usize)> {
    let mut totals: BTreeMap<String, (f64, usize)> = BTreeMap::new();
    for record in history.year_records(year) {
        if let Some(months) = months {
            if !months.contains(&record.month) {
                continue;
            }
        }
        let slot = totals.entry(record.main_group.clone()).or_insert((0.0, 0));
        slot.0 += record.sales;
        slot.1 += 1;
    }
    totals
}
