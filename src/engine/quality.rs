// ==========================================
// 零售预算预测系统 - 预测质量评估
// ==========================================
// 输入: 两个历史年度的月度销售合计 (不看预测年)
// 输出: QualityMetrics (r2 / 增长率离散度 / 平均绝对增长 / 置信等级)
// 红线: 共同月份不足时返回降级结果, 不报错
// ==========================================

use crate::config::QualityThresholds;
use crate::domain::{ConfidenceLevel, HistoryTable, QualityMetrics};
use std::collections::BTreeMap;

pub struct QualityEvaluator {
    thresholds: QualityThresholds,
}

impl QualityEvaluator {
    pub fn new(thresholds: QualityThresholds) -> Self {
        Self { thresholds }
    }

    /// 评估历史趋势的可信度
    ///
    /// # 规则
    /// 1. 两年分别按月汇总销售额, 取共同月份 (升序)
    /// 2. 共同月份 < min_common_months → 降级结果
    /// 3. trend_consistency = 1 - min(总体标准差(增长率), 1.0)
    /// 4. r2 = Pearson 相关系数²; 月份 < 2 时为 fallback_fit; 任一序列无波动时为 0
    /// 5. 任一共同月份第一年合计为 0 时增长率无定义: 增长类指标为 None, 等级为 Low
    pub fn evaluate(&self, history: &HistoryTable) -> QualityMetrics {
        let first = monthly_totals(history, history.first_year);
        let second = monthly_totals(history, history.second_year);

        let (year1, year2): (Vec<f64>, Vec<f64>) = first
            .iter()
            .filter_map(|(month, &v1)| second.get(month).map(|&v2| (v1, v2)))
            .unzip();

        let common = year1.len();
        if common < self.thresholds.min_common_months {
            tracing::warn!(
                common_months = common,
                required = self.thresholds.min_common_months,
                "历史共同月份不足, 质量指标降级"
            );
            return QualityMetrics::insufficient(common);
        }

        let correlation_based_fit = if common >= 2 {
            pearson(&year1, &year2).map(|r| r * r).unwrap_or(0.0)
        } else {
            self.thresholds.fallback_fit
        };

        if year1.iter().any(|v| *v == 0.0) {
            tracing::warn!(common_months = common, "存在第一年合计为 0 的月份, 增长率无定义");
            return QualityMetrics {
                correlation_based_fit: Some(correlation_based_fit),
                mean_absolute_growth_pct: None,
                trend_consistency: None,
                confidence_level: ConfidenceLevel::Low,
                mean_growth_pct: None,
                common_months: common,
            };
        }

        let growth_rates: Vec<f64> = year1
            .iter()
            .zip(&year2)
            .map(|(v1, v2)| (v2 - v1) / v1)
            .collect();

        let trend_consistency = 1.0 - population_std(&growth_rates).min(1.0);
        let mean_absolute_growth_pct =
            growth_rates.iter().map(|g| g.abs()).sum::<f64>() / common as f64 * 100.0;
        let mean_growth_pct = growth_rates.iter().sum::<f64>() / common as f64 * 100.0;

        let confidence_level = self.classify(correlation_based_fit, trend_consistency);

        tracing::debug!(
            common_months = common,
            r2 = correlation_based_fit,
            trend_consistency,
            confidence = confidence_level.as_str(),
            "质量评估完成"
        );

        QualityMetrics {
            correlation_based_fit: Some(correlation_based_fit),
            mean_absolute_growth_pct: Some(mean_absolute_growth_pct),
            trend_consistency: Some(trend_consistency),
            confidence_level,
            mean_growth_pct: Some(mean_growth_pct),
            common_months: common,
        }
    }

    /// 置信等级判定 (严格大于)
    pub fn classify(&self, r2: f64, trend_consistency: f64) -> ConfidenceLevel {
        let t = &self.thresholds;
        if r2 > t.high_fit && trend_consistency > t.high_consistency {
            ConfidenceLevel::High
        } else if r2 > t.medium_fit && trend_consistency > t.medium_consistency {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }
}

impl Default for QualityEvaluator {
    fn default() -> Self {
        Self::new(QualityThresholds::default())
    }
}

fn monthly_totals(history: &HistoryTable, year: i32) -> BTreeMap<u32, f64> {
    let mut totals = BTreeMap::new();
    for record in history.year_records(year) {
        *totals.entry(record.month).or_insert(0.0) += record.sales;
    }
    totals
}

/// 总体标准差 (除以 n)
fn population_std(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt()
}

/// Pearson 相关系数; 任一序列方差为 0 时无定义
fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        None
    } else {
        Some(cov / (var_x * var_y).sqrt())
    }
}
