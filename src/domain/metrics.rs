// ==========================================
// 零售预算预测系统 - 指标领域模型
// ==========================================
// 质量指标 / 年度汇总 / 月度对比 / 品类趋势
// 只读输出对象,由 engine 层生成
// ==========================================

use crate::domain::types::ConfidenceLevel;
use serde::{Deserialize, Serialize};

// ==========================================
// QualityMetrics - 预测质量指标
// ==========================================
// 历史共同月份不足时所有数值字段为 None, 置信等级为 Low
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    /// 两年月度合计的 Pearson 相关系数平方 (r2)
    pub correlation_based_fit: Option<f64>,
    /// 月度增长率绝对值均值 × 100
    pub mean_absolute_growth_pct: Option<f64>,
    /// 1 - min(增长率标准差, 1.0)
    pub trend_consistency: Option<f64>,
    pub confidence_level: ConfidenceLevel,
    /// 月度增长率均值 × 100
    pub mean_growth_pct: Option<f64>,
    /// 参与评估的共同月份数
    pub common_months: usize,
}

impl QualityMetrics {
    /// 数据不足时的降级结果
    pub fn insufficient(common_months: usize) -> Self {
        Self {
            correlation_based_fit: None,
            mean_absolute_growth_pct: None,
            trend_consistency: None,
            confidence_level: ConfidenceLevel::Low,
            mean_growth_pct: None,
            common_months,
        }
    }

    pub fn is_insufficient(&self) -> bool {
        self.correlation_based_fit.is_none()
    }
}

// ==========================================
// YearSummary - 年度汇总
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearSummary {
    pub year: i32,
    pub total_sales: f64,
    pub total_gross_profit: f64,
    /// 毛利合计 / 销售合计 × 100 (百分数)
    pub avg_gross_margin_pct: f64,
    pub avg_stock: f64,
    pub avg_stock_cogs_ratio: f64,
    /// 周口径库存/成本比均值
    pub avg_stock_cogs_weekly: f64,
    pub row_count: usize,
}

// ==========================================
// MonthComparisonRow - 单月三年对比行
// ==========================================
// 主品类在某一年缺失时, 对应年度指标为 0
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthComparisonRow {
    pub main_group: String,
    pub month: u32,
    pub years: Vec<YearSlice>,
}

/// 对比行中单一年度的指标
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearSlice {
    pub year: i32,
    pub sales: f64,
    pub gross_margin_pct: f64,
    pub stock: f64,
    pub cogs: f64,
    pub stock_cogs_weekly: f64,
}

// ==========================================
// GroupTrend / GroupMomentum - 品类维度趋势
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupTrend {
    pub main_group: String,
    pub sales_first_year: f64,
    pub sales_second_year: f64,
    pub growth_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupMomentum {
    pub main_group: String,
    /// 近期 (10-12 月) 平均销售额
    pub recent_avg: f64,
    /// 全年平均销售额
    pub overall_avg: f64,
    /// recent_avg / overall_avg (overall_avg <= 0 时为 1.0)
    pub momentum_score: f64,
}
