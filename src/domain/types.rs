// ==========================================
// 零售预算预测系统 - 领域类型定义
// ==========================================
// 职责: 记录来源 / 置信等级 / 加载提示事件
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 记录来源 (Record Source)
// ==========================================
// 同一张合并表内区分 实际值 / 补全值 / 预测值
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordSource {
    Actual,     // 源文件实际值
    Backfilled, // 12 月补全值 (由 11 月推算)
    Forecast,   // 预测年度
}

impl fmt::Display for RecordSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordSource::Actual => write!(f, "ACTUAL"),
            RecordSource::Backfilled => write!(f, "BACKFILLED"),
            RecordSource::Forecast => write!(f, "FORECAST"),
        }
    }
}

// ==========================================
// 置信等级 (Confidence Level)
// ==========================================
// 顺序: Low < Medium < High
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

impl ConfidenceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceLevel::Low => "low",
            ConfidenceLevel::Medium => "medium",
            ConfidenceLevel::High => "high",
        }
    }

    /// 当前语言下的显示名称
    pub fn label(&self) -> String {
        crate::i18n::t(&format!("confidence.{}", self.as_str()))
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfidenceLevel::Low => write!(f, "Low"),
            ConfidenceLevel::Medium => write!(f, "Medium"),
            ConfidenceLevel::High => write!(f, "High"),
        }
    }
}

// ==========================================
// 加载提示 (Load Notice)
// ==========================================
// 加载层不直接打印,只返回结构化事件,由调用方决定是否展示/记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LoadNotice {
    /// 小计行 (月份列含合计标记) 已剔除
    SubtotalRowsDropped { count: usize },

    /// 主品类为空的行已剔除
    BlankGroupRowsDropped { count: usize },

    /// 月份无法解析或超出 1..=12 的行已剔除
    InvalidMonthRowsDropped { count: usize },

    /// 12 月已由 11 月推算补全
    DecemberBackfilled {
        year: i32,
        groups: usize,
        /// 原 12 月销售合计 (None 表示原数据中无 12 月)
        previous_total: Option<f64>,
    },

    /// 12 月需要补全,但 11 月也缺失,未做处理
    DecemberBackfillSkipped { year: i32 },
}

impl LoadNotice {
    /// 当前语言下的提示文本
    pub fn message(&self) -> String {
        match self {
            LoadNotice::SubtotalRowsDropped { count } => crate::i18n::t_with_args(
                "notice.subtotal_rows_dropped",
                &[("count", &count.to_string())],
            ),
            LoadNotice::BlankGroupRowsDropped { count } => crate::i18n::t_with_args(
                "notice.blank_group_rows_dropped",
                &[("count", &count.to_string())],
            ),
            LoadNotice::InvalidMonthRowsDropped { count } => crate::i18n::t_with_args(
                "notice.invalid_month_rows_dropped",
                &[("count", &count.to_string())],
            ),
            LoadNotice::DecemberBackfilled { year, groups, .. } => crate::i18n::t_with_args(
                "notice.december_backfilled",
                &[("year", &year.to_string()), ("groups", &groups.to_string())],
            ),
            LoadNotice::DecemberBackfillSkipped { year } => crate::i18n::t_with_args(
                "notice.december_backfill_skipped",
                &[("year", &year.to_string())],
            ),
        }
    }
}
