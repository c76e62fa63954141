// ==========================================
// 零售预算预测系统 - 月度记录领域模型
// ==========================================
// 粒度: (年, 月, 主品类)
// 红线: cogs / stock_cogs_ratio 一律由本模块派生,不信任源文件
// ==========================================

use crate::domain::types::RecordSource;
use serde::{Deserialize, Serialize};

// ==========================================
// MonthlyRecord - 月度记录
// ==========================================
// 历史记录与预测记录共用同一结构,以 source 区分
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRecord {
    pub year: i32,               // 年度
    pub month: u32,              // 月份 (1..=12)
    pub main_group: String,      // 主品类

    // ===== 金额指标 =====
    pub sales: f64,              // 销售额
    pub gross_profit: f64,       // 毛利
    pub gross_margin_pct: f64,   // 毛利率 (0..1 小数)
    pub stock: f64,              // 平均库存金额

    // ===== 派生指标 =====
    pub cogs: f64,               // 销售成本 = sales - gross_profit
    pub stock_cogs_ratio: f64,   // 库存/成本 比

    pub source: RecordSource,
}

/// 历史记录 (实际值 + 12 月补全值)
pub type HistoricalRecord = MonthlyRecord;

/// 预测记录
pub type ForecastRecord = MonthlyRecord;

impl MonthlyRecord {
    /// 构造记录并立即派生 cogs / stock_cogs_ratio
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        year: i32,
        month: u32,
        main_group: impl Into<String>,
        sales: f64,
        gross_profit: f64,
        gross_margin_pct: f64,
        stock: f64,
        source: RecordSource,
    ) -> Self {
        let mut record = Self {
            year,
            month,
            main_group: main_group.into(),
            sales,
            gross_profit,
            gross_margin_pct,
            stock,
            cogs: 0.0,
            stock_cogs_ratio: 0.0,
            source,
        };
        record.recompute_derived();
        record
    }

    /// 重新派生成本与库存比
    pub fn recompute_derived(&mut self) {
        self.cogs = self.sales - self.gross_profit;
        self.stock_cogs_ratio = stock_cogs_ratio(self.stock, self.cogs);
    }

    /// 当月天数 (固定天数表)
    pub fn days_in_month(&self) -> u32 {
        days_in_month(self.month)
    }

    /// 周口径库存/成本比: stock / (cogs / 当月天数 × 7)
    ///
    /// 消除大小月差异,表示库存可覆盖的周数
    pub fn weekly_stock_cogs_ratio(&self) -> f64 {
        weekly_stock_cogs_ratio(self.stock, self.cogs, self.days_in_month())
    }
}

/// 库存/成本比 (cogs <= 0 时返回 0)
pub fn stock_cogs_ratio(stock: f64, cogs: f64) -> f64 {
    if cogs > 0.0 {
        stock / cogs
    } else {
        0.0
    }
}

/// 周口径库存/成本比 (cogs <= 0 时返回 0)
pub fn weekly_stock_cogs_ratio(stock: f64, cogs: f64, days: u32) -> f64 {
    if cogs > 0.0 && days > 0 {
        stock / ((cogs / days as f64) * 7.0)
    } else {
        0.0
    }
}

/// 月份天数表, 2 月固定 28 天 (不区分闰年, 各年度周口径可比)
const DAYS_IN_MONTH: [u32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// 指定月份的天数
///
/// 月份非法时按 30 天处理 (加载层已保证 1..=12)
pub fn days_in_month(month: u32) -> u32 {
    month
        .checked_sub(1)
        .and_then(|idx| DAYS_IN_MONTH.get(idx as usize))
        .copied()
        .unwrap_or(30)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_derives_cogs_and_ratio() {
        let r = MonthlyRecord::new(2024, 3, "A", 1000.0, 300.0, 0.3, 1400.0, RecordSource::Actual);
        assert_eq!(r.cogs, 700.0);
        assert!((r.stock_cogs_ratio - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_ratio_zero_when_cogs_not_positive() {
        let r = MonthlyRecord::new(2024, 3, "A", 100.0, 100.0, 1.0, 50.0, RecordSource::Actual);
        assert_eq!(r.cogs, 0.0);
        assert_eq!(r.stock_cogs_ratio, 0.0);
        assert_eq!(r.weekly_stock_cogs_ratio(), 0.0);
    }

    #[test]
    fn test_days_in_month_fixed_table() {
        assert_eq!(days_in_month(2), 28);
        assert_eq!(days_in_month(12), 31);
        assert_eq!(days_in_month(4), 30);
        assert_eq!(days_in_month(0), 30);
        assert_eq!(days_in_month(13), 30);
    }

    #[test]
    fn test_leap_february_uses_28_days() {
        // cogs 280, 28 天 → 周成本 70
        let r = MonthlyRecord::new(2024, 2, "A", 380.0, 100.0, 0.26, 70.0, RecordSource::Actual);
        assert_eq!(r.days_in_month(), 28);
        assert!((r.weekly_stock_cogs_ratio() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_weekly_ratio() {
        // 31 天, cogs 310 → 日成本 10 → 周成本 70
        let r = MonthlyRecord::new(2025, 1, "A", 410.0, 100.0, 0.25, 140.0, RecordSource::Actual);
        assert!((r.weekly_stock_cogs_ratio() - 2.0).abs() < 1e-12);
    }
}
