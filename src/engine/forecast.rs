// ==========================================
// 零售预算预测系统 - 预测引擎
// ==========================================
// 输入: 历史表 + 预测参数
// 输出: 预测年度记录 (基准年每个 (月, 品类) 恰好一条)
// 红线: 纯函数, 不修改历史表; 不新增品类, 不丢弃品类
// ==========================================
// 公式:
//   combined = (月度目标 + 品类目标) / 2 + 经验评分 × lessons_point_weight
//   sales    = base_sales × (1 + trend × trend_dampening)
//                         × (1 + combined)
//                         × ((1 - seasonality_weight) + index × seasonality_weight)
//   margin   = clamp(base_margin + margin_improvement, 0, 1)
//   gp       = sales × margin ; cogs = sales - gp
//   stock    = 库存策略
// ==========================================

use crate::config::ModelWeights;
use crate::domain::{ForecastRecord, HistoricalRecord, HistoryTable, RecordSource};
use crate::engine::error::EngineResult;
use crate::engine::params::{AdjustmentInputs, ForecastParams};
use crate::engine::seasonality::SeasonalityTable;
use crate::engine::trend::TrendAnalyzer;
use tracing::instrument;

pub struct ForecastEngine {
    weights: ModelWeights,
}

impl ForecastEngine {
    pub fn new(weights: ModelWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &ModelWeights {
        &self.weights
    }

    /// 生成预测年度记录
    ///
    /// # 错误
    /// - 参数校验失败 → EngineError::InvalidParameter
    ///
    /// 基准年没有记录时返回空结果 (仅记录告警)
    #[instrument(skip_all, fields(base_year = history.second_year))]
    pub fn project(
        &self,
        history: &HistoryTable,
        params: &ForecastParams,
    ) -> EngineResult<Vec<ForecastRecord>> {
        params.validate()?;

        let forecast_year = history.second_year + 1;
        let seasonality = SeasonalityTable::from_history(&history.records);
        let trend = TrendAnalyzer::new().trend_factor(history);
        let trend_multiplier = self.weights.trend_multiplier(trend);

        tracing::debug!(
            trend,
            trend_multiplier,
            seasonality_entries = seasonality.len(),
            "趋势与季节指数就绪"
        );

        let forecast: Vec<ForecastRecord> = history
            .base_records()
            .map(|base| {
                let index = seasonality.index(&base.main_group, base.month);
                self.project_record(base, forecast_year, trend_multiplier, index, params)
            })
            .collect();

        if forecast.is_empty() {
            tracing::warn!(
                base_year = history.second_year,
                "基准年没有任何记录, 预测结果为空"
            );
        } else {
            tracing::info!(
                forecast_year,
                rows = forecast.len(),
                total_sales = forecast.iter().map(|r| r.sales).sum::<f64>(),
                "预测完成"
            );
        }

        Ok(forecast)
    }

    /// 综合增长目标: 月度目标与品类目标取平均, 再叠加经验评分
    ///
    /// 评分不再截断, 取值范围由参数校验保证
    pub fn combined_growth_target(
        &self,
        growth_param: f64,
        adjustments: &AdjustmentInputs,
        main_group: &str,
        month: u32,
    ) -> f64 {
        let monthly = adjustments.monthly_target(month, growth_param);
        let group = adjustments.group_target(main_group, growth_param);
        let lessons = adjustments.lessons_score(main_group, month) as f64
            * self.weights.lessons_point_weight;

        (monthly + group) / 2.0 + lessons
    }

    fn project_record(
        &self,
        base: &HistoricalRecord,
        forecast_year: i32,
        trend_multiplier: f64,
        seasonal_index: f64,
        params: &ForecastParams,
    ) -> ForecastRecord {
        let combined = self.combined_growth_target(
            params.growth_param,
            &params.adjustments,
            &base.main_group,
            base.month,
        );

        let sales = base.sales
            * trend_multiplier
            * (1.0 + combined)
            * self.weights.seasonal_blend(seasonal_index);
        let margin = (base.gross_margin_pct + params.margin_improvement).clamp(0.0, 1.0);
        let gross_profit = sales * margin;
        let cogs = sales - gross_profit;
        let stock = params.stock_policy.project(cogs, base.stock);

        ForecastRecord::new(
            forecast_year,
            base.month,
            base.main_group.clone(),
            sales,
            gross_profit,
            margin,
            stock,
            RecordSource::Forecast,
        )
    }
}

impl Default for ForecastEngine {
    fn default() -> Self {
        Self::new(ModelWeights::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::params::StockPolicy;

    fn record(year: i32, month: u32, group: &str, sales: f64, margin: f64, stock: f64) -> HistoricalRecord {
        HistoricalRecord::new(
            year,
            month,
            group,
            sales,
            sales * margin,
            margin,
            stock,
            RecordSource::Actual,
        )
    }

    fn flat_history() -> HistoryTable {
        // 两年销售额相同 → 趋势为 0; 每个品类每月相同 → 季节指数为 1
        let mut records = Vec::new();
        for year in [2024, 2025] {
            for month in 1..=3 {
                records.push(record(year, month, "A", 1000.0, 0.3, 500.0));
                records.push(record(year, month, "B", 200.0, 0.2, 100.0));
            }
        }
        HistoryTable::new(2024, 2025, records, Vec::new())
    }

    #[test]
    fn test_combined_growth_target() {
        let engine = ForecastEngine::default();
        let adj = AdjustmentInputs::new()
            .with_monthly_target(1, 0.20)
            .with_group_target("A", 0.10)
            .with_lesson("A", 1, 5);

        assert!((engine.combined_growth_target(0.15, &AdjustmentInputs::new(), "A", 1) - 0.15).abs() < 1e-12);
        assert!((engine.combined_growth_target(0.15, &adj, "A", 1) - 0.25).abs() < 1e-12);
        // 只命中月度目标
        assert!((engine.combined_growth_target(0.15, &adj, "B", 1) - 0.175).abs() < 1e-12);
    }

    #[test]
    fn test_project_flat_history() {
        let engine = ForecastEngine::default();
        let params = ForecastParams::new(0.15, 0.02, StockPolicy::RatioTarget(0.8));

        let forecast = engine.project(&flat_history(), &params).unwrap();

        assert_eq!(forecast.len(), 6);
        let a1 = forecast.iter().find(|r| r.main_group == "A" && r.month == 1).unwrap();
        assert_eq!(a1.year, 2026);
        assert_eq!(a1.source, RecordSource::Forecast);
        assert!((a1.sales - 1150.0).abs() < 1e-9);
        assert!((a1.gross_margin_pct - 0.32).abs() < 1e-12);
        assert!((a1.gross_profit - 1150.0 * 0.32).abs() < 1e-9);
        assert!((a1.stock - a1.cogs * 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_project_applies_trend_and_seasonality() {
        let history = HistoryTable::new(
            2024,
            2025,
            vec![
                record(2024, 1, "A", 100.0, 0.3, 10.0),
                record(2024, 2, "A", 100.0, 0.3, 10.0),
                record(2025, 1, "A", 100.0, 0.3, 10.0),
                record(2025, 2, "A", 300.0, 0.3, 10.0),
            ],
            Vec::new(),
        );
        let params = ForecastParams::new(0.0, 0.0, StockPolicy::DeltaChange(0.0));

        let forecast = ForecastEngine::default().project(&history, &params).unwrap();
        let feb = forecast.iter().find(|r| r.month == 2).unwrap();

        // 趋势 = (400 - 200) / 200 = 1.0 → 乘子 1.3
        // 2 月指数 = 200 / 150 → 混合 0.85 + 0.15 × 4/3 = 1.05
        assert!((feb.sales - 300.0 * 1.3 * 1.05).abs() < 1e-9);
        assert!((feb.stock - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_margin_clamped() {
        let history = HistoryTable::new(
            2024,
            2025,
            vec![record(2025, 1, "A", 100.0, 0.95, 10.0), record(2025, 2, "B", 100.0, 0.01, 10.0)],
            Vec::new(),
        );
        let engine = ForecastEngine::default();

        let up = engine
            .project(&history, &ForecastParams::new(0.1, 0.2, StockPolicy::RatioTarget(1.0)))
            .unwrap();
        assert!(up.iter().all(|r| (0.0..=1.0).contains(&r.gross_margin_pct)));
        assert_eq!(up.iter().find(|r| r.main_group == "A").unwrap().gross_margin_pct, 1.0);

        let down = engine
            .project(&history, &ForecastParams::new(0.1, -0.2, StockPolicy::RatioTarget(1.0)))
            .unwrap();
        let b = down.iter().find(|r| r.main_group == "B").unwrap();
        assert_eq!(b.gross_margin_pct, 0.0);
        assert_eq!(b.cogs, b.sales);
    }

    #[test]
    fn test_invalid_params_rejected() {
        let mut params = ForecastParams::default();
        params.stock_policy = StockPolicy::RatioTarget(f64::INFINITY);

        assert!(ForecastEngine::default().project(&flat_history(), &params).is_err());
    }

    #[test]
    fn test_empty_base_year() {
        let history = HistoryTable::new(
            2024,
            2025,
            vec![record(2024, 1, "A", 100.0, 0.3, 10.0)],
            Vec::new(),
        );
        let forecast = ForecastEngine::default()
            .project(&history, &ForecastParams::default())
            .unwrap();
        assert!(forecast.is_empty());
    }
}
