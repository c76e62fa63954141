// ==========================================
// ForecastEngine 集成测试
// ==========================================
// 测试目标: 成本恒等式 / 行数守恒 / 零基数 / 季节中性 / 库存策略 / 增长目标混合
// ==========================================


use budget_forecast::engine::{
    AdjustmentInputs, ForecastEngine, ForecastParams, SeasonalityTable, StockPolicy,
};
use budget_forecast::{EngineError, HistoryTable};
use std::collections::BTreeSet;
use test_helpers::{approx_eq, full_history, record};

fn params(growth: f64, margin: f64, policy: StockPolicy) -> ForecastParams {
    ForecastParams::new(growth, margin, policy)
}

#[test]
fn test_cost_identity_and_margin_bounds() {
    let history = full_history(&[("A", 1000.0), ("B", 250.0), ("C", 40.0)], 0.08);
    let engine = ForecastEngine::default();

    for margin_improvement in [-0.5, 0.0, 0.02, 0.9] {
        let forecast = engine
            .project(&history, &params(0.15, margin_improvement, StockPolicy::RatioTarget(0.8)))
            .unwrap();

        for r in &forecast {
            assert_eq!(r.cogs, r.sales - r.gross_profit);
            assert!((0.0..=1.0).contains(&r.gross_margin_pct));
        }
    }
}

#[test]
fn test_row_count_conservation() {
    let mut records = vec![
        record(2024, 1, "A", 100.0, 0.3, 50.0),
        record(2024, 2, "OLD", 100.0, 0.3, 50.0),
        record(2025, 1, "A", 120.0, 0.3, 50.0),
        record(2025, 1, "B", 80.0, 0.3, 50.0),
        record(2025, 7, "NEW", 10.0, 0.3, 50.0),
    ];
    records.push(record(2025, 3, "A", 90.0, 0.3, 50.0));
    let history = HistoryTable::new(2024, 2025, records, Vec::new());

    let forecast = ForecastEngine::default()
        .project(&history, &ForecastParams::default())
        .unwrap();

    let base: BTreeSet<(u32, String)> = history
        .base_records()
        .map(|r| (r.month, r.main_group.clone()))
        .collect();
    let projected: BTreeSet<(u32, String)> = forecast
        .iter()
        .map(|r| (r.month, r.main_group.clone()))
        .collect();

    assert_eq!(forecast.len(), history.base_records().count());
    assert_eq!(base, projected);
    assert!(forecast.iter().all(|r| r.year == 2026));
}

#[test]
fn test_zero_base_sales_stays_zero() {
    let mut history = full_history(&[("A", 1000.0)], 0.1);
    history.records.push(record(2025, 5, "ZERO", 0.0, 0.0, 300.0));

    let adjustments = AdjustmentInputs::new()
        .with_group_target("ZERO", 5.0)
        .with_lesson("ZERO", 5, 10);

    for policy in [StockPolicy::RatioTarget(0.8), StockPolicy::DeltaChange(0.1)] {
        let forecast = ForecastEngine::default()
            .project(&history, &params(0.5, 0.1, policy).with_adjustments(adjustments.clone()))
            .unwrap();
        let zero = forecast.iter().find(|r| r.main_group == "ZERO").unwrap();
        assert_eq!(zero.sales, 0.0);
        assert_eq!(zero.gross_profit, 0.0);
        assert_eq!(zero.stock_cogs_ratio, 0.0);
    }
}

#[test]
fn test_seasonality_neutral_for_unseen_pair() {
    let history = full_history(&[("A", 1000.0)], 0.1);
    let seasonality = SeasonalityTable::from_history(&history.records);
    let engine = ForecastEngine::default();

    assert_eq!(seasonality.index("UNSEEN", 4), 1.0);
    assert_eq!(engine.weights().seasonal_blend(1.0), 1.0);
}

#[test]
fn test_ratio_policy_stock() {
    let history = full_history(&[("A", 1000.0), ("B", 300.0)], 0.05);
    let forecast = ForecastEngine::default()
        .project(&history, &params(0.15, 0.02, StockPolicy::RatioTarget(0.8)))
        .unwrap();

    for r in &forecast {
        assert!(approx_eq(r.stock, r.cogs * 0.8));
        assert!(approx_eq(r.stock_cogs_ratio, 0.8));
    }
}

#[test]
fn test_delta_policy_stock() {
    let history = full_history(&[("A", 1000.0), ("B", 300.0)], 0.05);
    let forecast = ForecastEngine::default()
        .project(&history, &params(0.15, 0.02, StockPolicy::DeltaChange(0.10)))
        .unwrap();

    for r in &forecast {
        let base = history
            .base_records()
            .find(|b| b.month == r.month && b.main_group == r.main_group)
            .unwrap();
        assert!(approx_eq(r.stock, base.stock * 1.10));
    }
}

#[test]
fn test_stock_policy_requires_exactly_one_option() {
    assert!(matches!(
        StockPolicy::from_options(None, None),
        Err(EngineError::InvalidParameter { .. })
    ));
    assert!(matches!(
        StockPolicy::from_options(Some(0.8), Some(0.1)),
        Err(EngineError::InvalidParameter { .. })
    ));
}

#[test]
fn test_growth_blending() {
    let engine = ForecastEngine::default();
    let none = AdjustmentInputs::new();

    for month in 1..=12 {
        assert!(approx_eq(engine.combined_growth_target(0.15, &none, "A", month), 0.15));
    }

    let adjustments = AdjustmentInputs::new()
        .with_monthly_target(1, 0.20)
        .with_group_target("A", 0.10);
    assert!(approx_eq(engine.combined_growth_target(0.15, &adjustments, "A", 1), 0.15));

    let with_lesson = adjustments.with_lesson("A", 1, 5);
    assert!(approx_eq(engine.combined_growth_target(0.15, &with_lesson, "A", 1), 0.25));
}

#[test]
fn test_growth_target_applied_to_sales() {
    // 平稳历史: 趋势 0, 季节指数 1 → 销售额只受综合增长目标影响
    let mut records = Vec::new();
    for year in [2024, 2025] {
        for month in 1..=2 {
            records.push(record(year, month, "A", 1000.0, 0.3, 100.0));
        }
    }
    let history = HistoryTable::new(2024, 2025, records, Vec::new());
    let adjustments = AdjustmentInputs::new()
        .with_monthly_target(1, 0.20)
        .with_group_target("A", 0.10)
        .with_lesson("A", 1, 5);

    let forecast = ForecastEngine::default()
        .project(
            &history,
            &params(0.15, 0.0, StockPolicy::RatioTarget(1.0)).with_adjustments(adjustments),
        )
        .unwrap();

    let jan = forecast.iter().find(|r| r.month == 1).unwrap();
    let feb = forecast.iter().find(|r| r.month == 2).unwrap();
    assert!(approx_eq(jan.sales, 1250.0));
    // 2 月: (0.15 + 0.10) / 2 = 0.125
    assert!(approx_eq(feb.sales, 1125.0));
}

#[test]
fn test_projection_does_not_mutate_history() {
    let history = full_history(&[("A", 1000.0)], 0.1);
    let before = history.clone();

    let engine = ForecastEngine::default();
    let first = engine.project(&history, &ForecastParams::default()).unwrap();
    let second = engine.project(&history, &ForecastParams::default()).unwrap();

    assert_eq!(history, before);
    assert_eq!(first, second);
}
