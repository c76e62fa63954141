// ==========================================
// 零售预算预测系统 - 预算编排器
// ==========================================
// 用途: 协调 预测 → 合并 → 汇总 → 质量评估 → 品类诊断 的执行顺序
// 红线: 全有或全无, 任一步失败不返回部分结果
// ==========================================

use crate::config::ForecastConfig;
use crate::domain::{
    ForecastRecord, GroupMomentum, GroupTrend, HistoryTable, LoadNotice, MonthComparisonRow,
    MonthlyRecord, QualityMetrics, YearSummary,
};
use crate::engine::error::EngineResult;
use crate::engine::forecast::ForecastEngine;
use crate::engine::params::ForecastParams;
use crate::engine::quality::QualityEvaluator;
use crate::engine::summary::SummaryEngine;
use crate::engine::trend::TrendAnalyzer;
use crate::error::ForecastResult;
use crate::importer::HistoryLoader;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};
use uuid::Uuid;

// ==========================================
// BudgetRun - 单次预算运行结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetRun {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub first_year: i32,
    pub second_year: i32,
    pub forecast_year: i32,
    pub params: ForecastParams,

    /// 历史 + 预测 合并表
    pub combined: Vec<MonthlyRecord>,
    pub forecast: Vec<ForecastRecord>,
    pub summary: BTreeMap<i32, YearSummary>,
    pub quality: QualityMetrics,
    pub group_trends: Vec<GroupTrend>,
    pub momentum: Vec<GroupMomentum>,
    /// 加载阶段的提示事件, 由调用方决定如何展示
    pub notices: Vec<LoadNotice>,
}

impl BudgetRun {
    /// 参与对比的三个年度
    pub fn years(&self) -> [i32; 3] {
        [self.first_year, self.second_year, self.forecast_year]
    }

    /// 当前语言下的报告标题行, 例如 "Budget forecast 2026 | Forecast confidence: High"
    pub fn headline(&self) -> String {
        let title = crate::i18n::t_with_args(
            "report.title",
            &[("year", &self.forecast_year.to_string())],
        );
        let confidence = crate::i18n::t_with_args(
            "report.confidence",
            &[("level", &self.quality.confidence_level.label())],
        );
        format!("{} | {}", title, confidence)
    }

    /// 单月三年对比表
    pub fn month_comparison(&self, month: u32) -> Vec<MonthComparisonRow> {
        SummaryEngine::new().month_comparison(&self.combined, month, &self.years())
    }
}

// ==========================================
// BudgetPlanner - 预算编排器
// ==========================================
pub struct BudgetPlanner {
    config: ForecastConfig,
    forecast: ForecastEngine,
    quality: QualityEvaluator,
    summary: SummaryEngine,
    trend: TrendAnalyzer,
}

impl BudgetPlanner {
    pub fn new(config: ForecastConfig) -> Self {
        Self {
            forecast: ForecastEngine::new(config.model),
            quality: QualityEvaluator::new(config.quality),
            summary: SummaryEngine::new(),
            trend: TrendAnalyzer::new(),
            config,
        }
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// 对已加载的历史表执行一次完整预算
    ///
    /// 历史表只读, 同一历史表可以用不同参数多次调用
    pub fn run(&self, history: &HistoryTable, params: &ForecastParams) -> EngineResult<BudgetRun> {
        let run_id = Uuid::new_v4();
        info!(%run_id, groups = history.main_groups().len(), "开始预算运行");

        // 1. 预测
        let forecast = self.forecast.project(history, params)?;

        // 2. 合并 + 年度汇总
        let combined = self.summary.combine(history, &forecast);
        let summary = self.summary.year_summaries(&combined);

        // 3. 质量评估 (只看历史年度)
        let quality = self.quality.evaluate(history);

        // 4. 品类诊断
        let group_trends = self.trend.group_trends(history);
        let momentum = self.trend.recent_momentum(history);
        debug!(
            trends = group_trends.len(),
            momentum = momentum.len(),
            "品类诊断完成"
        );

        let run = BudgetRun {
            run_id,
            generated_at: Utc::now(),
            first_year: history.first_year,
            second_year: history.second_year,
            forecast_year: history.second_year + 1,
            params: params.clone(),
            combined,
            forecast,
            summary,
            quality,
            group_trends,
            momentum,
            notices: history.notices.clone(),
        };

        info!(
            %run_id,
            forecast_rows = run.forecast.len(),
            confidence = run.quality.confidence_level.as_str(),
            "预算运行完成"
        );
        Ok(run)
    }

    /// 加载文件并执行预算
    pub fn run_file<P: AsRef<Path>>(
        &self,
        file_path: P,
        params: &ForecastParams,
    ) -> ForecastResult<BudgetRun> {
        let history = HistoryLoader::new(self.config.clone()).load_file(file_path)?;
        Ok(self.run(&history, params)?)
    }
}

impl Default for BudgetPlanner {
    fn default() -> Self {
        Self::new(ForecastConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{HistoricalRecord, RecordSource};
    use crate::engine::params::StockPolicy;

    fn history() -> HistoryTable {
        let mut records = Vec::new();
        for (year, scale) in [(2024, 1.0), (2025, 1.1)] {
            for month in 1..=12 {
                for (group, base) in [("A", 1000.0), ("B", 400.0)] {
                    let sales = base * scale * (1.0 + month as f64 / 10.0);
                    records.push(HistoricalRecord::new(
                        year,
                        month,
                        group,
                        sales,
                        sales * 0.3,
                        0.3,
                        sales * 1.5,
                        RecordSource::Actual,
                    ));
                }
            }
        }
        HistoryTable::new(2024, 2025, records, Vec::new())
    }

    #[test]
    fn test_run_produces_complete_bundle() {
        let history = history();
        let run = BudgetPlanner::default()
            .run(&history, &ForecastParams::default())
            .unwrap();

        assert_eq!(run.forecast_year, 2026);
        assert_eq!(run.forecast.len(), 24);
        assert_eq!(run.combined.len(), history.len() + 24);
        assert_eq!(run.summary.keys().copied().collect::<Vec<_>>(), vec![2024, 2025, 2026]);
        assert_eq!(run.group_trends.len(), 2);
        assert_eq!(run.momentum.len(), 2);
        assert!(!run.quality.is_insufficient());
    }

    #[test]
    fn test_run_rejects_invalid_params() {
        let params = ForecastParams::new(0.1, 0.0, StockPolicy::DeltaChange(-2.0));
        assert!(BudgetPlanner::default().run(&history(), &params).is_err());
    }

    #[test]
    fn test_month_comparison_from_run() {
        let run = BudgetPlanner::default()
            .run(&history(), &ForecastParams::default())
            .unwrap();
        let rows = run.month_comparison(6);

        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.years.len() == 3));
        assert!(rows.iter().all(|r| r.years.iter().all(|y| y.sales > 0.0)));
    }
}
