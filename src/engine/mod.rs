// ==========================================
// 零售预算预测系统 - 引擎层
// ==========================================
// 职责: 季节指数 / 有机趋势 / 预测公式 / 质量评估 / 汇总对比
// 红线: 引擎不读文件, 不修改历史表, 所有调用同步且无共享可变状态
// ==========================================

pub mod error;
pub mod forecast;
pub mod orchestrator;
pub mod params;
pub mod quality;
pub mod seasonality;
pub mod summary;
pub mod trend;

// 重导出核心引擎
pub use error::{EngineError, EngineResult};
pub use forecast::ForecastEngine;
pub use orchestrator::{BudgetPlanner, BudgetRun};
pub use params::{AdjustmentInputs, ForecastParams, StockPolicy};
pub use quality::QualityEvaluator;
pub use seasonality::SeasonalityTable;
pub use summary::SummaryEngine;
pub use trend::TrendAnalyzer;
