// ==========================================
// 零售预算预测系统 - 领域模型层
// ==========================================
// 职责: 定义记录、指标、类型
// 红线: 不含文件解析逻辑,不含预测引擎逻辑
// ==========================================

pub mod history;
pub mod metrics;
pub mod record;
pub mod types;

// 重导出核心类型
pub use history::HistoryTable;
pub use metrics::{
    GroupMomentum, GroupTrend, MonthComparisonRow, QualityMetrics, YearSlice, YearSummary,
};
pub use record::{
    days_in_month, stock_cogs_ratio, weekly_stock_cogs_ratio, ForecastRecord, HistoricalRecord,
    MonthlyRecord,
};
pub use types::{ConfidenceLevel, LoadNotice, RecordSource};
