// ==========================================
// 零售预算预测系统 - 核心库
// ==========================================
// 输入: 两年 (月 × 主品类) 历史实际值
// 输出: 预测年度 销售 / 毛利 / 库存 + 质量评估 + 年度汇总
// 系统定位: 决策支持 (参数由人工给定, 引擎只做确定性计算)
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "en");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 记录与指标
pub mod domain;

// 配置层 - 源表结构 / 模型权重
pub mod config;

// 导入层 - 源表 → 历史表
pub mod importer;

// 引擎层 - 预测与评估
pub mod engine;

// 导出层 - JSON / CSV
pub mod export;

// 顶层错误
pub mod error;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    ConfidenceLevel, ForecastRecord, HistoricalRecord, HistoryTable, LoadNotice, MonthlyRecord,
    QualityMetrics, RecordSource, YearSummary,
};

// 配置
pub use config::{ConfigManager, ForecastConfig};

// 导入
pub use importer::{HistoryLoader, ImportError};

// 引擎
pub use engine::{
    AdjustmentInputs, BudgetPlanner, BudgetRun, EngineError, ForecastEngine, ForecastParams,
    QualityEvaluator, StockPolicy,
};

// 错误
pub use error::{ForecastError, ForecastResult};

// ==========================================
// 系统常量
// ==========================================

/// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 系统名称
pub const APP_NAME: &str = "零售预算预测系统";
