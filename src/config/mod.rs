// ==========================================
// 零售预算预测系统 - 配置层
// ==========================================
// 职责: 源文件结构、模型权重、补全规则、置信阈值
// 存储: JSON 文件 (可选, 缺省使用内置默认值)
// ==========================================

pub mod config_manager;
pub mod forecast_config;

// 重导出核心配置类型
pub use config_manager::{read_json_file, ConfigError, ConfigManager};
pub use forecast_config::{
    BackfillRule, ForecastConfig, ModelWeights, QualityThresholds, SourceSchema, YearColumns,
};
