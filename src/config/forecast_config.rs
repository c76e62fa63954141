// ==========================================
// 零售预算预测系统 - 预测配置
// ==========================================
// 职责: 源文件列映射 / 模型权重 / 12 月补全规则 / 置信阈值
// 说明: 模型常量 (0.3 / 0.15 / 0.02) 与补全阈值 (1,000,000) 均为经验值,
//       未经数据校验,此处保留原值以保证结果一致
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// ForecastConfig - 配置根对象
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ForecastConfig {
    #[serde(default)]
    pub source: SourceSchema,

    #[serde(default)]
    pub model: ModelWeights,

    #[serde(default)]
    pub backfill: BackfillRule,

    #[serde(default)]
    pub quality: QualityThresholds,
}

impl ForecastConfig {
    /// 校验配置自洽性
    pub fn validate(&self) -> Result<(), String> {
        if self.source.first.year >= self.source.second.year {
            return Err(format!(
                "历史年度顺序错误: first={} second={}",
                self.source.first.year, self.source.second.year
            ));
        }

        if self.source.month_column.trim().is_empty() || self.source.group_column.trim().is_empty() {
            return Err("月份列/主品类列名不能为空".to_string());
        }

        let weights = [
            ("model.trend_dampening", self.model.trend_dampening),
            ("model.seasonality_weight", self.model.seasonality_weight),
            ("model.lessons_point_weight", self.model.lessons_point_weight),
            ("backfill.materiality_threshold", self.backfill.materiality_threshold),
            ("backfill.flow_multiplier", self.backfill.flow_multiplier),
            ("backfill.stock_multiplier", self.backfill.stock_multiplier),
        ];
        for (key, value) in weights {
            if !value.is_finite() {
                return Err(format!("{} 必须为有限数值", key));
            }
        }

        if !(0.0..=1.0).contains(&self.model.seasonality_weight) {
            return Err(format!(
                "model.seasonality_weight 超出范围 [0, 1]: {}",
                self.model.seasonality_weight
            ));
        }

        if self.quality.min_common_months == 0 {
            return Err("quality.min_common_months 必须 >= 1".to_string());
        }

        Ok(())
    }
}

// ==========================================
// SourceSchema - 源文件结构
// ==========================================
// 源表同一逻辑字段出现两次 (两个年度), 第二次出现时带 ".1" 后缀
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceSchema {
    /// 工作表名称 (不存在时回退到第一个工作表)
    #[serde(default = "default_sheet_name")]
    pub sheet_name: Option<String>,

    /// 表头所在行 (0 起)
    #[serde(default = "default_header_row")]
    pub header_row: usize,

    #[serde(default = "default_month_column")]
    pub month_column: String,

    #[serde(default = "default_group_column")]
    pub group_column: String,

    /// 小计行标记 (出现在月份列中)
    #[serde(default = "default_subtotal_marker")]
    pub subtotal_marker: String,

    #[serde(default = "YearColumns::default_first")]
    pub first: YearColumns,

    #[serde(default = "YearColumns::default_second")]
    pub second: YearColumns,
}

impl Default for SourceSchema {
    fn default() -> Self {
        Self {
            sheet_name: default_sheet_name(),
            header_row: default_header_row(),
            month_column: default_month_column(),
            group_column: default_group_column(),
            subtotal_marker: default_subtotal_marker(),
            first: YearColumns::default_first(),
            second: YearColumns::default_second(),
        }
    }
}

impl SourceSchema {
    pub fn years(&self) -> [&YearColumns; 2] {
        [&self.first, &self.second]
    }

    /// 全部必需列 (用于表头校验)
    pub fn required_columns(&self) -> Vec<&str> {
        let mut columns = vec![self.month_column.as_str(), self.group_column.as_str()];
        for year in self.years() {
            columns.extend(year.columns());
        }
        columns
    }
}

fn default_sheet_name() -> Option<String> {
    Some("Sayfa1".to_string())
}

fn default_header_row() -> usize {
    1
}

fn default_month_column() -> String {
    "Month".to_string()
}

fn default_group_column() -> String {
    "MainGroupDesc".to_string()
}

fn default_subtotal_marker() -> String {
    "Toplam".to_string()
}

// ==========================================
// YearColumns - 单一年度的列名集合
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearColumns {
    pub year: i32,
    pub sales: String,
    pub gross_profit: String,
    pub gross_margin: String,
    pub stock: String,
}

impl YearColumns {
    fn with_suffix(year: i32, suffix: &str) -> Self {
        Self {
            year,
            sales: format!("TY Sales Value TRY2{}", suffix),
            gross_profit: format!("TY Gross Profit TRY2{}", suffix),
            gross_margin: format!("TY Gross Marjin TRY%{}", suffix),
            stock: format!("TY Avg Store Stock Cost TRY2{}", suffix),
        }
    }

    pub fn default_first() -> Self {
        Self::with_suffix(2024, "")
    }

    pub fn default_second() -> Self {
        Self::with_suffix(2025, ".1")
    }

    pub fn columns(&self) -> [&str; 4] {
        [
            self.sales.as_str(),
            self.gross_profit.as_str(),
            self.gross_margin.as_str(),
            self.stock.as_str(),
        ]
    }
}

// ==========================================
// ModelWeights - 预测公式权重
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelWeights {
    /// 有机趋势作用强度
    #[serde(default = "default_trend_dampening")]
    pub trend_dampening: f64,

    /// 季节指数混合权重 (剩余部分向 1.0 中性收敛)
    #[serde(default = "default_seasonality_weight")]
    pub seasonality_weight: f64,

    /// 经验教训每一分对应的增长率
    #[serde(default = "default_lessons_point_weight")]
    pub lessons_point_weight: f64,
}

impl Default for ModelWeights {
    fn default() -> Self {
        Self {
            trend_dampening: default_trend_dampening(),
            seasonality_weight: default_seasonality_weight(),
            lessons_point_weight: default_lessons_point_weight(),
        }
    }
}

impl ModelWeights {
    /// 季节混合因子: (1 - w) + index × w
    pub fn seasonal_blend(&self, index: f64) -> f64 {
        (1.0 - self.seasonality_weight) + index * self.seasonality_weight
    }

    /// 趋势乘子: 1 + trend × dampening
    pub fn trend_multiplier(&self, trend_factor: f64) -> f64 {
        1.0 + trend_factor * self.trend_dampening
    }
}

fn default_trend_dampening() -> f64 {
    0.3
}

fn default_seasonality_weight() -> f64 {
    0.15
}

fn default_lessons_point_weight() -> f64 {
    0.02
}

// ==========================================
// BackfillRule - 12 月补全规则
// ==========================================
// 阈值依赖币种/量级, 其他币种数据需调整
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BackfillRule {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// 12 月销售合计低于该值视为缺失
    #[serde(default = "default_materiality_threshold")]
    pub materiality_threshold: f64,

    /// 销售/毛利/成本 乘数
    #[serde(default = "default_flow_multiplier")]
    pub flow_multiplier: f64,

    /// 库存乘数
    #[serde(default = "default_stock_multiplier")]
    pub stock_multiplier: f64,
}

impl Default for BackfillRule {
    fn default() -> Self {
        Self {
            enabled: true,
            materiality_threshold: default_materiality_threshold(),
            flow_multiplier: default_flow_multiplier(),
            stock_multiplier: default_stock_multiplier(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_materiality_threshold() -> f64 {
    1_000_000.0
}

fn default_flow_multiplier() -> f64 {
    1.12
}

fn default_stock_multiplier() -> f64 {
    1.05
}

// ==========================================
// QualityThresholds - 置信等级阈值
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityThresholds {
    #[serde(default = "default_min_common_months")]
    pub min_common_months: usize,

    #[serde(default = "default_high_fit")]
    pub high_fit: f64,
    #[serde(default = "default_high_consistency")]
    pub high_consistency: f64,

    #[serde(default = "default_medium_fit")]
    pub medium_fit: f64,
    #[serde(default = "default_medium_consistency")]
    pub medium_consistency: f64,

    /// 共同月份不足 2 个时的 r2 兜底值
    #[serde(default = "default_fallback_fit")]
    pub fallback_fit: f64,
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self {
            min_common_months: default_min_common_months(),
            high_fit: default_high_fit(),
            high_consistency: default_high_consistency(),
            medium_fit: default_medium_fit(),
            medium_consistency: default_medium_consistency(),
            fallback_fit: default_fallback_fit(),
        }
    }
}

fn default_min_common_months() -> usize {
    3
}

fn default_high_fit() -> f64 {
    0.8
}

fn default_high_consistency() -> f64 {
    0.7
}

fn default_medium_fit() -> f64 {
    0.6
}

fn default_medium_consistency() -> f64 {
    0.5
}

fn default_fallback_fit() -> f64 {
    0.5
}
