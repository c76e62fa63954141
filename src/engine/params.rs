// ==========================================
// 零售预算预测系统 - 预测参数
// ==========================================
// 职责: 通用增长参数 / 毛利率改善 / 库存策略 / 三类调整映射
// 红线: 库存策略二选一, 在类型层面排除 "都不给" 与 "都给"
// ==========================================

use crate::engine::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 经验教训评分取值范围
pub const LESSONS_SCORE_MIN: i32 = -10;
pub const LESSONS_SCORE_MAX: i32 = 10;

// ==========================================
// StockPolicy - 库存预测策略
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum StockPolicy {
    /// 目标库存/成本比: stock = cogs × target
    RatioTarget(f64),
    /// 相对基准年库存的变化率: stock = base_stock × (1 + pct)
    DeltaChange(f64),
}

impl Default for StockPolicy {
    fn default() -> Self {
        StockPolicy::RatioTarget(0.8)
    }
}

impl StockPolicy {
    /// 由两个可选参数构造策略 (必须恰好提供一个)
    pub fn from_options(
        stock_ratio_target: Option<f64>,
        stock_change_pct: Option<f64>,
    ) -> EngineResult<Self> {
        let policy = match (stock_ratio_target, stock_change_pct) {
            (Some(ratio), None) => StockPolicy::RatioTarget(ratio),
            (None, Some(pct)) => StockPolicy::DeltaChange(pct),
            (None, None) => {
                return Err(EngineError::invalid(
                    "stock_policy",
                    "必须提供 stock_ratio_target 或 stock_change_pct 之一",
                ))
            }
            (Some(_), Some(_)) => {
                return Err(EngineError::invalid(
                    "stock_policy",
                    "stock_ratio_target 与 stock_change_pct 不能同时提供",
                ))
            }
        };
        policy.validate()?;
        Ok(policy)
    }

    pub fn validate(&self) -> EngineResult<()> {
        match *self {
            StockPolicy::RatioTarget(ratio) => {
                if !ratio.is_finite() || ratio < 0.0 {
                    return Err(EngineError::invalid(
                        "stock_ratio_target",
                        format!("必须为非负有限数, 实际 {}", ratio),
                    ));
                }
            }
            StockPolicy::DeltaChange(pct) => {
                if !pct.is_finite() || pct < -1.0 {
                    return Err(EngineError::invalid(
                        "stock_change_pct",
                        format!("必须为 >= -1 的有限数, 实际 {}", pct),
                    ));
                }
            }
        }
        Ok(())
    }

    /// 计算预测库存
    pub fn project(&self, projected_cogs: f64, base_stock: f64) -> f64 {
        match *self {
            StockPolicy::RatioTarget(ratio) => projected_cogs * ratio,
            StockPolicy::DeltaChange(pct) => base_stock * (1.0 + pct),
        }
    }
}

// ==========================================
// AdjustmentInputs - 用户调整映射
// ==========================================
// 三个映射相互独立, 未命中的键回退到调用方给定的默认值
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentInputs {
    /// 月份 → 增长率 (对该月所有品类生效)
    #[serde(default)]
    pub monthly_growth_targets: BTreeMap<u32, f64>,

    /// 主品类 → 增长率 (对该品类所有月份生效)
    #[serde(default)]
    pub maingroup_growth_targets: BTreeMap<String, f64>,

    /// (主品类, 月份) → 评分 [-10, 10]
    #[serde(default, with = "lessons_wire")]
    pub lessons_learned: BTreeMap<(String, u32), i32>,
}

impl AdjustmentInputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_monthly_target(mut self, month: u32, rate: f64) -> Self {
        self.monthly_growth_targets.insert(month, rate);
        self
    }

    pub fn with_group_target(mut self, main_group: impl Into<String>, rate: f64) -> Self {
        self.maingroup_growth_targets.insert(main_group.into(), rate);
        self
    }

    pub fn with_lesson(mut self, main_group: impl Into<String>, month: u32, score: i32) -> Self {
        self.lessons_learned.insert((main_group.into(), month), score);
        self
    }

    pub fn monthly_target(&self, month: u32, default: f64) -> f64 {
        self.monthly_growth_targets
            .get(&month)
            .copied()
            .unwrap_or(default)
    }

    pub fn group_target(&self, main_group: &str, default: f64) -> f64 {
        self.maingroup_growth_targets
            .get(main_group)
            .copied()
            .unwrap_or(default)
    }

    pub fn lessons_score(&self, main_group: &str, month: u32) -> i32 {
        self.lessons_learned
            .get(&(main_group.to_string(), month))
            .copied()
            .unwrap_or(0)
    }

    pub fn validate(&self) -> EngineResult<()> {
        for (&month, &rate) in &self.monthly_growth_targets {
            check_month("monthly_growth_targets", month)?;
            check_growth(&format!("monthly_growth_targets[{}]", month), rate)?;
        }
        for (group, &rate) in &self.maingroup_growth_targets {
            check_growth(&format!("maingroup_growth_targets[{}]", group), rate)?;
        }
        for ((group, month), &score) in &self.lessons_learned {
            check_month("lessons_learned", *month)?;
            if !(LESSONS_SCORE_MIN..=LESSONS_SCORE_MAX).contains(&score) {
                return Err(EngineError::invalid(
                    format!("lessons_learned[{}|{}]", group, month),
                    format!(
                        "评分必须在 [{}, {}] 内, 实际 {}",
                        LESSONS_SCORE_MIN, LESSONS_SCORE_MAX, score
                    ),
                ));
            }
        }
        Ok(())
    }
}

// ==========================================
// ForecastParams - 单次预测调用参数
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastParams {
    /// 通用增长率 (调整映射未命中时的默认值)
    #[serde(default = "default_growth_param")]
    pub growth_param: f64,

    /// 毛利率改善 (绝对值, 0.02 = +2 个百分点)
    #[serde(default = "default_margin_improvement")]
    pub margin_improvement: f64,

    #[serde(default)]
    pub stock_policy: StockPolicy,

    #[serde(default)]
    pub adjustments: AdjustmentInputs,
}

impl Default for ForecastParams {
    fn default() -> Self {
        Self {
            growth_param: default_growth_param(),
            margin_improvement: default_margin_improvement(),
            stock_policy: StockPolicy::default(),
            adjustments: AdjustmentInputs::default(),
        }
    }
}

impl ForecastParams {
    pub fn new(growth_param: f64, margin_improvement: f64, stock_policy: StockPolicy) -> Self {
        Self {
            growth_param,
            margin_improvement,
            stock_policy,
            adjustments: AdjustmentInputs::default(),
        }
    }

    pub fn with_adjustments(mut self, adjustments: AdjustmentInputs) -> Self {
        self.adjustments = adjustments;
        self
    }

    /// 校验参数 (越界即失败, 不做静默截断)
    pub fn validate(&self) -> EngineResult<()> {
        check_growth("growth_param", self.growth_param)?;

        if !self.margin_improvement.is_finite() || !(-1.0..=1.0).contains(&self.margin_improvement)
        {
            return Err(EngineError::invalid(
                "margin_improvement",
                format!("必须在 [-1, 1] 内, 实际 {}", self.margin_improvement),
            ));
        }

        self.stock_policy.validate()?;
        self.adjustments.validate()
    }
}

fn default_growth_param() -> f64 {
    0.15
}

fn default_margin_improvement() -> f64 {
    0.02
}

fn check_month(field: &str, month: u32) -> EngineResult<()> {
    if (1..=12).contains(&month) {
        Ok(())
    } else {
        Err(EngineError::invalid(
            field,
            format!("月份必须在 1..=12 内, 实际 {}", month),
        ))
    }
}

/// 增长率: 有限数且 >= -1 (销售额不能为负)
fn check_growth(field: &str, rate: f64) -> EngineResult<()> {
    if rate.is_finite() && rate >= -1.0 {
        Ok(())
    } else {
        Err(EngineError::invalid(
            field,
            format!("增长率必须为 >= -1 的有限数, 实际 {}", rate),
        ))
    }
}

// ==========================================
// 经验教训映射的 JSON 表示
// ==========================================
// JSON 对象键只能是字符串, 元组键以 "主品类|月份" 编码
mod lessons_wire {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::BTreeMap;

    pub fn serialize<S>(map: &BTreeMap<(String, u32), i32>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let wire: BTreeMap<String, i32> = map
            .iter()
            .map(|((group, month), score)| (format!("{}|{}", group, month), *score))
            .collect();
        wire.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<BTreeMap<(String, u32), i32>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let wire = BTreeMap::<String, i32>::deserialize(deserializer)?;
        let mut map = BTreeMap::new();
        for (key, score) in wire {
            let (group, month) = key
                .rsplit_once('|')
                .ok_or_else(|| D::Error::custom(format!("键格式应为 \"主品类|月份\": {}", key)))?;
            let month: u32 = month
                .trim()
                .parse()
                .map_err(|_| D::Error::custom(format!("月份无法解析: {}", key)))?;
            map.insert((group.to_string(), month), score);
        }
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_policy_from_options() {
        assert_eq!(
            StockPolicy::from_options(Some(0.8), None).unwrap(),
            StockPolicy::RatioTarget(0.8)
        );
        assert_eq!(
            StockPolicy::from_options(None, Some(0.1)).unwrap(),
            StockPolicy::DeltaChange(0.1)
        );
        assert!(StockPolicy::from_options(None, None).is_err());
        assert!(StockPolicy::from_options(Some(0.8), Some(0.1)).is_err());
        assert!(StockPolicy::from_options(Some(-0.5), None).is_err());
    }

    #[test]
    fn test_stock_policy_project() {
        assert!((StockPolicy::RatioTarget(0.8).project(100.0, 999.0) - 80.0).abs() < 1e-12);
        assert!((StockPolicy::DeltaChange(0.1).project(999.0, 200.0) - 220.0).abs() < 1e-9);
    }

    #[test]
    fn test_adjustment_lookup_fallback() {
        let adj = AdjustmentInputs::new()
            .with_monthly_target(1, 0.2)
            .with_group_target("A", 0.1)
            .with_lesson("A", 1, 5);

        assert_eq!(adj.monthly_target(1, 0.15), 0.2);
        assert_eq!(adj.monthly_target(2, 0.15), 0.15);
        assert_eq!(adj.group_target("A", 0.15), 0.1);
        assert_eq!(adj.group_target("B", 0.15), 0.15);
        assert_eq!(adj.lessons_score("A", 1), 5);
        assert_eq!(adj.lessons_score("A", 2), 0);
    }

    #[test]
    fn test_params_validate() {
        assert!(ForecastParams::default().validate().is_ok());

        let mut params = ForecastParams::default();
        params.margin_improvement = 1.5;
        assert!(params.validate().is_err());

        let mut params = ForecastParams::default();
        params.growth_param = f64::NAN;
        assert!(params.validate().is_err());

        let params = ForecastParams::default()
            .with_adjustments(AdjustmentInputs::new().with_lesson("A", 3, 11));
        assert!(matches!(
            params.validate(),
            Err(EngineError::InvalidParameter { .. })
        ));

        let params = ForecastParams::default()
            .with_adjustments(AdjustmentInputs::new().with_monthly_target(13, 0.1));
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_params_json_wire_format() {
        let json = r#"{
            "growth_param": 0.1,
            "stock_policy": { "kind": "delta_change", "value": 0.05 },
            "adjustments": {
                "monthly_growth_targets": { "1": 0.2 },
                "lessons_learned": { "GIDA|3": -4 }
            }
        }"#;

        let params: ForecastParams = serde_json::from_str(json).unwrap();
        assert_eq!(params.growth_param, 0.1);
        assert_eq!(params.margin_improvement, 0.02);
        assert_eq!(params.stock_policy, StockPolicy::DeltaChange(0.05));
        assert_eq!(params.adjustments.monthly_target(1, 0.0), 0.2);
        assert_eq!(params.adjustments.lessons_score("GIDA", 3), -4);

        let back = serde_json::to_value(&params).unwrap();
        assert_eq!(back["adjustments"]["lessons_learned"]["GIDA|3"], -4);
    }

    #[test]
    fn test_lessons_wire_rejects_bad_key() {
        let json = r#"{ "adjustments": { "lessons_learned": { "GIDA": 3 } } }"#;
        assert!(serde_json::from_str::<ForecastParams>(json).is_err());
    }
}
