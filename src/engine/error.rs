// ==========================================
// 零售预算预测系统 - 预测引擎错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 预测引擎错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// 调用参数非法 (库存策略缺失/重复、取值越界、非有限数)
    #[error("参数非法 ({field}): {message}")]
    InvalidParameter { field: String, message: String },
}

impl EngineError {
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::InvalidParameter {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// 预测引擎 Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_parameter_display() {
        let err = EngineError::invalid("growth_param", "必须为有限数");
        assert_eq!(err.to_string(), "参数非法 (growth_param): 必须为有限数");
    }
}
