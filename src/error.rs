// ==========================================
// 零售预算预测系统 - 顶层错误类型
// ==========================================
// 职责: 汇总各层错误, 供编排器与命令行入口统一传播
// ==========================================

use crate::config::ConfigError;
use crate::engine::EngineError;
use crate::export::ExportError;
use crate::importer::ImportError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ForecastError {
    /// 源文件读取 / 表头 / 空数据
    #[error("数据导入失败: {0}")]
    Import(#[from] ImportError),

    /// 预测参数非法
    #[error("预测计算失败: {0}")]
    Engine(#[from] EngineError),

    #[error("结果导出失败: {0}")]
    Export(#[from] ExportError),

    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// Result 类型别名
pub type ForecastResult<T> = Result<T, ForecastError>;
