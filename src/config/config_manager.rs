// ==========================================
// 零售预算预测系统 - 配置管理器
// ==========================================
// 职责: 配置文件定位、读取、校验
// 查找顺序: 显式路径 > 环境变量 > 用户配置目录 > 内置默认值
// ==========================================

use crate::config::forecast_config::ForecastConfig;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// 配置文件路径环境变量
pub const CONFIG_ENV_VAR: &str = "BUDGET_FORECAST_CONFIG";

/// 用户配置目录下的子目录名
pub const CONFIG_DIR_NAME: &str = "budget-forecast";

/// 配置文件名
pub const CONFIG_FILE_NAME: &str = "config.json";

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件不存在: {0}")]
    NotFound(String),

    #[error("配置文件读取失败 ({path}): {message}")]
    ReadError { path: String, message: String },

    #[error("配置文件格式错误 ({path}): {message}")]
    ParseError { path: String, message: String },

    #[error("配置值非法: {0}")]
    InvalidValue(String),
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ConfigManager {
    explicit_path: Option<PathBuf>,
}

impl ConfigManager {
    pub fn new() -> Self {
        Self { explicit_path: None }
    }

    /// 指定配置文件路径 (文件必须存在)
    pub fn with_path<P: AsRef<Path>>(path: P) -> Self {
        Self {
            explicit_path: Some(path.as_ref().to_path_buf()),
        }
    }

    /// 解析本次应使用的配置文件路径
    ///
    /// # 返回
    /// - Some(path): 找到的配置文件
    /// - None: 无配置文件, 使用内置默认值
    pub fn resolve_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.explicit_path {
            return Some(path.clone());
        }

        if let Ok(value) = std::env::var(CONFIG_ENV_VAR) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(PathBuf::from(trimmed));
            }
        }

        default_config_path().filter(|p| p.exists())
    }

    /// 加载并校验预测配置
    pub fn load(&self) -> Result<ForecastConfig, ConfigError> {
        let config = match self.resolve_path() {
            Some(path) => {
                tracing::info!(path = %path.display(), "加载预测配置");
                read_json_file::<ForecastConfig>(&path)?
            }
            None => {
                tracing::debug!("未找到配置文件, 使用内置默认配置");
                ForecastConfig::default()
            }
        };

        config.validate().map_err(ConfigError::InvalidValue)?;
        Ok(config)
    }
}

/// 用户配置目录下的默认配置文件路径
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// 读取 JSON 文件并反序列化
pub fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.display().to_string()));
    }

    let file = File::open(path).map_err(|e| ConfigError::ReadError {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    serde_json::from_reader(BufReader::new(file)).map_err(|e| ConfigError::ParseError {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}
