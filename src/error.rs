use thiserror::Error;

use crate::registry::RegistryError;

#[derive(Error, Debug)]
pub enum RuunitError {
    #[error("注册错误: {0}")]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Usage(#[from] UsageFault),

    #[error("配置错误: {0}")]
    Config(String),

    #[error("IO 错误: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML 解析错误: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("JSON 错误: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("无效的过滤表达式: {0}")]
    InvalidFilter(#[from] regex::Error),

    #[error("{0}")]
    Other(String),
}

// Add conversion from anyhow::Error
impl From<anyhow::Error> for RuunitError {
    fn from(err: anyhow::Error) -> Self {
        RuunitError::Other(err.to_string())
    }
}

/// 在活动结束前查询了只有结束后才可用的字段
///
/// 这是调用方（通常是 Reporter 实现）的编程错误，不是测试结果。
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("使用错误: {context} 尚未结束, 无法读取 {field}")]
pub struct UsageFault {
    /// 上下文层级（session / suite / case / check）
    pub context: &'static str,
    /// 被查询的字段
    pub field: &'static str,
}

impl UsageFault {
    pub(crate) fn new(context: &'static str, field: &'static str) -> Self {
        Self { context, field }
    }
}

/// Result type for ruunit crate
pub type Result<T> = std::result::Result<T, RuunitError>;
