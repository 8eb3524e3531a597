// ==========================================
// BOM 助手 - API层错误类型
// ==========================================
// 职责: 汇总各层错误，转换为面向用户的错误消息
// ==========================================

use crate::config::error::ConfigError;
use crate::engine::error::EngineError;
use crate::importer::error::ImportError;
use crate::sheet::error::SheetError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 表格结构错误
    // ==========================================
    #[error("未找到表头行: 第一列不存在 \"{sentinel}\"")]
    HeaderNotFound { sentinel: String },

    #[error("工作表为空")]
    EmptyWorksheet,

    // ==========================================
    // 输入错误
    // ==========================================
    #[error("回填数据格式错误: {0}")]
    MalformedPayload(String),

    #[error("无效输入: {0}")]
    InvalidInput(String),

    // ==========================================
    // 宿主错误
    // ==========================================
    /// 同步屏障失败，之前已提交的写入保持生效
    #[error("宿主同步失败 [{barrier}]: {message}")]
    HostSyncFailure { barrier: String, message: String },

    #[error("表格访问失败: {0}")]
    SheetAccess(String),

    // ==========================================
    // 配置与通用错误
    // ==========================================
    #[error("配置错误: {0}")]
    Config(String),

    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::HeaderNotFound { sentinel } => ApiError::HeaderNotFound { sentinel },
            EngineError::EmptyWorksheet => ApiError::EmptyWorksheet,
            EngineError::KeyColumnNotFound { .. } => ApiError::InvalidInput(err.to_string()),
        }
    }
}

impl From<SheetError> for ApiError {
    fn from(err: SheetError) -> Self {
        match err {
            SheetError::SyncFailed { barrier, message } => {
                ApiError::HostSyncFailure { barrier, message }
            }
            other => ApiError::SheetAccess(other.to_string()),
        }
    }
}

impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::NoFieldsSelected => ApiError::InvalidInput(err.to_string()),
            other => ApiError::MalformedPayload(other.to_string()),
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::InternalError(format!("JSON 序列化失败: {}", err))
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
