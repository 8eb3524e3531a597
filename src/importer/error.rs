// ==========================================
// BOM 助手 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ImportError {
    #[error("JSON 解析失败: {0}")]
    MalformedPayload(String),

    #[error("回填数据必须是 JSON 数组")]
    NotAnArray,

    #[error("第 {index} 条记录不是 JSON 对象")]
    RecordNotAnObject { index: usize },

    #[error("回填数据为空")]
    EmptyPayload,

    #[error("未选择任何回填字段")]
    NoFieldsSelected,
}

impl From<serde_json::Error> for ImportError {
    fn from(err: serde_json::Error) -> Self {
        ImportError::MalformedPayload(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
