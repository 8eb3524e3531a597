// ==========================================
// BOM 助手 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 引擎层错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("未找到表头行: 第一列不存在 \"{sentinel}\"")]
    HeaderNotFound { sentinel: String },

    #[error("未找到匹配键列（候选列名: {candidates}）")]
    KeyColumnNotFound { candidates: String },

    #[error("工作表为空")]
    EmptyWorksheet,
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
