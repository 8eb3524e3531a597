// ==========================================
// BOM 助手 - 表格访问错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 表格访问错误类型
#[derive(Error, Debug)]
pub enum SheetError {
    // ===== 宿主同步错误 =====
    #[error("宿主同步失败 ({barrier}): {message}")]
    SyncFailed { barrier: String, message: String },

    #[error("宿主拒绝请求: {0}")]
    HostRejected(String),

    #[error("宿主状态不可用: {0}")]
    HostUnavailable(String),

    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {0}（仅支持 .xlsx/.xls/.csv）")]
    UnsupportedFormat(String),

    #[error("Excel 解析失败: {0}")]
    ExcelParseError(String),

    #[error("CSV 读写失败: {0}")]
    CsvError(String),

    #[error("文件读写失败: {0}")]
    Io(String),
}

impl From<std::io::Error> for SheetError {
    fn from(err: std::io::Error) -> Self {
        SheetError::Io(err.to_string())
    }
}

impl From<csv::Error> for SheetError {
    fn from(err: csv::Error) -> Self {
        SheetError::CsvError(err.to_string())
    }
}

impl From<calamine::Error> for SheetError {
    fn from(err: calamine::Error) -> Self {
        SheetError::ExcelParseError(err.to_string())
    }
}

/// Result 类型别名
pub type SheetResult<T> = Result<T, SheetError>;
