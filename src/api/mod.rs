// ==========================================
// BOM 助手 - API 层
// ==========================================
// 职责: 对外暴露导出/回填操作，统一错误类型
// ==========================================

pub mod bom_api;
pub mod error;

pub use bom_api::{BomApi, ExportResponse, ImportResponse};
pub use error::{ApiError, ApiResult};
