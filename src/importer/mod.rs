// ==========================================
// BOM 助手 - 导入层
// ==========================================
// 职责: 回填 JSON 解析、可选字段发现、默认勾选
// ==========================================

pub mod error;
pub mod payload;

pub use error::{ImportError, ImportResult};
pub use payload::{default_selection, parse_import_payload, FieldSelection, ImportPayload};
