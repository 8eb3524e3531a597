// ==========================================
// BOM 助手 - 领域模型层
// ==========================================
// 职责: 定义单元格/网格类型、BOM 记录、字段注册表
// 红线: 不含宿主访问逻辑，不含引擎逻辑
// ==========================================

pub mod bom;
pub mod field;
pub mod types;

// 重导出核心类型
pub use bom::{BomRecord, ImportRecord};
pub use field::{BomField, FieldKind, FieldSpec, FIELD_REGISTRY, KEY_FIELD};
pub use types::{grid_width, rectangularize, CellValue, Color, Grid, HeaderLocation, Region};
