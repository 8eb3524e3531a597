// ==========================================
// BOM 助手 - 引擎层
// ==========================================
// 职责: 表头定位、列解析、提取、回填、格式规划
// 红线: 引擎只处理网格快照，不访问宿主，不做 I/O
// ==========================================

pub mod column_resolver;
pub mod error;
pub mod extraction;
pub mod formatting;
pub mod header_locator;
pub mod read_only;
pub mod reconciliation;

// 重导出核心引擎
pub use column_resolver::{normalize_label, resolve_column, ColumnMap};
pub use error::{EngineError, EngineResult};
pub use extraction::{ExtractionEngine, ExtractionReport, SkipReason, SkippedRow};
pub use formatting::{
    plan_export_formatting, plan_header_formatting, plan_import_formatting,
    plan_matched_row_fills, plan_reset_formatting,
};
pub use header_locator::{HeaderLocator, DEFAULT_HEADER_SENTINEL};
pub use read_only::{ReadOnlyPolicy, DEFAULT_READ_ONLY_MARKER};
pub use reconciliation::{
    CellWrite, KeyColumnStatus, NewColumn, ReadOnlySkip, ReconcileOutcome, ReconciliationEngine,
};
