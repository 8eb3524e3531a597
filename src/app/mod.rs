// ==========================================
// BOM 助手 - 应用层
// ==========================================
// 职责: 导出/回填两种模式的界面状态，连接 API 与调用方
// ==========================================

pub mod state;

// 重导出
pub use state::{get_default_db_path, AppState, ExportState, ImportState};
