// ==========================================
// BOM 助手 - 表格访问层
// ==========================================
// 职责: 宿主表格访问接口、命令队列、内存/文件宿主
// ==========================================

pub mod command;
pub mod error;
pub mod file_sheet;
pub mod memory_sheet;
pub mod session;
pub mod sheet_access;

// 重导出核心类型
pub use command::{SheetCommand, UsedRange};
pub use error::{SheetError, SheetResult};
pub use file_sheet::{CsvGridLoader, ExcelGridLoader, FileSheet, GridLoader};
pub use memory_sheet::MemorySheet;
pub use session::SheetSession;
pub use sheet_access::SheetAccess;
