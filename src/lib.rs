// ==========================================
// BOM 助手 - 核心库
// ==========================================
// 功能: 表格 BOM 导出为 JSON，外部 JSON 数据按 LCSC 料号回填
// 技术栈: Rust + SQLite（配置） + CSV/Excel（文件宿主）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 单元格、记录、字段注册表
pub mod domain;

// 引擎层 - 表头定位、提取、回填
pub mod engine;

// 表格访问层 - 宿主接口、命令队列、同步屏障
pub mod sheet;

// 导入层 - 回填数据解析
pub mod importer;

// 配置层 - 引擎配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 导出/回填操作
pub mod api;

// 应用层 - 界面状态
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

pub use domain::{BomField, BomRecord, CellValue, Grid, HeaderLocation, ImportRecord};

pub use engine::{ExtractionEngine, HeaderLocator, ReadOnlyPolicy, ReconciliationEngine};

pub use sheet::{MemorySheet, SheetAccess, SheetSession};

pub use api::{ApiError, BomApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "BOM 助手";
