// ==========================================
// BOM 助手 - 引擎配置
// ==========================================
// 职责: 表头哨兵、只读前缀、配色、回填默认勾选字段
// ==========================================

use crate::domain::types::Color;
use crate::engine::header_locator::DEFAULT_HEADER_SENTINEL;
use crate::engine::read_only::DEFAULT_READ_ONLY_MARKER;
use serde::{Deserialize, Serialize};

/// 配置键
pub mod config_keys {
    pub const HEADER_SENTINEL: &str = "header_sentinel";
    pub const READ_ONLY_MARKER: &str = "read_only_marker";
    pub const APPLY_FORMATTING: &str = "apply_formatting";
    pub const HEADER_FILL: &str = "palette.header_fill";
    pub const HEADER_FONT: &str = "palette.header_font";
    pub const READ_ONLY_FILL: &str = "palette.read_only_fill";
    pub const MATCHED_FILL: &str = "palette.matched_fill";
    pub const EXPORT_DATA_FILL: &str = "palette.export_data_fill";
    pub const DEFAULT_FONT: &str = "palette.default_font";
    pub const DEFAULT_IMPORT_FIELDS: &str = "import.default_fields";
    pub const EXCLUDED_IMPORT_FIELDS: &str = "import.excluded_fields";
}

/// 回填时默认勾选的字段（库存/价格/状态类）
pub const DEFAULT_IMPORT_PRESET: &[&str] = &[
    "lcscComponentId",
    "overseasStockCount",
    "postStockCount",
    "privateStockCount",
    "idleStockCount",
    "status",
    "error",
    "lastOrdered",
    "startNumber",
    "jlcGoodsPrice",
    "gsGoodsPrice",
];

/// 不参与字段勾选的字段
pub const DEFAULT_EXCLUDED_FIELDS: &[&str] = &["attributes"];

/// 配色方案
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatPalette {
    pub header_fill: Color,      // 表头背景
    pub header_font: Color,      // 表头字体
    pub read_only_fill: Color,   // 只读列背景
    pub matched_fill: Color,     // 回填成功行背景
    pub export_data_fill: Color, // 导出数据区背景
    pub default_font: Color,     // 重置字体色
}

impl Default for FormatPalette {
    fn default() -> Self {
        Self {
            header_fill: Color::new("#4472C4"),
            header_font: Color::new("white"),
            read_only_fill: Color::new("#F5F5F5"),
            matched_fill: Color::new("#E2EFDA"),
            export_data_fill: Color::new("#E6F3FF"),
            default_font: Color::new("black"),
        }
    }
}

/// 引擎配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub header_sentinel: String,
    pub read_only_marker: char,
    pub apply_formatting: bool,
    pub palette: FormatPalette,
    pub default_import_fields: Vec<String>,
    pub excluded_import_fields: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            header_sentinel: DEFAULT_HEADER_SENTINEL.to_string(),
            read_only_marker: DEFAULT_READ_ONLY_MARKER,
            apply_formatting: true,
            palette: FormatPalette::default(),
            default_import_fields: DEFAULT_IMPORT_PRESET.iter().map(|s| s.to_string()).collect(),
            excluded_import_fields: DEFAULT_EXCLUDED_FIELDS.iter().map(|s| s.to_string()).collect(),
        }
    }
}
