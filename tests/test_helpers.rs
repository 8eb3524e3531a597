// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 网格构造、回填数据构造、内存宿主与临时配置库
// ==========================================

#![allow(dead_code)]

use bom_assistant::api::BomApi;
use bom_assistant::config::EngineConfig;
use bom_assistant::domain::{CellValue, Grid, ImportRecord};
use bom_assistant::importer::parse_import_payload;
use bom_assistant::sheet::MemorySheet;
use std::error::Error;
use std::sync::Arc;
use tempfile::NamedTempFile;

/// 文本网格（空字符串保留为空文本）
pub fn grid(rows: &[&[&str]]) -> Grid {
    rows.iter()
        .map(|row| row.iter().map(|cell| CellValue::from(*cell)).collect())
        .collect()
}

/// 基础场景: 表头在第 0 行
pub fn scenario_grid() -> Grid {
    grid(&[&["Designators", "LCSC", "Qty"], &["R1", "C123", "2"]])
}

/// 表头前有标题行、含只读列的 BOM
pub fn titled_bom_grid() -> Grid {
    grid(&[
        &["Project BOM", "", "", ""],
        &["", "", "", ""],
        &["Designators", "LCSC Part Number", "_qtyPerBoard", "Comment"],
        &["R1,R2", "C123", "2", "10k"],
        &["", "", "", ""],
        &["C1", "C456", "1", "100nF"],
        &["U1", "", "1", "MCU"],
    ])
}

/// 解析回填 JSON
pub fn records(json: &str) -> Vec<ImportRecord> {
    parse_import_payload(json).unwrap().records
}

pub fn fields(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

/// 内存宿主 + 默认配置 API
pub fn memory_api(values: Grid) -> (Arc<MemorySheet>, BomApi<MemorySheet, EngineConfig>) {
    memory_api_with_config(values, EngineConfig::default())
}

pub fn memory_api_with_config(
    values: Grid,
    config: EngineConfig,
) -> (Arc<MemorySheet>, BomApi<MemorySheet, EngineConfig>) {
    let sheet = Arc::new(MemorySheet::new(values));
    let api = BomApi::new(Arc::clone(&sheet), config);
    (sheet, api)
}

/// 创建临时配置库
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file
        .path()
        .to_str()
        .ok_or("临时路径不是 UTF-8")?
        .to_string();
    Ok((temp_file, db_path))
}
