// ==========================================
// BOM 助手 - 基础类型定义
// ==========================================
// 职责: 单元格值、网格、区域、颜色、表头位置
// 红线: 纯数据类型，不依赖任何宿主 API
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// CellValue - 单元格标量值
// ==========================================
// 宿主表格物化后的值只有四种: 空 / 布尔 / 数字 / 文本
// JSON 映射: null / bool / number / string
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl CellValue {
    /// 从 JSON 值构造（对象/数组按 JSON 文本存放）
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => CellValue::Empty,
            serde_json::Value::Bool(b) => CellValue::Bool(*b),
            serde_json::Value::Number(n) => match n.as_f64() {
                Some(f) => CellValue::Number(f),
                None => CellValue::Text(n.to_string()),
            },
            serde_json::Value::String(s) => CellValue::Text(s.clone()),
            other => CellValue::Text(other.to_string()),
        }
    }

    /// 空单元格判定（空行过滤用）
    ///
    /// 只有 Empty 和空字符串算空，纯空白字符串不算
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// 单元格是否"有值"
    ///
    /// 空、空字符串、0、NaN、false 都视为无值
    pub fn has_value(&self) -> bool {
        match self {
            CellValue::Empty => false,
            CellValue::Bool(b) => *b,
            CellValue::Number(n) => *n != 0.0 && !n.is_nan(),
            CellValue::Text(s) => !s.is_empty(),
        }
    }

    /// 文本表示
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Number(n) => n.to_string(),
            CellValue::Text(s) => s.clone(),
        }
    }

    /// 去首尾空白后的文本表示
    pub fn trimmed_text(&self) -> String {
        self.as_text().trim().to_string()
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

/// 网格: 行优先的二维单元格数组
pub type Grid = Vec<Vec<CellValue>>;

/// 网格宽度（最长行的列数）
pub fn grid_width(grid: &Grid) -> usize {
    grid.iter().map(|row| row.len()).max().unwrap_or(0)
}

/// 补齐为矩形网格
pub fn rectangularize(grid: &mut Grid, width: usize) {
    for row in grid.iter_mut() {
        if row.len() < width {
            row.resize(width, CellValue::Empty);
        }
    }
}

// ==========================================
// Region - 矩形区域（0 基索引）
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    pub row: usize,
    pub column: usize,
    pub row_count: usize,
    pub column_count: usize,
}

impl Region {
    pub fn new(row: usize, column: usize, row_count: usize, column_count: usize) -> Self {
        Self {
            row,
            column,
            row_count,
            column_count,
        }
    }

    /// 单行区域
    pub fn row_span(row: usize, column: usize, column_count: usize) -> Self {
        Self::new(row, column, 1, column_count)
    }

    pub fn is_empty(&self) -> bool {
        self.row_count == 0 || self.column_count == 0
    }

    pub fn contains(&self, row: usize, column: usize) -> bool {
        row >= self.row
            && row < self.row + self.row_count
            && column >= self.column
            && column < self.column + self.column_count
    }

    /// 区域内所有单元格坐标（行优先）
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (self.row..self.row + self.row_count)
            .flat_map(move |r| (self.column..self.column + self.column_count).map(move |c| (r, c)))
    }
}

// ==========================================
// Color - 颜色（宿主可识别的颜色字符串，如 "#4472C4" / "white"）
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(pub String);

impl Color {
    pub fn new(value: impl Into<String>) -> Self {
        Color(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ==========================================
// HeaderLocation - 表头定位结果
// ==========================================
// row_index 为 0 是合法表头位置，"未找到"由 Option::None 表达
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderLocation {
    pub row_index: usize,   // 表头所在行
    pub last_column: usize, // 表头行长度（数据区列数）
}

impl HeaderLocation {
    /// 数据区第一行
    pub fn first_data_row(&self) -> usize {
        self.row_index + 1
    }
}
