// ==========================================
// BOM 助手 - 只读列策略
// ==========================================
// 规则: 原始表头（大小写未折叠）以保留前缀开头的列为只读列
// 只读列: 可作为提取来源，不可作为回填写入目标，仅做灰色标记
// ==========================================

use crate::engine::column_resolver::ColumnMap;

/// 默认只读前缀
pub const DEFAULT_READ_ONLY_MARKER: char = '_';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadOnlyPolicy {
    marker: char,
}

impl ReadOnlyPolicy {
    pub fn new(marker: char) -> Self {
        Self { marker }
    }

    pub fn marker(&self) -> char {
        self.marker
    }

    /// 原始表头是否为只读列（按原文判断，不裁剪空白）
    pub fn is_read_only(&self, original_label: &str) -> bool {
        original_label.starts_with(self.marker)
    }

    /// 列是否只读
    pub fn is_read_only_column(&self, columns: &ColumnMap, column: usize) -> bool {
        columns
            .original_label(column)
            .map(|label| self.is_read_only(label))
            .unwrap_or(false)
    }

    /// 所有只读列索引
    pub fn read_only_columns(&self, columns: &ColumnMap) -> Vec<usize> {
        (0..columns.len())
            .filter(|&idx| self.is_read_only_column(columns, idx))
            .collect()
    }

    /// 加上只读前缀的列名（历史只读列同义词）
    pub fn marked(&self, name: &str) -> String {
        format!("{}{}", self.marker, name.trim())
    }
}

impl Default for ReadOnlyPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_READ_ONLY_MARKER)
    }
}
