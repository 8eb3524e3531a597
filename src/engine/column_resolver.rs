// ==========================================
// BOM 助手 - 列解析器
// ==========================================
// 职责: 表头标签 → 列索引（同义词按优先级，去空白 + 大小写不敏感，精确匹配）
// 生命周期: 每次导出/回填操作从表头行重新构建，不缓存
// ==========================================

use crate::domain::types::CellValue;

/// 标签规范化: 去首尾空白 + 小写
pub fn normalize_label(label: &str) -> String {
    label.trim().to_lowercase()
}

/// 在规范化表头中按候选名优先级查找列
///
/// 依次尝试每个候选名，返回第一个命中候选名的首次出现位置
pub fn resolve_column<S: AsRef<str>>(normalized_headers: &[String], candidates: &[S]) -> Option<usize> {
    candidates.iter().find_map(|candidate| {
        let wanted = normalize_label(candidate.as_ref());
        normalized_headers.iter().position(|h| *h == wanted)
    })
}

// ==========================================
// ColumnMap - 表头列映射
// ==========================================
// 同时保存原始标签（只读前缀判定需要原始大小写）
#[derive(Debug, Clone, Default)]
pub struct ColumnMap {
    normalized: Vec<String>,
    original: Vec<String>,
}

impl ColumnMap {
    /// 从表头行构建
    pub fn from_header_row(header_row: &[CellValue]) -> Self {
        let original: Vec<String> = header_row.iter().map(|cell| cell.as_text()).collect();
        let normalized = original.iter().map(|label| normalize_label(label)).collect();
        Self {
            normalized,
            original,
        }
    }

    /// 按候选名优先级解析列
    pub fn resolve<S: AsRef<str>>(&self, candidates: &[S]) -> Option<usize> {
        resolve_column(&self.normalized, candidates)
    }

    /// 每个候选名各自命中的列（按候选优先级，去重）
    ///
    /// 用于"逐行取第一个有值的候选列"
    pub fn candidate_columns<S: AsRef<str>>(&self, candidates: &[S]) -> Vec<usize> {
        let mut columns = Vec::new();
        for candidate in candidates {
            let wanted = normalize_label(candidate.as_ref());
            if let Some(idx) = self.normalized.iter().position(|h| *h == wanted) {
                if !columns.contains(&idx) {
                    columns.push(idx);
                }
            }
        }
        columns
    }

    /// 是否存在该表头（规范化比较）
    pub fn contains(&self, label: &str) -> bool {
        let wanted = normalize_label(label);
        self.normalized.iter().any(|h| *h == wanted)
    }

    /// 原始表头标签
    pub fn original_label(&self, column: usize) -> Option<&str> {
        self.original.get(column).map(|s| s.as_str())
    }

    pub fn normalized_labels(&self) -> &[String] {
        &self.normalized
    }

    pub fn original_labels(&self) -> &[String] {
        &self.original
    }

    pub fn len(&self) -> usize {
        self.original.len()
    }

    pub fn is_empty(&self) -> bool {
        self.original.is_empty()
    }
}
