// ==========================================
// BOM 助手 - 提取引擎
// ==========================================
// 职责: 表头以下各行 → BomRecord 序列
// 流程: 空行过滤 → 必填校验（位号 + LCSC 料号） → 逐字段同义词解析 + 类型转换
// 输出: 值快照，保持原始行序
// ==========================================

use crate::domain::bom::BomRecord;
use crate::domain::field::{BomField, FieldKind, FIELD_REGISTRY, KEY_FIELD};
use crate::domain::types::{CellValue, Grid, HeaderLocation};
use crate::engine::column_resolver::ColumnMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, instrument};

/// 行被跳过的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    MissingDesignator,
    MissingKey,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingDesignator => f.write_str("位号为空"),
            SkipReason::MissingKey => f.write_str("LCSC 料号为空"),
        }
    }
}

/// 被跳过的数据行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedRow {
    pub row_index: usize, // 工作表行索引
    pub reason: SkipReason,
}

/// 提取结果
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionReport {
    pub records: Vec<BomRecord>,
    pub skipped: Vec<SkippedRow>,
    pub blank_rows: usize,          // 完全空白的行数
    pub key_column: Option<usize>,  // LCSC 料号列
    pub headers: Vec<String>,       // 规范化表头（诊断用）
}

// ==========================================
// ExtractionEngine - 提取引擎
// ==========================================
pub struct ExtractionEngine;

impl ExtractionEngine {
    pub fn new() -> Self {
        Self
    }

    /// 提取 BOM 记录
    ///
    /// # 参数
    /// - grid: 工作表网格快照
    /// - header: 表头定位结果
    ///
    /// # 返回
    /// - ExtractionReport: 有效记录 + 被跳过行明细
    #[instrument(skip(self, grid), fields(header_row = header.row_index))]
    pub fn extract(&self, grid: &Grid, header: HeaderLocation) -> ExtractionReport {
        let Some(header_row) = grid.get(header.row_index) else {
            return ExtractionReport::default();
        };
        let columns = ColumnMap::from_header_row(header_row);
        let key_column = columns.resolve(KEY_FIELD.synonyms());
        debug!(headers = ?columns.normalized_labels(), key_column = ?key_column, "表头解析完成");

        // 每个字段的候选列（按同义词优先级）
        let field_columns: Vec<(BomField, FieldKind, Vec<usize>)> = FIELD_REGISTRY
            .iter()
            .filter(|spec| spec.field != KEY_FIELD)
            .map(|spec| {
                let mut candidates = columns.candidate_columns(spec.synonyms);
                // 哨兵列即位号列（哨兵可配置为非 designators 的标签）
                if spec.field == BomField::Designator && candidates.is_empty() {
                    candidates.push(0);
                }
                (spec.field, spec.kind, candidates)
            })
            .collect();

        let mut report = ExtractionReport {
            key_column,
            headers: columns.normalized_labels().to_vec(),
            ..Default::default()
        };

        for (offset, row) in grid.iter().skip(header.first_data_row()).enumerate() {
            let row_index = header.first_data_row() + offset;

            // 跳过完全空白的行
            if row.iter().all(CellValue::is_blank) {
                report.blank_rows += 1;
                continue;
            }

            let designator = first_value(row, &column_list(&field_columns, BomField::Designator));
            let key = key_column.map(|idx| cell_text(row, idx)).unwrap_or_default();

            let reason = if designator.is_empty() {
                Some(SkipReason::MissingDesignator)
            } else if key.is_empty() {
                Some(SkipReason::MissingKey)
            } else {
                None
            };
            if let Some(reason) = reason {
                debug!(row_index, designator = %designator, key = %key, reason = %reason, "跳过无效行");
                report.skipped.push(SkippedRow { row_index, reason });
                continue;
            }

            let mut record = BomRecord::default();
            record.set_text(KEY_FIELD, key);
            for (field, kind, candidates) in &field_columns {
                let text = first_value(row, candidates);
                match kind {
                    FieldKind::Text => record.set_text(*field, text),
                    FieldKind::Number => {
                        record.set_number(*field, parse_float_prefix(&text).unwrap_or(0.0))
                    }
                }
            }
            report.records.push(record);
        }

        info!(
            extracted = report.records.len(),
            skipped = report.skipped.len(),
            blank_rows = report.blank_rows,
            "BOM 提取完成"
        );
        report
    }
}

impl Default for ExtractionEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn column_list(field_columns: &[(BomField, FieldKind, Vec<usize>)], field: BomField) -> Vec<usize> {
    field_columns
        .iter()
        .find(|(f, _, _)| *f == field)
        .map(|(_, _, cols)| cols.clone())
        .unwrap_or_default()
}

/// 单元格文本（无值时为空串，有值时去空白）
fn cell_text(row: &[CellValue], column: usize) -> String {
    match row.get(column) {
        Some(cell) if cell.has_value() => cell.trimmed_text(),
        _ => String::new(),
    }
}

/// 按候选列顺序取第一个有值的单元格文本
fn first_value(row: &[CellValue], candidates: &[usize]) -> String {
    candidates
        .iter()
        .find(|&&idx| row.get(idx).map(CellValue::has_value).unwrap_or(false))
        .map(|&idx| cell_text(row, idx))
        .unwrap_or_default()
}

/// 解析文本开头的浮点数（"2 pcs" → 2，"abc" → None）
pub fn parse_float_prefix(text: &str) -> Option<f64> {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }

    // 指数部分必须带至少一位数字
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok().filter(|v| !v.is_nan())
}
