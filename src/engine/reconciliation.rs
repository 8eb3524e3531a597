// ==========================================
// BOM 助手 - 回填引擎
// ==========================================
// 职责: 外部记录按 LCSC 料号匹配已有行，写回选中字段
// 规则:
// - 只更新已有行，不插入新行
// - 同一料号多行时只更新第一行
// - 只读列（表头带保留前缀）不写
// - 选中但表头中不存在的字段，在数据区右侧追加为新列（只追加一次）
// 输出: 纯数据结果（写入清单 + 更新后网格），由 API 层提交给宿主
// ==========================================

use crate::domain::bom::ImportRecord;
use crate::domain::field::KEY_FIELD;
use crate::domain::types::{rectangularize, CellValue, Grid, HeaderLocation};
use crate::engine::column_resolver::{normalize_label, ColumnMap};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::read_only::ReadOnlyPolicy;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// 匹配键列状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyColumnStatus {
    Found(usize),
    Missing,
}

impl KeyColumnStatus {
    /// 键列索引，缺失时返回 KeyColumnNotFound
    pub fn require(self) -> EngineResult<usize> {
        match self {
            KeyColumnStatus::Found(idx) => Ok(idx),
            KeyColumnStatus::Missing => Err(EngineError::KeyColumnNotFound {
                candidates: KEY_FIELD.synonyms().join(", "),
            }),
        }
    }
}

/// 单元格写入
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellWrite {
    pub row: usize,
    pub column: usize,
    pub value: CellValue,
}

/// 新追加的列
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewColumn {
    pub name: String,
    pub column: usize,
}

/// 因只读被跳过的写入
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadOnlySkip {
    pub row: usize,
    pub column: usize,
    pub field: String,
}

/// 回填结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileOutcome {
    pub key_column: KeyColumnStatus,
    pub new_columns: Vec<NewColumn>,
    /// 新列表头写入（表头行）
    pub header_writes: Vec<CellWrite>,
    /// 数据写入（已匹配行）
    pub cell_writes: Vec<CellWrite>,
    /// 被更新的行（去重，按首次匹配顺序）
    pub matched_rows: Vec<usize>,
    /// 匹配成功的外部记录数
    pub matched_records: usize,
    /// 未匹配到行的料号
    pub unmatched_keys: Vec<String>,
    /// 缺少料号的外部记录序号
    pub records_without_key: Vec<usize>,
    pub read_only_skips: Vec<ReadOnlySkip>,
    /// 应用全部写入后的网格
    pub updated_grid: Grid,
}

impl ReconcileOutcome {
    pub fn matched_count(&self) -> usize {
        self.matched_records
    }
}

/// 选中字段的目标列解析结果
#[derive(Debug, Clone)]
enum FieldTarget {
    Existing(usize),
    New(usize),
}

// ==========================================
// ReconciliationEngine - 回填引擎
// ==========================================
pub struct ReconciliationEngine {
    policy: ReadOnlyPolicy,
}

impl ReconciliationEngine {
    pub fn new(policy: ReadOnlyPolicy) -> Self {
        Self { policy }
    }

    /// 选中字段可命中的表头候选名
    ///
    /// 仅字段名本身及其带只读前缀的形式；同义词列不作为写入目标
    fn target_candidates(&self, field: &str) -> Vec<String> {
        vec![
            normalize_label(field),
            normalize_label(&self.policy.marked(field)),
        ]
    }

    /// 执行回填
    ///
    /// # 参数
    /// - grid: 当前工作表网格快照
    /// - header: 表头定位结果
    /// - records: 外部记录
    /// - selected_fields: 用户选中的字段（按顺序）
    #[instrument(skip_all, fields(header_row = header.row_index, records = records.len()))]
    pub fn reconcile(
        &self,
        grid: &Grid,
        header: HeaderLocation,
        records: &[ImportRecord],
        selected_fields: &[String],
    ) -> ReconcileOutcome {
        let header_row = grid.get(header.row_index).cloned().unwrap_or_default();
        let columns = ColumnMap::from_header_row(&header_row);

        // === 步骤 1: 匹配键列 ===
        let key_column = match columns.resolve(KEY_FIELD.synonyms()) {
            Some(idx) => KeyColumnStatus::Found(idx),
            None => {
                warn!("表头中不存在 LCSC 料号列，无法匹配任何行");
                KeyColumnStatus::Missing
            }
        };
        debug!(key_column = ?key_column, "匹配键列解析完成");

        // === 步骤 2: 选中字段 → 目标列 / 新列 ===
        let mut targets: Vec<(String, FieldTarget)> = Vec::new();
        let mut new_columns = Vec::new();
        for field in selected_fields {
            let field = field.trim();
            if field.is_empty()
                || targets
                    .iter()
                    .any(|(existing, _)| existing.eq_ignore_ascii_case(field))
            {
                continue;
            }
            let target = match columns.resolve(&self.target_candidates(field)) {
                Some(idx) => FieldTarget::Existing(idx),
                None => {
                    let column = header.last_column + new_columns.len();
                    new_columns.push(NewColumn {
                        name: field.to_string(),
                        column,
                    });
                    FieldTarget::New(column)
                }
            };
            targets.push((field.to_string(), target));
        }
        debug!(new_columns = ?new_columns, "待追加新列");

        let header_writes: Vec<CellWrite> = new_columns
            .iter()
            .map(|col| CellWrite {
                row: header.row_index,
                column: col.column,
                value: CellValue::Text(col.name.clone()),
            })
            .collect();

        // === 步骤 3: 逐条记录匹配 ===
        let mut outcome = ReconcileOutcome {
            key_column,
            new_columns,
            header_writes,
            cell_writes: Vec::new(),
            matched_rows: Vec::new(),
            matched_records: 0,
            unmatched_keys: Vec::new(),
            records_without_key: Vec::new(),
            read_only_skips: Vec::new(),
            updated_grid: Vec::new(),
        };

        for (record_index, record) in records.iter().enumerate() {
            let Some(key) = record.key_text(KEY_FIELD.logical_name()) else {
                debug!(record_index, "外部记录缺少料号，跳过");
                outcome.records_without_key.push(record_index);
                continue;
            };

            let matched_row = match key_column {
                KeyColumnStatus::Found(key_idx) => find_row_by_key(grid, header, key_idx, &key),
                KeyColumnStatus::Missing => None,
            };
            let Some(row) = matched_row else {
                debug!(key = %key, "未找到匹配行");
                outcome.unmatched_keys.push(key);
                continue;
            };

            debug!(key = %key, row, "找到匹配行");
            outcome.matched_records += 1;
            if !outcome.matched_rows.contains(&row) {
                outcome.matched_rows.push(row);
            }

            // === 步骤 4: 写入字段 ===
            for (field, target) in &targets {
                let Some(value) = record.cell_value(field) else {
                    continue;
                };
                match target {
                    FieldTarget::Existing(column) => {
                        if self.policy.is_read_only_column(&columns, *column) {
                            debug!(field = %field, column, "只读列，跳过写入");
                            outcome.read_only_skips.push(ReadOnlySkip {
                                row,
                                column: *column,
                                field: field.clone(),
                            });
                        } else {
                            outcome.cell_writes.push(CellWrite {
                                row,
                                column: *column,
                                value,
                            });
                        }
                    }
                    FieldTarget::New(column) => outcome.cell_writes.push(CellWrite {
                        row,
                        column: *column,
                        value,
                    }),
                }
            }
        }

        outcome.updated_grid = apply_writes(
            grid,
            header.last_column + outcome.new_columns.len(),
            outcome.header_writes.iter().chain(outcome.cell_writes.iter()),
        );

        info!(
            matched_records = outcome.matched_records,
            matched_rows = outcome.matched_rows.len(),
            unmatched = outcome.unmatched_keys.len(),
            read_only_skips = outcome.read_only_skips.len(),
            new_columns = outcome.new_columns.len(),
            "回填计算完成"
        );
        outcome
    }
}

impl Default for ReconciliationEngine {
    fn default() -> Self {
        Self::new(ReadOnlyPolicy::default())
    }
}

/// 在数据区按行序查找料号匹配的第一行
fn find_row_by_key(grid: &Grid, header: HeaderLocation, key_column: usize, key: &str) -> Option<usize> {
    grid.iter()
        .enumerate()
        .skip(header.first_data_row())
        .find(|(_, row)| {
            row.get(key_column)
                .filter(|cell| cell.has_value())
                .map(|cell| cell.trimmed_text() == key)
                .unwrap_or(false)
        })
        .map(|(idx, _)| idx)
}

/// 将写入应用到网格副本
fn apply_writes<'a>(grid: &Grid, min_width: usize, writes: impl Iterator<Item = &'a CellWrite>) -> Grid {
    let mut updated = grid.clone();
    let width = crate::domain::types::grid_width(&updated).max(min_width);
    rectangularize(&mut updated, width);
    for write in writes {
        if let Some(cell) = updated
            .get_mut(write.row)
            .and_then(|row| row.get_mut(write.column))
        {
            *cell = write.value.clone();
        }
    }
    updated
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(cells: &[&str]) -> Vec<CellValue> {
        cells.iter().map(|c| CellValue::from(*c)).collect()
    }

    fn records(value: serde_json::Value) -> Vec<ImportRecord> {
        serde_json::from_value(value).unwrap()
    }

    fn fields(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn header(grid: &Grid) -> HeaderLocation {
        crate::engine::header_locator::HeaderLocator::default()
            .require(grid)
            .unwrap()
    }

    #[test]
    fn test_new_column_appended_and_backfilled() {
        let grid = vec![row(&["Designators", "LCSC", "Qty"]), row(&["R1", "C123", "2"])];
        let outcome = ReconciliationEngine::default().reconcile(
            &grid,
            header(&grid),
            &records(json!([{"lcscPartNumber": "C123", "price": 1.5}])),
            &fields(&["price"]),
        );
        assert_eq!(
            outcome.new_columns,
            vec![NewColumn {
                name: "price".to_string(),
                column: 3
            }]
        );
        assert_eq!(outcome.updated_grid[0][3], CellValue::Text("price".to_string()));
        assert_eq!(outcome.updated_grid[1][3], CellValue::Number(1.5));
        assert_eq!(outcome.matched_rows, vec![1]);
    }

    #[test]
    fn test_synonym_header_is_not_a_write_target() {
        let grid = vec![
            row(&["Designators", "LCSC", "Model", "Desc"]),
            row(&["R1", "C123", "RC0603", "10k 1%"]),
        ];
        let outcome = ReconciliationEngine::default().reconcile(
            &grid,
            header(&grid),
            &records(json!([{
                "lcscPartNumber": "C123",
                "manufacturerPartNumber": "RC0603FR-0710KL",
                "description": "RES 10K"
            }])),
            &fields(&["manufacturerPartNumber", "description"]),
        );
        assert_eq!(
            outcome.new_columns,
            vec![
                NewColumn {
                    name: "manufacturerPartNumber".to_string(),
                    column: 4
                },
                NewColumn {
                    name: "description".to_string(),
                    column: 5
                },
            ]
        );
        assert_eq!(outcome.updated_grid[1][2], CellValue::Text("RC0603".to_string()));
        assert_eq!(outcome.updated_grid[1][3], CellValue::Text("10k 1%".to_string()));
        assert_eq!(
            outcome.updated_grid[1][4],
            CellValue::Text("RC0603FR-0710KL".to_string())
        );
        assert_eq!(outcome.updated_grid[1][5], CellValue::Text("RES 10K".to_string()));
    }

    #[test]
    fn test_unmatched_key_changes_nothing() {
        let grid = vec![row(&["Designators", "LCSC", "price"]), row(&["R1", "C123", "1"])];
        let outcome = ReconciliationEngine::default().reconcile(
            &grid,
            header(&grid),
            &records(json!([{"lcscPartNumber": "C999", "price": 9}])),
            &fields(&["price"]),
        );
        assert_eq!(outcome.matched_count(), 0);
        assert_eq!(outcome.unmatched_keys, vec!["C999".to_string()]);
        assert!(outcome.cell_writes.is_empty());
        assert_eq!(outcome.updated_grid, grid);
    }

    #[test]
    fn test_read_only_column_is_never_written() {
        let grid = vec![row(&["Designators", "LCSC", "_Qty"]), row(&["R1", "C1", "2"])];
        let outcome = ReconciliationEngine::default().reconcile(
            &grid,
            header(&grid),
            &records(json!([{"lcscPartNumber": "C1", "qty": 50}])),
            &fields(&["qty"]),
        );
        assert!(outcome.new_columns.is_empty());
        assert!(outcome.cell_writes.is_empty());
        assert_eq!(
            outcome.read_only_skips,
            vec![ReadOnlySkip {
                row: 1,
                column: 2,
                field: "qty".to_string()
            }]
        );
        assert_eq!(outcome.updated_grid[1][2], CellValue::Text("2".to_string()));
    }

    #[test]
    fn test_duplicate_keys_update_first_row_only() {
        let grid = vec![
            row(&["Designators", "LCSC", "stock"]),
            row(&["R1", "C1", ""]),
            row(&["R2", "C1", ""]),
        ];
        let outcome = ReconciliationEngine::default().reconcile(
            &grid,
            header(&grid),
            &records(json!([
                {"lcscPartNumber": "C1", "stock": 10},
                {"lcscPartNumber": "C1", "stock": 20}
            ])),
            &fields(&["stock"]),
        );
        assert_eq!(outcome.matched_rows, vec![1]);
        assert_eq!(outcome.matched_records, 2);
        assert_eq!(outcome.updated_grid[1][2], CellValue::Number(20.0));
        assert_eq!(outcome.updated_grid[2][2], CellValue::Text(String::new()));
    }

    #[test]
    fn test_new_column_added_once_for_many_records() {
        let grid = vec![
            row(&["Designators", "LCSC"]),
            row(&["R1", "C1"]),
            row(&["R2", "C2"]),
        ];
        let outcome = ReconciliationEngine::default().reconcile(
            &grid,
            header(&grid),
            &records(json!([
                {"lcscPartNumber": "C1", "status": "ok"},
                {"lcscPartNumber": "C2", "status": "eol"}
            ])),
            &fields(&["status", "Status"]),
        );
        assert_eq!(outcome.new_columns.len(), 1);
        assert_eq!(outcome.header_writes.len(), 1);
        assert_eq!(outcome.updated_grid[2][2], CellValue::Text("eol".to_string()));
    }

    #[test]
    fn test_missing_key_column_is_distinct() {
        let grid = vec![row(&["Designators", "Value"]), row(&["R1", "10k"])];
        let outcome = ReconciliationEngine::default().reconcile(
            &grid,
            header(&grid),
            &records(json!([{"lcscPartNumber": "C1", "price": 1}])),
            &fields(&["price"]),
        );
        assert_eq!(outcome.key_column, KeyColumnStatus::Missing);
        assert_eq!(outcome.matched_count(), 0);
        assert!(matches!(
            outcome.key_column.require(),
            Err(EngineError::KeyColumnNotFound { .. })
        ));
    }

    #[test]
    fn test_key_cell_is_trimmed_and_record_without_key_skipped() {
        let grid = vec![row(&["Designators", "lcscPartNumber", "price"]), row(&["R1", " C5 ", ""])];
        let outcome = ReconciliationEngine::default().reconcile(
            &grid,
            header(&grid),
            &records(json!([{"price": 3}, {"lcscPartNumber": "C5", "price": 4}])),
            &fields(&["price"]),
        );
        assert_eq!(outcome.records_without_key, vec![0]);
        assert_eq!(outcome.updated_grid[1][2], CellValue::Number(4.0));
    }

    #[test]
    fn test_reapplying_is_idempotent() {
        let grid = vec![row(&["Designators", "LCSC", "Qty"]), row(&["R1", "C123", "2"])];
        let payload = records(json!([{"lcscPartNumber": "C123", "price": 1.5}]));
        let engine = ReconciliationEngine::default();
        let first = engine.reconcile(&grid, header(&grid), &payload, &fields(&["price"]));
        let second_grid = first.updated_grid.clone();
        let second = engine.reconcile(&second_grid, header(&second_grid), &payload, &fields(&["price"]));
        assert!(second.new_columns.is_empty());
        assert_eq!(second.updated_grid, first.updated_grid);
    }

    #[test]
    fn test_field_missing_from_record_is_not_written() {
        let grid = vec![row(&["Designators", "LCSC", "price"]), row(&["R1", "C1", "7"])];
        let outcome = ReconciliationEngine::default().reconcile(
            &grid,
            header(&grid),
            &records(json!([{"lcscPartNumber": "C1"}])),
            &fields(&["price"]),
        );
        assert_eq!(outcome.matched_count(), 1);
        assert!(outcome.cell_writes.is_empty());
    }
}
