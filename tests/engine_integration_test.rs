// ==========================================
// 引擎集成测试
// ==========================================
// 表头定位 → 提取 / 回填，不经过宿主
// ==========================================

use bom_assistant::domain::{CellValue, HeaderLocation};
use bom_assistant::engine::{
    ExtractionEngine, HeaderLocator, KeyColumnStatus, ReadOnlyPolicy, ReconciliationEngine,
};

mod test_helpers;
use test_helpers::*;

#[test]
fn test_header_at_row_zero_is_found() {
    let located = HeaderLocator::default().locate(&scenario_grid());
    assert_eq!(
        located,
        Some(HeaderLocation {
            row_index: 0,
            last_column: 3
        })
    );
}

#[test]
fn test_header_not_found_is_none() {
    let values = grid(&[&["", "Designators"], &["R1", "C1"]]);
    assert_eq!(HeaderLocator::default().locate(&values), None);
    assert!(HeaderLocator::default().require(&values).is_err());
}

#[test]
fn test_export_then_reconcile_same_grid() {
    let values = titled_bom_grid();
    let header = HeaderLocator::default().require(&values).unwrap();

    let report = ExtractionEngine::new().extract(&values, header);
    assert_eq!(report.records.len(), 2);
    assert_eq!(report.blank_rows, 1);
    // 只读列可作为提取来源
    assert_eq!(report.records[0].qty_per_board, 2.0);
    assert_eq!(report.records[1].comment, "100nF");

    let data = records(r#"[{"lcscPartNumber":"C456","comment":"0.1uF","qtyPerBoard":4}]"#);
    let outcome = ReconciliationEngine::new(ReadOnlyPolicy::default()).reconcile(
        &values,
        header,
        &data,
        &fields(&["comment", "qtyPerBoard"]),
    );

    assert_eq!(outcome.key_column, KeyColumnStatus::Found(1));
    assert_eq!(outcome.matched_rows, vec![5]);
    assert_eq!(outcome.updated_grid[5][3], CellValue::from("0.1uF"));
    assert_eq!(outcome.updated_grid[5][2], CellValue::from("1"));
    assert_eq!(outcome.read_only_skips.len(), 1);
    assert!(outcome.new_columns.is_empty());

    // 回填后重新提取
    let again = ExtractionEngine::new().extract(&outcome.updated_grid, header);
    assert_eq!(again.records[1].comment, "0.1uF");
}

#[test]
fn test_reconcile_never_writes_read_only_columns() {
    let values = grid(&[
        &["Designators", "LCSC", "_Stock", "Status"],
        &["R1", "C1", "5", ""],
        &["R2", "C2", "6", ""],
    ]);
    let header = HeaderLocator::default().require(&values).unwrap();
    let data = records(
        r#"[{"lcscPartNumber":"C1","stock":1,"status":"a","_Stock":"X"},{"lcscPartNumber":"C2","stock":2,"status":"b"}]"#,
    );

    let outcome = ReconciliationEngine::default().reconcile(
        &values,
        header,
        &data,
        &fields(&["stock", "status", "_Stock"]),
    );

    assert_eq!(outcome.matched_rows, vec![1, 2]);
    for write in outcome.cell_writes.iter().chain(outcome.header_writes.iter()) {
        assert_ne!(write.column, 2, "写入了只读列: {:?}", write);
    }
    assert_eq!(outcome.read_only_skips.len(), 3);
    assert!(outcome.new_columns.is_empty());
    assert_eq!(outcome.updated_grid[2][3], CellValue::from("b"));
}
