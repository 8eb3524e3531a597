// ==========================================
// 文件宿主端到端测试
// ==========================================
// CSV 载入 → 回填 → CSV 写回 → 重新载入导出
// ==========================================

use bom_assistant::api::BomApi;
use bom_assistant::config::EngineConfig;
use bom_assistant::domain::CellValue;
use bom_assistant::logging::DiagnosticLog;
use bom_assistant::sheet::FileSheet;
use std::io::Write;
use std::sync::Arc;
use tempfile::Builder;

mod test_helpers;
use test_helpers::*;

#[tokio::test]
async fn test_csv_import_round_trip() {
    let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
    writeln!(file, "My Board,,").unwrap();
    writeln!(file, "Designators,LCSC,Qty").unwrap();
    writeln!(file, "R1,C123,2").unwrap();
    writeln!(file, "C1,C456,1").unwrap();

    let sheet = Arc::new(FileSheet::load(file.path()).unwrap());
    assert_eq!(sheet.cell(2, 2).unwrap(), CellValue::Number(2.0));

    let api = BomApi::new(Arc::clone(&sheet), EngineConfig::default());
    let mut log = DiagnosticLog::new();
    let data = records(r#"[{"lcscPartNumber":"C456","status":"in stock"}]"#);
    let response = api
        .apply_import(&data, &fields(&["status"]), &mut log)
        .await
        .unwrap();
    assert_eq!(response.matched_rows, vec![3]);

    let out = Builder::new().suffix(".csv").tempfile().unwrap();
    FileSheet::save_csv(&sheet, out.path()).unwrap();

    let reloaded = Arc::new(FileSheet::load(out.path()).unwrap());
    assert_eq!(reloaded.cell(1, 3).unwrap(), CellValue::from("status"));
    assert_eq!(reloaded.cell(3, 3).unwrap(), CellValue::from("in stock"));
    assert_eq!(reloaded.cell(2, 3).unwrap(), CellValue::Empty);

    let api = BomApi::new(reloaded, EngineConfig::default());
    let export = api.export_bom(&mut log).await.unwrap();
    assert_eq!(export.records.len(), 2);
    assert_eq!(export.records[1].lcsc_part_number, "C456");
}

#[test]
fn test_unsupported_extension_is_rejected() {
    let file = Builder::new().suffix(".txt").tempfile().unwrap();
    assert!(FileSheet::load(file.path()).is_err());
}
