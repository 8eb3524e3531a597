// ==========================================
// 配置库集成测试
// ==========================================

use bom_assistant::api::BomApi;
use bom_assistant::config::{config_keys, ConfigManager, EngineConfig, EngineConfigReader};
use bom_assistant::domain::Color;
use bom_assistant::logging::DiagnosticLog;
use bom_assistant::sheet::MemorySheet;
use std::sync::Arc;

mod test_helpers;
use test_helpers::*;

#[tokio::test]
async fn test_file_backed_config_persists_across_connections() {
    let (_temp_file, db_path) = create_test_db().unwrap();

    {
        let manager = ConfigManager::new(&db_path).unwrap();
        manager
            .set_config_value(config_keys::HEADER_SENTINEL, "RefDes")
            .unwrap();
        manager
            .set_config_value(config_keys::DEFAULT_IMPORT_FIELDS, r#"["status","price"]"#)
            .unwrap();
    }

    let manager = ConfigManager::new(&db_path).unwrap();
    let config = manager.load_engine_config().await.unwrap();
    assert_eq!(config.header_sentinel, "RefDes");
    assert_eq!(config.default_import_fields, vec!["status", "price"]);
    assert_eq!(config.excluded_import_fields, vec!["attributes"]);
}

#[tokio::test]
async fn test_api_uses_configured_sentinel_and_palette() {
    let manager = ConfigManager::in_memory().unwrap();
    manager.set_config_value(config_keys::HEADER_SENTINEL, "refdes").unwrap();
    manager.set_config_value(config_keys::HEADER_FILL, "#000000").unwrap();

    let values = grid(&[&["RefDes", "LCSC"], &["R1", "C123"]]);
    let sheet = Arc::new(MemorySheet::new(values));
    let api = BomApi::new(Arc::clone(&sheet), manager);
    let mut log = DiagnosticLog::new();

    let response = api.export_bom(&mut log).await.unwrap();
    assert_eq!(response.records.len(), 1);
    assert_eq!(sheet.fill_at(0, 0).unwrap(), Some(Color::new("#000000")));
}

#[tokio::test]
async fn test_configured_read_only_marker() {
    let mut config = EngineConfig::default();
    config.read_only_marker = '#';

    let values = grid(&[&["Designators", "LCSC", "#Stock"], &["R1", "C123", "5"]]);
    let (sheet, api) = memory_api_with_config(values, config);
    let mut log = DiagnosticLog::new();
    let data = records(r#"[{"lcscPartNumber":"C123","stock":9}]"#);

    let response = api
        .apply_import(&data, &fields(&["stock"]), &mut log)
        .await
        .unwrap();
    assert_eq!(response.read_only_skips.len(), 1);
    assert_eq!(
        sheet.cell(1, 2).unwrap(),
        bom_assistant::domain::CellValue::from("5")
    );
}

#[test]
fn test_snapshot_restore_between_databases() {
    let (_a, path_a) = create_test_db().unwrap();
    let (_b, path_b) = create_test_db().unwrap();

    let source = ConfigManager::new(&path_a).unwrap();
    source.save_engine_config(&EngineConfig::default()).unwrap();
    let snapshot = source.get_config_snapshot().unwrap();

    let target = ConfigManager::new(&path_b).unwrap();
    assert!(target.restore_config_from_snapshot(&snapshot).unwrap() > 0);
    assert_eq!(target.get_config_snapshot().unwrap(), snapshot);
}
