// ==========================================
// BOM 助手 - 命令行入口
// ==========================================
// 用法:
//   bom-assistant export <sheet.csv|xlsx>
//   bom-assistant import <sheet> <payload.json> [field,...] [--out file.csv]
// ==========================================

use anyhow::{bail, Context, Result};
use bom_assistant::api::BomApi;
use bom_assistant::app::{get_default_db_path, AppState};
use bom_assistant::config::{ConfigManager, EngineConfig, EngineConfigReader};
use bom_assistant::logging;
use bom_assistant::sheet::{FileSheet, MemorySheet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const USAGE: &str = "用法:
  bom-assistant export <sheet.csv|xlsx>
  bom-assistant import <sheet> <payload.json> [field,...] [--out file.csv]";

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();

    tracing::info!("{} v{}", bom_assistant::APP_NAME, bom_assistant::VERSION);

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("export") => run_export(&args[1..]).await,
        Some("import") => run_import(&args[1..]).await,
        _ => bail!("{}", USAGE),
    }
}

/// 读取配置库，失败时使用默认配置
async fn load_config() -> EngineConfig {
    let db_path = get_default_db_path();
    tracing::info!("使用配置库: {}", db_path);

    let loaded = match ConfigManager::new(&db_path) {
        Ok(manager) => manager.load_engine_config().await,
        Err(e) => Err(e),
    };
    loaded.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "配置加载失败，使用默认配置");
        EngineConfig::default()
    })
}

async fn open_state(sheet_path: &Path) -> Result<(Arc<MemorySheet>, AppState<MemorySheet, EngineConfig>)> {
    let sheet = Arc::new(
        FileSheet::load(sheet_path)
            .with_context(|| format!("无法读取表格: {}", sheet_path.display()))?,
    );
    let api = BomApi::new(Arc::clone(&sheet), load_config().await);
    let state = AppState::new(api).await?;
    Ok((sheet, state))
}

fn print_log<S, C>(state: &AppState<S, C>)
where
    S: bom_assistant::SheetAccess + ?Sized,
    C: EngineConfigReader,
{
    for line in state.log().lines() {
        eprintln!("{}", line);
    }
}

async fn run_export(args: &[String]) -> Result<()> {
    let Some(sheet_path) = args.first() else {
        bail!("{}", USAGE);
    };
    let (_, mut state) = open_state(Path::new(sheet_path)).await?;

    let result = state.run_export().await;
    print_log(&state);
    let response = result?;

    println!("{}", response.json);
    Ok(())
}

async fn run_import(args: &[String]) -> Result<()> {
    let (Some(sheet_path), Some(payload_path)) = (args.first(), args.get(1)) else {
        bail!("{}", USAGE);
    };
    let sheet_path = PathBuf::from(sheet_path);

    let mut fields: Option<Vec<String>> = None;
    let mut out: Option<PathBuf> = None;
    let mut rest = args[2..].iter();
    while let Some(arg) = rest.next() {
        if arg == "--out" {
            let Some(path) = rest.next() else {
                bail!("--out 缺少文件路径");
            };
            out = Some(PathBuf::from(path));
        } else {
            fields = Some(
                arg.split(',')
                    .map(|f| f.trim().to_string())
                    .filter(|f| !f.is_empty())
                    .collect(),
            );
        }
    }

    let out = match out {
        Some(path) => path,
        None if has_csv_extension(&sheet_path) => sheet_path.clone(),
        None => bail!("Excel 输入需要通过 --out 指定 CSV 输出路径"),
    };

    let text = std::fs::read_to_string(payload_path)
        .with_context(|| format!("无法读取回填数据: {}", payload_path))?;

    let (sheet, mut state) = open_state(&sheet_path).await?;
    let parsed = state.set_import_text(text);
    if let Err(e) = parsed {
        print_log(&state);
        return Err(e.into());
    }
    if let Some(fields) = fields {
        state.select_fields(&fields);
    }
    if !state.can_apply() {
        print_log(&state);
        bail!("未选择任何回填字段");
    }

    let result = state.run_import().await;
    print_log(&state);
    let response = result?;

    FileSheet::save_csv(&sheet, &out)
        .with_context(|| format!("无法写入: {}", out.display()))?;

    eprintln!(
        "更新 {} 行，新增 {} 列，未匹配 {} 条 → {}",
        response.updated_rows(),
        response.new_columns.len(),
        response.unmatched_keys.len(),
        out.display()
    );
    Ok(())
}

fn has_csv_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false)
}
