// ==========================================
// BOM 助手 - 应用状态
// ==========================================
// 职责: 持有 API 实例、导出状态、回填状态、诊断日志
// 红线: 导出状态与回填状态互不影响，任一操作失败不改动另一侧状态
// ==========================================

use crate::api::bom_api::{BomApi, ExportResponse, ImportResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::config::engine_config_trait::EngineConfigReader;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::payload::{parse_import_payload, FieldSelection, ImportPayload};
use crate::logging::DiagnosticLog;
use crate::sheet::sheet_access::SheetAccess;
use serde::{Deserialize, Serialize};

/// 导出侧状态
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportState {
    /// 最近一次导出的 JSON
    pub last_json: Option<String>,
    pub last_record_count: usize,
}

/// 回填侧状态
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportState {
    /// 用户粘贴的原始文本
    pub text: String,
    /// 最近一次成功解析的数据
    pub payload: Option<ImportPayload>,
    pub available_fields: Vec<String>,
    pub selection: FieldSelection,
}

pub struct AppState<S, C>
where
    S: SheetAccess + ?Sized,
    C: EngineConfigReader,
{
    api: BomApi<S, C>,
    export: ExportState,
    import: ImportState,
    log: DiagnosticLog,
    default_fields: Vec<String>,
    excluded_fields: Vec<String>,
}

impl<S, C> AppState<S, C>
where
    S: SheetAccess + ?Sized,
    C: EngineConfigReader,
{
    /// 创建应用状态（读取默认勾选与排除字段）
    pub async fn new(api: BomApi<S, C>) -> ApiResult<Self> {
        let config = api.engine_config().await?;
        Ok(Self {
            api,
            export: ExportState::default(),
            import: ImportState::default(),
            log: DiagnosticLog::new(),
            default_fields: config.default_import_fields,
            excluded_fields: config.excluded_import_fields,
        })
    }

    /// 启动时清除残留格式
    pub async fn initialize(&mut self) -> ApiResult<()> {
        self.api.reset_formatting(&mut self.log).await
    }

    pub fn api(&self) -> &BomApi<S, C> {
        &self.api
    }

    pub fn export_state(&self) -> &ExportState {
        &self.export
    }

    pub fn import_state(&self) -> &ImportState {
        &self.import
    }

    pub fn log(&self) -> &DiagnosticLog {
        &self.log
    }

    // ===== 导出 =====

    pub async fn run_export(&mut self) -> ApiResult<ExportResponse> {
        let response = self.api.export_bom(&mut self.log).await?;
        self.export.last_json = Some(response.json.clone());
        self.export.last_record_count = response.records.len();
        Ok(response)
    }

    // ===== 回填 =====

    /// 更新粘贴文本
    ///
    /// # 返回
    /// - Ok(usize): 解析出的记录数
    /// - Err: 解析失败，已有字段与勾选保持不变
    ///
    /// 非空数组会按第一条记录重建可选字段和默认勾选；空数组保留原勾选
    pub fn set_import_text(&mut self, text: impl Into<String>) -> ImportResult<usize> {
        self.import.text = text.into();

        let payload = match parse_import_payload(&self.import.text) {
            Ok(payload) => payload,
            Err(e) => {
                self.log.warn(format!("回填数据无效: {}", e));
                return Err(e);
            }
        };

        let count = payload.len();
        if !payload.is_empty() {
            let fields = payload.available_fields(&self.excluded_fields);
            self.import.selection = FieldSelection::with_preset(&fields, &self.default_fields);
            self.import.available_fields = fields;
        }
        self.import.payload = Some(payload);
        self.log.info(format!("已解析 {} 条回填记录", count));
        Ok(count)
    }

    /// 切换字段勾选
    pub fn toggle_field(&mut self, field: &str) -> Option<bool> {
        self.import.selection.toggle(field)
    }

    /// 仅勾选给定字段，返回不可选的字段名
    pub fn select_fields(&mut self, fields: &[String]) -> Vec<String> {
        let unknown = self.import.selection.select_only(fields);
        for name in &unknown {
            self.log.warn(format!("字段不在回填数据中: {}", name));
        }
        unknown
    }

    /// 是否可以执行回填
    pub fn can_apply(&self) -> bool {
        self.import.payload.is_some() && self.import.selection.any_selected()
    }

    pub async fn run_import(&mut self) -> ApiResult<ImportResponse> {
        let Some(payload) = self.import.payload.as_ref() else {
            let err = ApiError::from(ImportError::EmptyPayload);
            self.log.error(format!("错误: {}", err));
            return Err(err);
        };
        let selected = self.import.selection.selected();
        self.api
            .apply_import(&payload.records, &selected, &mut self.log)
            .await
    }
}

/// 获取默认配置库路径
///
/// 优先级: 环境变量 BOM_ASSISTANT_DB_PATH → 用户数据目录 → 当前目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var("BOM_ASSISTANT_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./bom_assistant.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("bom-assistant");
        // 目录创建失败时退回当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("bom_assistant.db");
        }
    }

    path.to_string_lossy().to_string()
}
