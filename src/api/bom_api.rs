// ==========================================
// BOM 助手 - 导出/回填 API
// ==========================================
// 职责: 编排引擎与宿主交互（读取 → 计算 → 命令入队 → 同步屏障）
// 红线:
// - 表头定位失败时在任何写入之前中止
// - 同步失败中止剩余步骤，已提交批次不回滚
// - 每次操作的状态通过参数/返回值传递，不保存跨操作的可变状态
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::engine_config::EngineConfig;
use crate::config::engine_config_trait::EngineConfigReader;
use crate::domain::bom::{BomRecord, ImportRecord};
use crate::domain::types::{HeaderLocation, Region};
use crate::engine::column_resolver::ColumnMap;
use crate::engine::error::EngineError;
use crate::engine::extraction::{ExtractionEngine, SkippedRow};
use crate::engine::formatting::{
    plan_export_formatting, plan_import_formatting, plan_matched_row_fills, plan_reset_formatting,
};
use crate::engine::header_locator::HeaderLocator;
use crate::engine::read_only::ReadOnlyPolicy;
use crate::engine::reconciliation::{
    KeyColumnStatus, NewColumn, ReadOnlySkip, ReconciliationEngine,
};
use crate::importer::error::ImportError;
use crate::logging::DiagnosticLog;
use crate::sheet::session::SheetSession;
use crate::sheet::sheet_access::SheetAccess;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument};
use uuid::Uuid;

/// 导出响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportResponse {
    pub operation_id: String,
    pub header: HeaderLocation,
    pub records: Vec<BomRecord>,
    /// 位号或料号为空被跳过的行
    pub skipped: Vec<SkippedRow>,
    /// 格式化后的 JSON（供复制）
    pub json: String,
    pub elapsed_ms: i64,
}

/// 回填响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportResponse {
    pub operation_id: String,
    pub header: HeaderLocation,
    pub key_column: KeyColumnStatus,
    pub new_columns: Vec<NewColumn>,
    /// 被更新的行（工作表行索引）
    pub matched_rows: Vec<usize>,
    /// 匹配成功的外部记录数
    pub matched_records: usize,
    pub unmatched_keys: Vec<String>,
    pub records_without_key: Vec<usize>,
    pub read_only_skips: Vec<ReadOnlySkip>,
    /// 写入的单元格数
    pub cells_written: usize,
    pub elapsed_ms: i64,
}

impl ImportResponse {
    pub fn updated_rows(&self) -> usize {
        self.matched_rows.len()
    }
}

// ==========================================
// BomApi
// ==========================================
pub struct BomApi<S, C>
where
    S: SheetAccess + ?Sized,
    C: EngineConfigReader,
{
    sheet: Arc<S>,
    config: C,
}

impl<S, C> BomApi<S, C>
where
    S: SheetAccess + ?Sized,
    C: EngineConfigReader,
{
    pub fn new(sheet: Arc<S>, config: C) -> Self {
        Self { sheet, config }
    }

    pub fn sheet(&self) -> &Arc<S> {
        &self.sheet
    }

    /// 当前引擎配置
    pub async fn engine_config(&self) -> ApiResult<EngineConfig> {
        Ok(self.config.load_engine_config().await?)
    }

    /// 导出 BOM
    ///
    /// # 流程
    /// 读取已用区域 → 定位表头（失败即中止，无写入） → 格式反馈 → 重新读取 → 提取
    ///
    /// # 返回
    /// - Ok(ExportResponse): 记录 + JSON
    /// - Err(HeaderNotFound / HostSyncFailure / ...)
    #[instrument(skip_all)]
    pub async fn export_bom(&self, log: &mut DiagnosticLog) -> ApiResult<ExportResponse> {
        let result = self.run_export(log).await;
        if let Err(e) = &result {
            log.error(format!("错误: {}", e));
        }
        result
    }

    async fn run_export(&self, log: &mut DiagnosticLog) -> ApiResult<ExportResponse> {
        let start = Instant::now();
        let operation_id = Uuid::new_v4().to_string();
        let config = self.config.load_engine_config().await?;
        let palette = &config.palette;

        log.info("开始导出");
        let mut session = SheetSession::new(self.sheet.as_ref());

        let used = session.read_used_range().await?;
        log.info(format!("行数: {}, 列数: {}", used.row_count, used.column_count));
        if used.is_empty() {
            return Err(EngineError::EmptyWorksheet.into());
        }
        let header = HeaderLocator::new(&config.header_sentinel).require(&used.values)?;
        log.info(format!(
            "表头行: {}, 列数: {}",
            header.row_index, header.last_column
        ));

        if config.apply_formatting {
            session.enqueue(plan_reset_formatting(used.region(), palette, true));
            session.sync("清除格式").await?;

            session.enqueue(plan_export_formatting(header, used.row_count, palette));
            session.sync("导出格式").await?;
            log.info("已应用表头与数据区格式");
        }

        let snapshot = session.read_used_range().await?;
        let report = ExtractionEngine::new().extract(&snapshot.values, header);
        log.info(format!("表头: {}", report.headers.join(", ")));
        match report.key_column {
            Some(idx) => log.info(format!("LCSC 列索引: {}", idx)),
            None => log.warn("表头中不存在 LCSC 料号列"),
        }
        for skipped in &report.skipped {
            log.info(format!("跳过第 {} 行: {}", skipped.row_index, skipped.reason));
        }

        let json = serde_json::to_string_pretty(&report.records)?;
        log.info(format!("导出完成: {} 条记录", report.records.len()));

        let elapsed_ms = start.elapsed().as_millis() as i64;
        info!(
            operation_id = %operation_id,
            records = report.records.len(),
            skipped = report.skipped.len(),
            barriers = session.barriers(),
            elapsed_ms,
            "导出完成"
        );

        Ok(ExportResponse {
            operation_id,
            header,
            records: report.records,
            skipped: report.skipped,
            json,
            elapsed_ms,
        })
    }

    /// 回填外部记录
    ///
    /// # 参数
    /// - records: 外部记录
    /// - selected_fields: 勾选的字段（按顺序）
    ///
    /// # 流程
    /// 定位表头 → 清除背景 → 只读列/表头格式 → 重新读取 → 回填计算
    /// → 新列表头 → 数据写入 + 匹配行着色
    #[instrument(skip_all, fields(records = records.len(), fields = selected_fields.len()))]
    pub async fn apply_import(
        &self,
        records: &[ImportRecord],
        selected_fields: &[String],
        log: &mut DiagnosticLog,
    ) -> ApiResult<ImportResponse> {
        let result = self.run_import(records, selected_fields, log).await;
        if let Err(e) = &result {
            log.error(format!("错误: {}", e));
        }
        result
    }

    async fn run_import(
        &self,
        records: &[ImportRecord],
        selected_fields: &[String],
        log: &mut DiagnosticLog,
    ) -> ApiResult<ImportResponse> {
        if selected_fields.iter().all(|f| f.trim().is_empty()) {
            return Err(ImportError::NoFieldsSelected.into());
        }

        let start = Instant::now();
        let operation_id = Uuid::new_v4().to_string();
        let config = self.config.load_engine_config().await?;
        let palette = &config.palette;
        let policy = ReadOnlyPolicy::new(config.read_only_marker);

        log.info(format!("开始回填: {} 条记录", records.len()));
        let mut session = SheetSession::new(self.sheet.as_ref());

        let used = session.read_used_range().await?;
        log.info(format!("行数: {}, 列数: {}", used.row_count, used.column_count));
        if used.is_empty() {
            return Err(EngineError::EmptyWorksheet.into());
        }
        let header = HeaderLocator::new(&config.header_sentinel).require(&used.values)?;
        log.info(format!(
            "表头行: {}, 列数: {}",
            header.row_index, header.last_column
        ));

        if config.apply_formatting {
            session.enqueue(plan_reset_formatting(used.region(), palette, false));
            session.sync("清除背景").await?;
            log.info("已清除背景色");

            let header_values = session
                .read_region(Region::row_span(header.row_index, 0, header.last_column))
                .await?;
            let columns = header_values
                .first()
                .map(|row| ColumnMap::from_header_row(row))
                .unwrap_or_default();
            session.enqueue(plan_import_formatting(
                header,
                &columns,
                &policy,
                used.row_count,
                palette,
            ));
            session.sync("表头格式").await?;
            log.info("已应用表头格式");
        }

        let snapshot = session.read_used_range().await?;
        let outcome =
            ReconciliationEngine::new(policy).reconcile(&snapshot.values, header, records, selected_fields);

        match outcome.key_column.require() {
            Ok(idx) => log.info(format!("LCSC 列索引: {}", idx)),
            Err(e) => log.warn(format!("{}，无法匹配任何行", e)),
        }

        if !outcome.new_columns.is_empty() {
            let names: Vec<&str> = outcome.new_columns.iter().map(|c| c.name.as_str()).collect();
            log.info(format!("新增列: {}", names.join(", ")));
            for write in &outcome.header_writes {
                session.write_cell(write.row, write.column, write.value.clone());
            }
            session.sync("新增列表头").await?;
        }

        for write in &outcome.cell_writes {
            session.write_cell(write.row, write.column, write.value.clone());
        }
        if config.apply_formatting {
            let width = header.last_column + outcome.new_columns.len();
            session.enqueue(plan_matched_row_fills(&outcome.matched_rows, width, palette));
        }
        for index in &outcome.records_without_key {
            log.warn(format!("第 {} 条记录缺少 LCSC 料号", index));
        }
        for key in &outcome.unmatched_keys {
            log.info(format!("未找到料号: {}", key));
        }
        for skip in &outcome.read_only_skips {
            log.info(format!("只读列 {} 跳过写入 (行 {})", skip.field, skip.row));
        }
        session.sync("写入数据").await?;

        if outcome.key_column == KeyColumnStatus::Missing {
            log.warn("回填完成: 缺少料号列，未更新任何行");
        } else if outcome.matched_rows.is_empty() {
            log.info("回填完成: 没有料号匹配到任何行");
        } else {
            log.info(format!("回填完成: 共更新 {} 行", outcome.matched_rows.len()));
        }

        let elapsed_ms = start.elapsed().as_millis() as i64;
        info!(
            operation_id = %operation_id,
            matched_rows = outcome.matched_rows.len(),
            unmatched = outcome.unmatched_keys.len(),
            barriers = session.barriers(),
            elapsed_ms,
            "回填完成"
        );

        Ok(ImportResponse {
            operation_id,
            header,
            key_column: outcome.key_column,
            cells_written: outcome.cell_writes.len(),
            new_columns: outcome.new_columns,
            matched_rows: outcome.matched_rows,
            matched_records: outcome.matched_records,
            unmatched_keys: outcome.unmatched_keys,
            records_without_key: outcome.records_without_key,
            read_only_skips: outcome.read_only_skips,
            elapsed_ms,
        })
    }

    /// 清除已用区域背景并重置字体色
    pub async fn reset_formatting(&self, log: &mut DiagnosticLog) -> ApiResult<()> {
        let config = self.config.load_engine_config().await?;
        let mut session = SheetSession::new(self.sheet.as_ref());
        let used = session.read_used_range().await?;
        session.enqueue(plan_reset_formatting(used.region(), &config.palette, true));
        if let Err(e) = session.sync("重置格式").await {
            let err = ApiError::from(e);
            log.error(format!("错误: {}", err));
            return Err(err);
        }
        log.info("已重置格式");
        Ok(())
    }
}
