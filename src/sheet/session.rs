// ==========================================
// BOM 助手 - 表格会话（命令队列 + 同步屏障）
// ==========================================
// 职责: 累积写入/格式请求，在 sync() 处整批提交给宿主
// 约束:
// - 入队的请求在 sync() 之前对读取不可见
// - 依赖写入结果的读取必须在 sync() 之后发起
// - 某次 sync() 失败时，之前已提交的批次保持生效（无回滚）
// ==========================================

use crate::domain::types::{CellValue, Color, Grid, Region};
use crate::sheet::command::{SheetCommand, UsedRange};
use crate::sheet::error::{SheetError, SheetResult};
use crate::sheet::sheet_access::SheetAccess;
use tracing::{debug, error, warn};

pub struct SheetSession<'a, S: SheetAccess + ?Sized> {
    host: &'a S,
    pending: Vec<SheetCommand>,
    barriers: usize,
}

impl<'a, S: SheetAccess + ?Sized> SheetSession<'a, S> {
    pub fn new(host: &'a S) -> Self {
        Self {
            host,
            pending: Vec::new(),
            barriers: 0,
        }
    }

    // ===== 读取（直接访问宿主，仅可见已提交状态）=====

    pub async fn read_used_range(&self) -> SheetResult<UsedRange> {
        self.warn_if_pending("read_used_range");
        self.host.read_used_range().await
    }

    pub async fn read_region(&self, region: Region) -> SheetResult<Grid> {
        self.warn_if_pending("read_region");
        self.host.read_region(region).await
    }

    fn warn_if_pending(&self, operation: &str) {
        if self.pending.iter().any(SheetCommand::is_write) {
            warn!(operation, pending = self.pending.len(), "读取时仍有未提交的写入请求");
        }
    }

    // ===== 入队 =====

    pub fn write_region(&mut self, row: usize, column: usize, values: Grid) {
        if values.is_empty() {
            return;
        }
        self.pending.push(SheetCommand::WriteRegion {
            row,
            column,
            values,
        });
    }

    pub fn write_cell(&mut self, row: usize, column: usize, value: CellValue) {
        self.write_region(row, column, vec![vec![value]]);
    }

    pub fn set_fill_color(&mut self, region: Region, color: Color) {
        if !region.is_empty() {
            self.pending.push(SheetCommand::SetFill { region, color });
        }
    }

    pub fn set_font_color(&mut self, region: Region, color: Color) {
        if !region.is_empty() {
            self.pending.push(SheetCommand::SetFontColor { region, color });
        }
    }

    pub fn clear_fill(&mut self, region: Region) {
        if !region.is_empty() {
            self.pending.push(SheetCommand::ClearFill { region });
        }
    }

    /// 批量入队
    pub fn enqueue(&mut self, commands: impl IntoIterator<Item = SheetCommand>) {
        self.pending.extend(commands);
    }

    pub fn pending(&self) -> &[SheetCommand] {
        &self.pending
    }

    /// 已完成的同步屏障次数
    pub fn barriers(&self) -> usize {
        self.barriers
    }

    // ===== 同步屏障 =====

    /// 提交所有待处理请求
    ///
    /// # 参数
    /// - label: 屏障名称（诊断用）
    pub async fn sync(&mut self, label: &str) -> SheetResult<()> {
        let batch = std::mem::take(&mut self.pending);
        let size = batch.len();
        match self.host.commit(batch).await {
            Ok(()) => {
                self.barriers += 1;
                debug!(barrier = label, commands = size, "同步完成");
                Ok(())
            }
            Err(e) => {
                error!(barrier = label, error = %e, "同步失败");
                Err(SheetError::SyncFailed {
                    barrier: label.to_string(),
                    message: e.to_string(),
                })
            }
        }
    }
}
