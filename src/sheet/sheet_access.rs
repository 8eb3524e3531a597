// ==========================================
// BOM 助手 - 表格访问 Trait
// ==========================================
// 职责: 宿主表格的最小访问接口（读取已用区域/区域，批量提交命令）
// 实现者: MemorySheet（内存宿主），各宿主绑定
// 红线: 接口不含任何 BOM 业务规则
// ==========================================

use crate::domain::types::{Grid, Region};
use crate::sheet::command::{SheetCommand, UsedRange};
use crate::sheet::error::SheetResult;
use async_trait::async_trait;
use std::sync::Arc;

// ==========================================
// SheetAccess Trait
// ==========================================
// 坐标: 以工作表 A1 为原点的 0 基索引
// 可见性: 读取只能看到已提交的状态
#[async_trait]
pub trait SheetAccess: Send + Sync {
    /// 读取已用区域
    async fn read_used_range(&self) -> SheetResult<UsedRange>;

    /// 读取指定区域（超出已用区域的单元格为空）
    async fn read_region(&self, region: Region) -> SheetResult<Grid>;

    /// 提交一批命令（同步屏障）
    ///
    /// # 返回
    /// - Ok(()): 全部命令已生效
    /// - Err: 本批命令均未生效，之前已提交的批次保持不变
    async fn commit(&self, commands: Vec<SheetCommand>) -> SheetResult<()>;
}

#[async_trait]
impl<T: SheetAccess + ?Sized> SheetAccess for Arc<T> {
    async fn read_used_range(&self) -> SheetResult<UsedRange> {
        (**self).read_used_range().await
    }

    async fn read_region(&self, region: Region) -> SheetResult<Grid> {
        (**self).read_region(region).await
    }

    async fn commit(&self, commands: Vec<SheetCommand>) -> SheetResult<()> {
        (**self).commit(commands).await
    }
}
