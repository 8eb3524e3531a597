// ==========================================
// BOM 助手 - 表格命令
// ==========================================
// 职责: 待提交给宿主的写入/格式请求，在同步屏障处批量提交
// ==========================================

use crate::domain::types::{grid_width, Color, Grid, Region};
use serde::{Deserialize, Serialize};

/// 表格命令
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SheetCommand {
    /// 从 (row, column) 起写入矩形值
    WriteRegion {
        row: usize,
        column: usize,
        values: Grid,
    },
    SetFill {
        region: Region,
        color: Color,
    },
    SetFontColor {
        region: Region,
        color: Color,
    },
    ClearFill {
        region: Region,
    },
}

impl SheetCommand {
    /// 命令影响的区域
    pub fn region(&self) -> Region {
        match self {
            SheetCommand::WriteRegion {
                row,
                column,
                values,
            } => Region::new(*row, *column, values.len(), grid_width(values)),
            SheetCommand::SetFill { region, .. }
            | SheetCommand::SetFontColor { region, .. }
            | SheetCommand::ClearFill { region } => *region,
        }
    }

    pub fn is_write(&self) -> bool {
        matches!(self, SheetCommand::WriteRegion { .. })
    }
}

/// 已用区域快照
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsedRange {
    pub values: Grid,
    pub row_count: usize,
    pub column_count: usize,
}

impl UsedRange {
    pub fn from_grid(values: Grid) -> Self {
        let row_count = values.len();
        let column_count = grid_width(&values);
        Self {
            values,
            row_count,
            column_count,
        }
    }

    pub fn region(&self) -> Region {
        Region::new(0, 0, self.row_count, self.column_count)
    }

    pub fn is_empty(&self) -> bool {
        self.row_count == 0 || self.column_count == 0
    }
}
