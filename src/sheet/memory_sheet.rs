// ==========================================
// BOM 助手 - 内存表格宿主
// ==========================================
// 职责: SheetAccess 的内存实现（无界面运行、文件宿主、测试）
// 状态: 单元格值 + 每格背景色/字体色
// ==========================================

use crate::domain::types::{grid_width, rectangularize, CellValue, Color, Grid, Region};
use crate::sheet::command::{SheetCommand, UsedRange};
use crate::sheet::error::{SheetError, SheetResult};
use crate::sheet::sheet_access::SheetAccess;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct MemorySheetState {
    values: Grid,
    fills: HashMap<(usize, usize), Color>,
    fonts: HashMap<(usize, usize), Color>,
    commits: usize,
    fail_on_commit: Option<usize>,
}

impl MemorySheetState {
    fn apply(&mut self, command: SheetCommand) {
        match command {
            SheetCommand::WriteRegion {
                row,
                column,
                values,
            } => {
                let needed_rows = row + values.len();
                let needed_cols = column + grid_width(&values);
                let width = grid_width(&self.values).max(needed_cols);
                while self.values.len() < needed_rows {
                    self.values.push(Vec::new());
                }
                rectangularize(&mut self.values, width);
                for (r, row_values) in values.into_iter().enumerate() {
                    for (c, value) in row_values.into_iter().enumerate() {
                        self.values[row + r][column + c] = value;
                    }
                }
            }
            SheetCommand::SetFill { region, color } => {
                for cell in region.cells() {
                    self.fills.insert(cell, color.clone());
                }
            }
            SheetCommand::SetFontColor { region, color } => {
                for cell in region.cells() {
                    self.fonts.insert(cell, color.clone());
                }
            }
            SheetCommand::ClearFill { region } => {
                self.fills.retain(|&(r, c), _| !region.contains(r, c));
            }
        }
    }
}

pub struct MemorySheet {
    state: Mutex<MemorySheetState>,
}

impl MemorySheet {
    /// 从网格创建（自动补齐为矩形）
    pub fn new(mut values: Grid) -> Self {
        let width = grid_width(&values);
        rectangularize(&mut values, width);
        Self {
            state: Mutex::new(MemorySheetState {
                values,
                ..Default::default()
            }),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    fn lock(&self) -> SheetResult<MutexGuard<'_, MemorySheetState>> {
        self.state
            .lock()
            .map_err(|e| SheetError::HostUnavailable(format!("锁获取失败: {}", e)))
    }

    /// 让第 n 次提交（从 1 开始计数）失败（测试用）
    pub fn fail_on_commit(&self, n: usize) -> SheetResult<()> {
        self.lock()?.fail_on_commit = Some(n);
        Ok(())
    }

    /// 当前值快照
    pub fn values(&self) -> SheetResult<Grid> {
        Ok(self.lock()?.values.clone())
    }

    pub fn cell(&self, row: usize, column: usize) -> SheetResult<CellValue> {
        Ok(self
            .lock()?
            .values
            .get(row)
            .and_then(|r| r.get(column))
            .cloned()
            .unwrap_or_default())
    }

    pub fn fill_at(&self, row: usize, column: usize) -> SheetResult<Option<Color>> {
        Ok(self.lock()?.fills.get(&(row, column)).cloned())
    }

    pub fn font_color_at(&self, row: usize, column: usize) -> SheetResult<Option<Color>> {
        Ok(self.lock()?.fonts.get(&(row, column)).cloned())
    }

    /// 已尝试的提交次数（含失败）
    pub fn commit_count(&self) -> SheetResult<usize> {
        Ok(self.lock()?.commits)
    }
}

#[async_trait]
impl SheetAccess for MemorySheet {
    async fn read_used_range(&self) -> SheetResult<UsedRange> {
        Ok(UsedRange::from_grid(self.lock()?.values.clone()))
    }

    async fn read_region(&self, region: Region) -> SheetResult<Grid> {
        let state = self.lock()?;
        let grid = (region.row..region.row + region.row_count)
            .map(|r| {
                (region.column..region.column + region.column_count)
                    .map(|c| {
                        state
                            .values
                            .get(r)
                            .and_then(|row| row.get(c))
                            .cloned()
                            .unwrap_or_default()
                    })
                    .collect()
            })
            .collect();
        Ok(grid)
    }

    async fn commit(&self, commands: Vec<SheetCommand>) -> SheetResult<()> {
        let mut state = self.lock()?;
        state.commits += 1;
        if state.fail_on_commit == Some(state.commits) {
            return Err(SheetError::HostRejected(format!(
                "第 {} 次提交被拒绝",
                state.commits
            )));
        }
        for command in commands {
            state.apply(command);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::session::SheetSession;

    fn grid(rows: &[&[&str]]) -> Grid {
        rows.iter()
            .map(|r| r.iter().map(|c| CellValue::from(*c)).collect())
            .collect()
    }

    #[tokio::test]
    async fn test_pending_writes_invisible_until_sync() {
        let sheet = MemorySheet::new(grid(&[&["a", "b"]]));
        let mut session = SheetSession::new(&sheet);

        session.write_cell(0, 1, CellValue::from("x"));
        let before = session.read_used_range().await.unwrap();
        assert_eq!(before.values[0][1], CellValue::from("b"));

        session.sync("写入").await.unwrap();
        let after = session.read_used_range().await.unwrap();
        assert_eq!(after.values[0][1], CellValue::from("x"));
        assert_eq!(session.barriers(), 1);
    }

    #[tokio::test]
    async fn test_write_beyond_bounds_grows_sheet() {
        let sheet = MemorySheet::new(grid(&[&["a"], &["b", "c"]]));
        sheet
            .commit(vec![SheetCommand::WriteRegion {
                row: 2,
                column: 3,
                values: vec![vec![CellValue::Number(1.0)]],
            }])
            .await
            .unwrap();
        let used = sheet.read_used_range().await.unwrap();
        assert_eq!(used.row_count, 3);
        assert_eq!(used.column_count, 4);
        assert_eq!(used.values[0][1], CellValue::Empty);
        assert_eq!(sheet.cell(2, 3).unwrap(), CellValue::Number(1.0));
    }

    #[tokio::test]
    async fn test_fill_and_clear() {
        let sheet = MemorySheet::new(grid(&[&["a", "b"], &["c", "d"]]));
        let mut session = SheetSession::new(&sheet);
        session.set_fill_color(Region::new(0, 0, 2, 2), Color::new("#E2EFDA"));
        session.set_font_color(Region::row_span(0, 0, 2), Color::new("white"));
        session.sync("格式").await.unwrap();
        assert_eq!(sheet.fill_at(1, 1).unwrap(), Some(Color::new("#E2EFDA")));

        session.clear_fill(Region::row_span(1, 0, 2));
        session.sync("清除").await.unwrap();
        assert_eq!(sheet.fill_at(1, 1).unwrap(), None);
        assert_eq!(sheet.fill_at(0, 0).unwrap(), Some(Color::new("#E2EFDA")));
        assert_eq!(sheet.font_color_at(0, 1).unwrap(), Some(Color::new("white")));
    }

    #[tokio::test]
    async fn test_failed_commit_keeps_earlier_barriers() {
        let sheet = MemorySheet::new(grid(&[&["a", "b"]]));
        sheet.fail_on_commit(2).unwrap();
        let mut session = SheetSession::new(&sheet);

        session.write_cell(0, 0, CellValue::from("first"));
        session.sync("第一批").await.unwrap();
        session.write_cell(0, 1, CellValue::from("second"));
        let err = session.sync("第二批").await.unwrap_err();

        assert!(matches!(err, SheetError::SyncFailed { ref barrier, .. } if barrier == "第二批"));
        assert_eq!(sheet.cell(0, 0).unwrap(), CellValue::from("first"));
        assert_eq!(sheet.cell(0, 1).unwrap(), CellValue::from("b"));
    }

    #[tokio::test]
    async fn test_read_region_pads_with_empty() {
        let sheet = MemorySheet::new(grid(&[&["a", "b"]]));
        let region = sheet.read_region(Region::new(0, 1, 2, 2)).await.unwrap();
        assert_eq!(
            region,
            vec![
                vec![CellValue::from("b"), CellValue::Empty],
                vec![CellValue::Empty, CellValue::Empty]
            ]
        );
    }
}
