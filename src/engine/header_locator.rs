// ==========================================
// BOM 助手 - 表头定位器
// ==========================================
// 职责: 自上而下扫描网格，找到第一列等于哨兵标签的行
// 输出: HeaderLocation（表头行 + 数据区列数）
// ==========================================

use crate::domain::types::{Grid, HeaderLocation};
use crate::engine::error::{EngineError, EngineResult};
use tracing::debug;

/// 默认表头哨兵标签
pub const DEFAULT_HEADER_SENTINEL: &str = "designators";

pub struct HeaderLocator {
    sentinel: String,
}

impl HeaderLocator {
    pub fn new(sentinel: &str) -> Self {
        Self {
            sentinel: sentinel.trim().to_lowercase(),
        }
    }

    pub fn sentinel(&self) -> &str {
        &self.sentinel
    }

    /// 定位表头行
    ///
    /// # 返回
    /// - Some(HeaderLocation): 第一列（去空白、小写）等于哨兵的第一行
    /// - None: 不存在这样的行
    pub fn locate(&self, grid: &Grid) -> Option<HeaderLocation> {
        let found = grid.iter().enumerate().find_map(|(row_index, row)| {
            let first = row.first()?.trimmed_text().to_lowercase();
            (first == self.sentinel).then(|| HeaderLocation {
                row_index,
                last_column: row.len(),
            })
        });

        match &found {
            Some(location) => debug!(
                header_row = location.row_index,
                last_column = location.last_column,
                "找到表头行"
            ),
            None => debug!(sentinel = %self.sentinel, rows = grid.len(), "未找到表头行"),
        }
        found
    }

    /// 定位表头行，未找到时返回 HeaderNotFound
    pub fn require(&self, grid: &Grid) -> EngineResult<HeaderLocation> {
        self.locate(grid).ok_or_else(|| EngineError::HeaderNotFound {
            sentinel: self.sentinel.clone(),
        })
    }
}

impl Default for HeaderLocator {
    fn default() -> Self {
        Self::new(DEFAULT_HEADER_SENTINEL)
    }
}
