// ==========================================
// BOM 助手 - 视觉反馈规划
// ==========================================
// 职责: 根据表头位置与匹配结果生成格式命令（不直接访问宿主）
// - 导出: 清除背景 + 重置字体 → 表头蓝底白字 → 数据区浅蓝
// - 回填: 清除背景 → 只读列数据区浅灰 + 表头蓝底白字 → 匹配行浅绿
// ==========================================

use crate::config::engine_config::FormatPalette;
use crate::domain::types::{HeaderLocation, Region};
use crate::engine::column_resolver::ColumnMap;
use crate::engine::read_only::ReadOnlyPolicy;
use crate::sheet::command::SheetCommand;

/// 清除已用区域格式
///
/// # 参数
/// - used: 已用区域
/// - reset_font: 是否同时将字体色重置为默认色（导出时重置）
pub fn plan_reset_formatting(
    used: Region,
    palette: &FormatPalette,
    reset_font: bool,
) -> Vec<SheetCommand> {
    if used.is_empty() {
        return Vec::new();
    }
    let mut commands = vec![SheetCommand::ClearFill { region: used }];
    if reset_font {
        commands.push(SheetCommand::SetFontColor {
            region: used,
            color: palette.default_font.clone(),
        });
    }
    commands
}

/// 表头行: 蓝底白字
pub fn plan_header_formatting(header: HeaderLocation, palette: &FormatPalette) -> Vec<SheetCommand> {
    let region = Region::row_span(header.row_index, 0, header.last_column);
    if region.is_empty() {
        return Vec::new();
    }
    vec![
        SheetCommand::SetFill {
            region,
            color: palette.header_fill.clone(),
        },
        SheetCommand::SetFontColor {
            region,
            color: palette.header_font.clone(),
        },
    ]
}

/// 导出格式: 表头 + 数据区（表头下一行至已用区域末行）
///
/// # 参数
/// - row_count: 已用区域行数
pub fn plan_export_formatting(
    header: HeaderLocation,
    row_count: usize,
    palette: &FormatPalette,
) -> Vec<SheetCommand> {
    let mut commands = plan_header_formatting(header, palette);

    let data_rows = row_count.saturating_sub(header.first_data_row());
    let data_region = Region::new(header.first_data_row(), 0, data_rows, header.last_column);
    if !data_region.is_empty() {
        commands.push(SheetCommand::SetFill {
            region: data_region,
            color: palette.export_data_fill.clone(),
        });
    }
    commands
}

/// 回填格式: 只读列数据区浅灰 + 表头
pub fn plan_import_formatting(
    header: HeaderLocation,
    columns: &ColumnMap,
    policy: &ReadOnlyPolicy,
    row_count: usize,
    palette: &FormatPalette,
) -> Vec<SheetCommand> {
    let data_rows = row_count.saturating_sub(header.first_data_row());

    let mut commands: Vec<SheetCommand> = policy
        .read_only_columns(columns)
        .into_iter()
        .map(|column| Region::new(header.first_data_row(), column, data_rows, 1))
        .filter(|region| !region.is_empty())
        .map(|region| SheetCommand::SetFill {
            region,
            color: palette.read_only_fill.clone(),
        })
        .collect();

    commands.extend(plan_header_formatting(header, palette));
    commands
}

/// 匹配行浅绿
///
/// # 参数
/// - width: 着色列数（含新追加列）
pub fn plan_matched_row_fills(
    matched_rows: &[usize],
    width: usize,
    palette: &FormatPalette,
) -> Vec<SheetCommand> {
    matched_rows
        .iter()
        .map(|&row| Region::row_span(row, 0, width))
        .filter(|region| !region.is_empty())
        .map(|region| SheetCommand::SetFill {
            region,
            color: palette.matched_fill.clone(),
        })
        .collect()
}
