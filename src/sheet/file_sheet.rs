// ==========================================
// BOM 助手 - 文件表格宿主
// ==========================================
// 职责: 从 Excel (.xlsx/.xls) / CSV (.csv) 载入网格，回写为 CSV
// 用途: 命令行无界面运行
// ==========================================

use crate::domain::types::{grid_width, rectangularize, CellValue, Grid};
use crate::sheet::error::{SheetError, SheetResult};
use crate::sheet::memory_sheet::MemorySheet;
use calamine::{open_workbook_auto, Data, Reader};
use csv::{ReaderBuilder, WriterBuilder};
use std::fs::File;
use std::path::Path;
use tracing::{debug, info};

/// 网格载入接口
pub trait GridLoader: Send + Sync {
    fn load_grid(&self, path: &Path) -> SheetResult<Grid>;
}

fn ensure_exists(path: &Path) -> SheetResult<()> {
    if !path.exists() {
        return Err(SheetError::FileNotFound(path.display().to_string()));
    }
    Ok(())
}

// ==========================================
// CSV 载入
// ==========================================
pub struct CsvGridLoader;

impl CsvGridLoader {
    /// CSV 文本 → 单元格（数字文本转为数字，空文本为空）
    fn parse_cell(raw: &str) -> CellValue {
        if raw.is_empty() {
            return CellValue::Empty;
        }
        match raw.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => CellValue::Number(n),
            _ => CellValue::Text(raw.to_string()),
        }
    }
}

impl GridLoader for CsvGridLoader {
    fn load_grid(&self, path: &Path) -> SheetResult<Grid> {
        ensure_exists(path)?;

        let file = File::open(path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(false) // 表头位置由表头定位器决定
            .flexible(true) // 允许行长度不一致
            .from_reader(file);

        let mut grid = Grid::new();
        for result in reader.records() {
            let record = result?;
            grid.push(record.iter().map(Self::parse_cell).collect());
        }

        let width = grid_width(&grid);
        rectangularize(&mut grid, width);
        debug!(rows = grid.len(), columns = width, "CSV 载入完成");
        Ok(grid)
    }
}

// ==========================================
// Excel 载入（第一个工作表）
// ==========================================
pub struct ExcelGridLoader;

impl ExcelGridLoader {
    fn convert_cell(cell: &Data) -> CellValue {
        match cell {
            Data::Empty => CellValue::Empty,
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Float(f) => CellValue::Number(*f),
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::Bool(b) => CellValue::Bool(*b),
            other => CellValue::Text(other.to_string()),
        }
    }
}

impl GridLoader for ExcelGridLoader {
    fn load_grid(&self, path: &Path) -> SheetResult<Grid> {
        ensure_exists(path)?;

        let mut workbook = open_workbook_auto(path)?;
        let sheet_names = workbook.sheet_names();
        let Some(sheet_name) = sheet_names.first().cloned() else {
            return Err(SheetError::ExcelParseError("Excel 文件无工作表".to_string()));
        };
        let range = workbook.worksheet_range(&sheet_name)?;

        // 已用区域不一定从 A1 开始，补齐到 A1 原点
        let (start_row, start_col) = range.start().unwrap_or((0, 0));
        let mut grid: Grid = (0..start_row).map(|_| Vec::new()).collect();
        for data_row in range.rows() {
            let mut row = vec![CellValue::Empty; start_col as usize];
            row.extend(data_row.iter().map(Self::convert_cell));
            grid.push(row);
        }

        let width = grid_width(&grid);
        rectangularize(&mut grid, width);
        debug!(sheet = %sheet_name, rows = grid.len(), columns = width, "Excel 载入完成");
        Ok(grid)
    }
}

// ==========================================
// 文件表格（根据扩展名自动选择）
// ==========================================
pub struct FileSheet;

impl FileSheet {
    /// 载入文件为内存表格
    pub fn load<P: AsRef<Path>>(file_path: P) -> SheetResult<MemorySheet> {
        let path = file_path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        let grid = match ext.as_str() {
            "csv" => CsvGridLoader.load_grid(path)?,
            "xlsx" | "xls" | "xlsm" => ExcelGridLoader.load_grid(path)?,
            _ => return Err(SheetError::UnsupportedFormat(ext)),
        };
        info!(file_path = %path.display(), rows = grid.len(), "表格文件载入完成");
        Ok(MemorySheet::new(grid))
    }

    /// 将内存表格的值写为 CSV
    pub fn save_csv<P: AsRef<Path>>(sheet: &MemorySheet, file_path: P) -> SheetResult<()> {
        let path = file_path.as_ref();
        let values = sheet.values()?;
        let mut writer = WriterBuilder::new().flexible(true).from_path(path)?;
        for row in &values {
            writer.write_record(row.iter().map(CellValue::as_text))?;
        }
        writer.flush()?;
        info!(file_path = %path.display(), rows = values.len(), "CSV 回写完成");
        Ok(())
    }
}
