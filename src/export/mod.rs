// ==========================================
// 零售预算预测系统 - 导出层
// ==========================================
// 职责: 运行结果 → JSON 报告 / 年度明细 CSV / 月度对比 CSV
// 格式与样式由调用方决定, 本层只保证数据完整
// ==========================================

pub mod csv_export;
pub mod error;

pub use csv_export::{write_month_comparison, write_year_sheet, write_year_sheets, SUBTOTAL_LABEL};
pub use error::{ExportError, ExportResult};

use crate::engine::BudgetRun;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// 报告文件名
pub const REPORT_FILE_NAME: &str = "report.json";
/// 全年月度对比文件名
pub const COMPARISON_FILE_NAME: &str = "month_comparison.csv";

/// 一次导出写出的文件
#[derive(Debug, Clone, Default)]
pub struct ExportManifest {
    pub report: PathBuf,
    pub year_sheets: Vec<PathBuf>,
    pub comparison: PathBuf,
}

/// 写出 JSON 报告 (pretty)
pub fn write_report_json<W: Write>(writer: W, run: &BudgetRun) -> ExportResult<()> {
    serde_json::to_writer_pretty(writer, run)?;
    Ok(())
}

/// 导出运行结果的全部文件
pub fn export_run(dir: &Path, run: &BudgetRun) -> ExportResult<ExportManifest> {
    std::fs::create_dir_all(dir)?;

    let report = dir.join(REPORT_FILE_NAME);
    let mut writer = BufWriter::new(File::create(&report)?);
    write_report_json(&mut writer, run)?;
    writer.flush()?;

    let year_sheets = write_year_sheets(dir, &run.combined)?;

    let comparison = dir.join(COMPARISON_FILE_NAME);
    let rows: Vec<_> = (1..=12).flat_map(|month| run.month_comparison(month)).collect();
    write_month_comparison(File::create(&comparison)?, &rows)?;

    tracing::info!(
        run_id = %run.run_id,
        dir = %dir.display(),
        files = year_sheets.len() + 2,
        "运行结果已导出"
    );

    Ok(ExportManifest {
        report,
        year_sheets,
        comparison,
    })
}
