// ==========================================
// 零售预算预测系统 - 历史数据加载器
// ==========================================
// 导入流程:
// 0. 文件读取与解析 (xlsx/xls/csv)
// 1. 表头校验 (缺列 → SchemaError)
// 2. 小计行剔除
// 3. 双年度字段映射 + 类型转换
// 4. 清洗 (月份 / 主品类 / 缺失数值补 0)
// 5. cogs / stock_cogs_ratio 派生
// 6. 12 月补全
// 7. 空数据校验 (→ NoDataError)
// ==========================================

use crate::config::ForecastConfig;
use crate::domain::{HistoryTable, LoadNotice};
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::derivation::DerivationService;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::FieldMapper;
use crate::importer::file_parser::{ParseOptions, RawSheet, UniversalFileParser};
use std::path::Path;
use std::time::Instant;

pub struct HistoryLoader {
    config: ForecastConfig,
}

impl HistoryLoader {
    pub fn new(config: ForecastConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// 从文件加载历史数据
    pub fn load_file<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<HistoryTable> {
        let path = file_path.as_ref();
        let started = Instant::now();

        let options = ParseOptions {
            sheet_name: self.config.source.sheet_name.clone(),
            header_row: self.config.source.header_row,
        };
        let sheet = UniversalFileParser.parse(path, &options)?;

        tracing::info!(
            file = %path.display(),
            rows = sheet.rows.len(),
            columns = sheet.headers.len(),
            "源文件解析完成"
        );

        let table = self.load_sheet(sheet)?;

        tracing::info!(
            records = table.len(),
            groups = table.main_groups().len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "历史数据加载完成"
        );
        Ok(table)
    }

    /// 从已解析的原始表加载历史数据
    pub fn load_sheet(&self, sheet: RawSheet) -> ImportResult<HistoryTable> {
        let source = &self.config.source;
        let mapper = FieldMapper::new(source);
        let cleaner = DataCleaner::new(&source.month_column, &source.subtotal_marker);
        let deriver = DerivationService::new(self.config.backfill);

        // 1. 表头校验
        mapper.check_schema(&sheet)?;

        let mut notices = Vec::new();

        // 2. 小计行剔除
        let (rows, subtotal_count) = cleaner.drop_subtotal_rows(sheet.rows);
        if subtotal_count > 0 {
            notices.push(LoadNotice::SubtotalRowsDropped {
                count: subtotal_count,
            });
        }

        // 3. 字段映射
        let mapped = mapper.map_rows(&rows)?;

        // 4. 清洗
        let outcome = cleaner.clean(mapped);
        let mut records = outcome.records;
        notices.extend(outcome.notices);

        if records.is_empty() {
            return Err(ImportError::NoDataError(
                "清洗后没有任何带主品类的有效记录".to_string(),
            ));
        }

        // 5. 派生字段
        deriver.derive_all(&mut records);

        // 6. 12 月补全 (仅第二个历史年度)
        if let Some(notice) = deriver.backfill_december(&mut records, source.second.year) {
            notices.push(notice);
        }

        // 12 月补全已在派生服务中记录
        for notice in &notices {
            match notice {
                LoadNotice::DecemberBackfilled { .. } | LoadNotice::DecemberBackfillSkipped { .. } => {}
                _ => tracing::warn!(notice = ?notice, "源数据行已剔除"),
            }
        }

        Ok(HistoryTable::new(
            source.first.year,
            source.second.year,
            records,
            notices,
        ))
    }
}
