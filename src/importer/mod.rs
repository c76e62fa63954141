// ==========================================
// 零售预算预测系统 - 导入层
// ==========================================
// 职责: 双年度源表 → 统一历史表
// 支持: Excel (.xlsx/.xls), CSV
// ==========================================

// 模块声明
pub mod data_cleaner;
pub mod derivation;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod history_loader;

// 重导出核心类型
pub use data_cleaner::{CleanOutcome, DataCleaner};
pub use derivation::DerivationService;
pub use error::{ImportError, ImportResult};
pub use field_mapper::{FieldMapper, MappedRow};
pub use file_parser::{
    dedupe_headers, CsvParser, ExcelParser, FileParser, ParseOptions, RawRow, RawSheet,
    UniversalFileParser,
};
pub use history_loader::HistoryLoader;
