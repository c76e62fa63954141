// ==========================================
// 零售预算预测系统 - 命令行入口
// ==========================================
// 用法:
//   budget-forecast <workbook> [params.json] [--out DIR] [--config FILE]
//                   [--locale en|tr|zh-CN] [--log-format text|json]
//
// 报告 (JSON) 输出到 stdout, 日志输出到 stderr
// ==========================================

use anyhow::{Context, Result};
use budget_forecast::config::{read_json_file, ConfigManager};
use budget_forecast::logging::{self, LogFormat};
use budget_forecast::{export, i18n, BudgetPlanner, ForecastParams, HistoryLoader};
use clap::builder::PossibleValuesParser;
use clap::Parser;
use std::path::PathBuf;

/// 零售预算预测: 两年历史 → 下一年度 月 × 主品类 预测
#[derive(Debug, Parser)]
#[command(name = "budget-forecast", version, about)]
struct Cli {
    /// 源文件 (xlsx / xls / csv)
    workbook: PathBuf,

    /// 预测参数 JSON (缺省时使用默认参数)
    params: Option<PathBuf>,

    /// 导出目录 (report.json / 年度 CSV / 月度对比 CSV)
    #[arg(long = "out", value_name = "DIR")]
    out_dir: Option<PathBuf>,

    /// 配置文件 (缺省时按 $BUDGET_FORECAST_CONFIG / 用户配置目录 / 默认值)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// 提示文本语言
    #[arg(long, value_parser = PossibleValuesParser::new(i18n::SUPPORTED_LOCALES))]
    locale: Option<String>,

    /// 日志格式
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_with_format(cli.log_format);

    if let Some(locale) = &cli.locale {
        i18n::set_locale(locale);
    }

    tracing::info!("{} v{}", budget_forecast::APP_NAME, budget_forecast::VERSION);

    // 1. 配置
    let manager = match &cli.config {
        Some(path) => ConfigManager::with_path(path),
        None => ConfigManager::new(),
    };
    let config = manager.load().context("加载配置失败")?;

    // 2. 参数
    let params: ForecastParams = match &cli.params {
        Some(path) => read_json_file(path).context("读取预测参数失败")?,
        None => ForecastParams::default(),
    };

    // 3. 加载历史数据
    let history = HistoryLoader::new(config.clone())
        .load_file(&cli.workbook)
        .with_context(|| format!("加载源文件失败: {}", cli.workbook.display()))?;

    for notice in &history.notices {
        tracing::warn!(notice = ?notice, "{}", notice.message());
    }

    // 4. 预算运行
    let run = BudgetPlanner::new(config)
        .run(&history, &params)
        .context("预算运行失败")?;

    tracing::info!(
        forecast_year = run.forecast_year,
        confidence = run.quality.confidence_level.as_str(),
        "{}",
        run.headline()
    );

    // 5. 输出
    if let Some(dir) = &cli.out_dir {
        let manifest = export::export_run(dir, &run).context("导出失败")?;
        tracing::info!(report = %manifest.report.display(), "报告已写出");
    }

    let stdout = std::io::stdout();
    export::write_report_json(stdout.lock(), &run).context("报告输出失败")?;
    println!();

    Ok(())
}
