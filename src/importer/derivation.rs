// ==========================================
// 零售预算预测系统 - 字段派生服务实现
// ==========================================
// 职责: cogs / stock_cogs_ratio 派生 + 12 月补全
// ==========================================

use crate::config::BackfillRule;
use crate::domain::{HistoricalRecord, LoadNotice, RecordSource};

pub struct DerivationService {
    rule: BackfillRule,
}

impl DerivationService {
    pub fn new(rule: BackfillRule) -> Self {
        Self { rule }
    }

    /// 重新派生全部记录的 cogs / stock_cogs_ratio
    ///
    /// # 规则
    /// - cogs = sales - gross_profit (源文件中的成本列一律忽略)
    /// - stock_cogs_ratio = stock / cogs (cogs <= 0 时为 0)
    pub fn derive_all(&self, records: &mut [HistoricalRecord]) {
        for record in records.iter_mut() {
            record.recompute_derived();
        }
    }

    /// 12 月补全
    ///
    /// # 规则
    /// - 触发: 指定年度无 12 月, 或 12 月销售合计 < materiality_threshold
    /// - 来源: 同年 11 月 (只看上一个月, 不做插值)
    /// - sales / gross_profit / cogs × flow_multiplier, stock × stock_multiplier
    /// - 原有 12 月记录整体替换
    ///
    /// # 返回
    /// - None: 无需补全或规则未启用
    /// - Some(notice): 已补全, 或需要补全但 11 月缺失
    pub fn backfill_december(
        &self,
        records: &mut Vec<HistoricalRecord>,
        year: i32,
    ) -> Option<LoadNotice> {
        if !self.rule.enabled {
            return None;
        }

        let december: Vec<&HistoricalRecord> = records
            .iter()
            .filter(|r| r.year == year && r.month == 12)
            .collect();
        let december_total: f64 = december.iter().map(|r| r.sales).sum();
        let previous_total = if december.is_empty() {
            None
        } else {
            Some(december_total)
        };

        if previous_total.is_some() && december_total >= self.rule.materiality_threshold {
            return None;
        }

        let synthesized: Vec<HistoricalRecord> = records
            .iter()
            .filter(|r| r.year == year && r.month == 11)
            .map(|november| self.scale_from_november(november))
            .collect();

        if synthesized.is_empty() {
            tracing::warn!(year, "12 月需要补全, 但 11 月数据缺失, 跳过");
            return Some(LoadNotice::DecemberBackfillSkipped { year });
        }

        records.retain(|r| !(r.year == year && r.month == 12));
        let groups = synthesized.len();
        records.extend(synthesized);

        tracing::warn!(
            year,
            groups,
            previous_total = ?previous_total,
            multiplier = self.rule.flow_multiplier,
            "12 月数据缺失或过低, 已由 11 月推算补全"
        );

        Some(LoadNotice::DecemberBackfilled {
            year,
            groups,
            previous_total,
        })
    }

    /// 由 11 月记录推算 12 月记录
    ///
    /// cogs 由缩放后的 sales / gross_profit 重新派生, 与 cogs × 乘数 等价
    fn scale_from_november(&self, november: &HistoricalRecord) -> HistoricalRecord {
        HistoricalRecord::new(
            november.year,
            12,
            november.main_group.clone(),
            november.sales * self.rule.flow_multiplier,
            november.gross_profit * self.rule.flow_multiplier,
            november.gross_margin_pct,
            november.stock * self.rule.stock_multiplier,
            RecordSource::Backfilled,
        )
    }
}
