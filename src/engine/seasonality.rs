// ==========================================
// 零售预算预测系统 - 季节指数
// ==========================================
// 定义: index(品类, 月) = 该品类该月平均销售额 / 该品类全部月份平均销售额
// 口径: 两个历史年度全部记录
// 红线: 缺失 (品类, 月) 或全年均值为 0 时指数为 1.0, 指数不为负
// ==========================================

use crate::domain::HistoricalRecord;
use std::collections::BTreeMap;

/// 中性季节指数
pub const NEUTRAL_INDEX: f64 = 1.0;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeasonalityTable {
    indices: BTreeMap<(String, u32), f64>,
}

impl SeasonalityTable {
    /// 由历史记录计算季节指数
    pub fn from_history<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a HistoricalRecord>,
    {
        // 品类 → 月份 → (销售合计, 记录数)
        let mut by_group: BTreeMap<&str, BTreeMap<u32, (f64, usize)>> = BTreeMap::new();
        for record in records {
            let slot = by_group
                .entry(record.main_group.as_str())
                .or_default()
                .entry(record.month)
                .or_insert((0.0, 0));
            slot.0 += record.sales;
            slot.1 += 1;
        }

        let mut indices = BTreeMap::new();
        for (group, months) in by_group {
            let (total, count) = months
                .values()
                .fold((0.0, 0usize), |(s, n), (ms, mn)| (s + ms, n + mn));
            let overall_avg = if count > 0 { total / count as f64 } else { 0.0 };

            for (month, (sum, n)) in months {
                let index = if overall_avg > 0.0 && n > 0 {
                    (sum / n as f64 / overall_avg).max(0.0)
                } else {
                    NEUTRAL_INDEX
                };
                indices.insert((group.to_string(), month), index);
            }
        }

        tracing::debug!(entries = indices.len(), "季节指数计算完成");
        Self { indices }
    }

    /// 查询季节指数 (缺失时为 1.0)
    pub fn index(&self, main_group: &str, month: u32) -> f64 {
        self.indices
            .get(&(main_group.to_string(), month))
            .copied()
            .unwrap_or(NEUTRAL_INDEX)
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RecordSource;

    fn record(year: i32, month: u32, group: &str, sales: f64) -> HistoricalRecord {
        HistoricalRecord::new(year, month, group, sales, 0.0, 0.0, 0.0, RecordSource::Actual)
    }

    #[test]
    fn test_index_is_month_mean_over_overall_mean() {
        let records = vec![
            record(2024, 1, "A", 100.0),
            record(2025, 1, "A", 300.0),
            record(2024, 2, "A", 400.0),
            record(2025, 2, "A", 400.0),
        ];
        let table = SeasonalityTable::from_history(&records);

        // 全部均值 300; 1 月均值 200, 2 月均值 400
        assert!((table.index("A", 1) - 200.0 / 300.0).abs() < 1e-12);
        assert!((table.index("A", 2) - 400.0 / 300.0).abs() < 1e-12);
    }

    #[test]
    fn test_missing_pair_is_neutral() {
        let records = vec![record(2024, 1, "A", 100.0)];
        let table = SeasonalityTable::from_history(&records);

        assert_eq!(table.index("A", 7), 1.0);
        assert_eq!(table.index("Z", 1), 1.0);
    }

    #[test]
    fn test_zero_average_is_neutral() {
        let records = vec![record(2024, 1, "A", 0.0), record(2024, 2, "A", 0.0)];
        let table = SeasonalityTable::from_history(&records);

        assert_eq!(table.index("A", 1), 1.0);
        assert_eq!(table.index("A", 2), 1.0);
    }

    #[test]
    fn test_negative_average_is_neutral() {
        let records = vec![record(2024, 1, "A", -300.0), record(2024, 2, "A", 100.0)];
        let table = SeasonalityTable::from_history(&records);

        assert_eq!(table.index("A", 1), 1.0);
        assert_eq!(table.index("A", 2), 1.0);
    }

    #[test]
    fn test_index_never_negative() {
        let records = vec![record(2024, 1, "A", -50.0), record(2024, 2, "A", 150.0)];
        let table = SeasonalityTable::from_history(&records);

        assert_eq!(table.index("A", 1), 0.0);
        assert!(table.index("A", 2) > 0.0);
    }
}
