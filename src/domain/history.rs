// ==========================================
// 零售预算预测系统 - 历史数据表
// ==========================================
// 加载层输出, 预测引擎与质量评估的唯一输入
// 加载完成后只读, 可被多次预测调用共享
// ==========================================

use crate::domain::record::HistoricalRecord;
use crate::domain::types::LoadNotice;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryTable {
    /// 第一个历史年度
    pub first_year: i32,
    /// 第二个历史年度 (预测基准年)
    pub second_year: i32,
    /// 按 (年, 月, 主品类) 排序的记录
    pub records: Vec<HistoricalRecord>,
    /// 加载过程中产生的提示事件
    pub notices: Vec<LoadNotice>,
}

impl HistoryTable {
    /// 构造并按 (年, 月, 主品类) 排序
    pub fn new(
        first_year: i32,
        second_year: i32,
        mut records: Vec<HistoricalRecord>,
        notices: Vec<LoadNotice>,
    ) -> Self {
        records.sort_by(|a, b| {
            (a.year, a.month, a.main_group.as_str()).cmp(&(b.year, b.month, b.main_group.as_str()))
        });
        Self {
            first_year,
            second_year,
            records,
            notices,
        }
    }

    /// 指定年度的记录
    pub fn year_records(&self, year: i32) -> impl Iterator<Item = &HistoricalRecord> {
        self.records.iter().filter(move |r| r.year == year)
    }

    /// 基准年 (第二年) 记录
    pub fn base_records(&self) -> impl Iterator<Item = &HistoricalRecord> {
        self.year_records(self.second_year)
    }

    /// 指定年度的销售合计
    pub fn total_sales(&self, year: i32) -> f64 {
        self.year_records(year).map(|r| r.sales).sum()
    }

    /// 全部主品类 (去重, 排序)
    pub fn main_groups(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|r| r.main_group.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}
