//! Chinese-language summaries of the report views.

use std::collections::BTreeMap;

use crate::models::{ChampionRecord, CompositionBreakdown, MonthlyAggregate, RankedTotal, TrendSeries};

/// Sentinel returned instead of a chart and summary when a view is empty.
pub const NO_DATA: &str = "暂无数据";

/// Champions spread over at most this many entities read as concentrated.
const CONCENTRATED_CHAMPIONS: usize = 3;

/// Amount in 万元 with the raw yuan value, e.g. `1.23万元（12345元）`.
pub fn format_currency(amount: f64) -> String {
    if !amount.is_finite() || amount == 0.0 {
        return "0万元（0元）".to_string();
    }
    format!("{:.2}万元（{:.0}元）", amount / 10000.0, amount)
}

/// Percentage change from the first to the last point; zero when there are
/// fewer than two points or the first is not positive.
pub fn growth_rate(values: &[f64]) -> f64 {
    match (values.first(), values.last()) {
        (Some(&first), Some(&last)) if values.len() > 1 && first > 0.0 => {
            (last - first) / first * 100.0
        }
        _ => 0.0,
    }
}

/// Most frequent name and its count; ties go to the smallest name.
fn mode<'a>(names: impl Iterator<Item = &'a str>) -> Option<(&'a str, usize)> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for name in names {
        *counts.entry(name).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .fold(None, |best, (name, count)| match best {
            Some((_, best_count)) if best_count >= count => best,
            _ => Some((name, count)),
        })
}

pub fn monthly_trend_summary(data: &[MonthlyAggregate]) -> String {
    if data.is_empty() {
        return NO_DATA.to_string();
    }

    let total_sales: f64 = data.iter().map(|m| m.sale_amount).sum();
    let total_performance: f64 = data.iter().map(|m| m.performance_amount).sum();
    let average_sales = total_sales / data.len() as f64;
    let best = data
        .iter()
        .fold(&data[0], |best, m| if m.sale_amount > best.sale_amount { m } else { best });

    format!(
        "整体销售趋势分析：\n\
         - 总销售金额：{}\n\
         - 总业绩额：{}\n\
         - 月均销售金额：{}\n\
         - 销售最高月份：{}，销售额：{}\n\
         - 销售金额与业绩额趋势基本一致，反映了良好的经营状况",
        format_currency(total_sales),
        format_currency(total_performance),
        format_currency(average_sales),
        best.month,
        format_currency(best.sale_amount),
    )
}

/// What a champion or ranking view is about, for wording the summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subject {
    Dealer,
    Product,
}

impl Subject {
    pub fn noun(&self) -> &'static str {
        match self {
            Subject::Dealer => "经销商",
            Subject::Product => "产品",
        }
    }
}

pub fn champions_summary(data: &[ChampionRecord], subject: Subject) -> String {
    let Some((leader, count)) = mode(data.iter().map(|c| c.name.as_str())) else {
        return NO_DATA.to_string();
    };

    let noun = subject.noun();
    let total: f64 = data.iter().map(|c| c.amount).sum();
    let distinct = data
        .iter()
        .map(|c| c.name.as_str())
        .collect::<std::collections::BTreeSet<_>>()
        .len();
    let spread = if distinct <= CONCENTRATED_CHAMPIONS {
        "相对集中"
    } else {
        "相对不集中"
    };
    let leader_label = match subject {
        Subject::Dealer => "销冠",
        Subject::Product => "销冠产品",
    };

    format!(
        "月度销冠{noun}分析：\n\
         - 销冠{noun}总销售额：{}\n\
         - 出现次数最多的{leader_label}：{leader}（{count}次）\n\
         - 共有{distinct}个不同的{noun}成为月度销冠\n\
         - 销冠{noun}分布{spread}",
        format_currency(total),
    )
}

pub fn ranking_summary(data: &[RankedTotal], subject: Subject) -> String {
    let Some(first) = data.first() else {
        return NO_DATA.to_string();
    };

    let noun = subject.noun();
    let total: f64 = data.iter().map(|r| r.amount).sum();
    let top_share = if total > 0.0 {
        first.amount / total * 100.0
    } else {
        0.0
    };
    let top5: f64 = data.iter().take(5).map(|r| r.amount).sum();

    format!(
        "{noun}销售明细分析：\n\
         - 总销售金额：{}\n\
         - 共有{}个{noun}产生销售\n\
         - 排名第一的{noun}：{}\n\
         - 冠军{noun}占比：{:.1}%\n\
         - 前5名{noun}总销售额：{}",
        format_currency(total),
        data.len(),
        first.name,
        top_share,
        format_currency(top5),
    )
}

pub fn trend_series_summary(series: &TrendSeries) -> String {
    let values: Vec<f64> = series.points.iter().map(|p| p.amount).collect();
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);

    format!(
        "{}销售趋势分析：\n\
         - 总销售额：{}\n\
         - 最高月销售额：{}\n\
         - 最低月销售额：{}\n\
         - 销售增长率：{:+.1}%",
        series.name,
        format_currency(series.total()),
        format_currency(max),
        format_currency(min),
        growth_rate(&values),
    )
}

/// Heading for the combined text of several per-key analyses.
pub fn overall_summary(heading: &str, parts: &[String]) -> String {
    if parts.is_empty() {
        return NO_DATA.to_string();
    }
    format!("{}\n{}", heading, parts.join("\n"))
}

pub fn composition_summary(breakdown: &CompositionBreakdown) -> String {
    let diversity = breakdown.rows.len();
    let structure = if diversity >= 5 { "集中" } else { "相对集中" };
    let (top_category, top_share) = breakdown
        .rows
        .first()
        .map(|r| (r.category.as_str(), r.percentage))
        .unwrap_or(("无", 0.0));

    format!(
        "{}产品组成分析：\n\
         - 总销售额：{}\n\
         - 主要产品数量：{}个\n\
         - 主打产品：{}，占比{:.1}%\n\
         - 产品结构{}",
        breakdown.dealer,
        format_currency(breakdown.total()),
        diversity,
        top_category,
        top_share,
        structure,
    )
}
