//! Derived report views over cleaned records.
//!
//! Every function is pure and returns an empty collection for empty input.
//! Grouping goes through `BTreeMap`s, so keys are visited in ascending order;
//! that order decides ties (first key wins) for champions, rankings and
//! top-N selection.

use std::collections::BTreeMap;

use crate::models::{
    ChampionRecord, CompositionBreakdown, CompositionRow, MonthlyAggregate, OrderRecord,
    RankedTotal, SalesDetailRecord, TrendPoint, TrendSeries,
};
use crate::services::normalizer::OTHER_CATEGORY;

/// Categories below this share of a dealer's sales are merged into "Other".
pub const MINOR_SHARE_PERCENT: f64 = 5.0;

pub fn monthly_sales_trend(records: &[SalesDetailRecord]) -> Vec<MonthlyAggregate> {
    let mut by_month: BTreeMap<String, (f64, f64)> = BTreeMap::new();
    for record in records {
        let entry = by_month.entry(record.month()).or_insert((0.0, 0.0));
        entry.0 += record.sale_amount;
        entry.1 += record.performance_amount;
    }

    by_month
        .into_iter()
        .map(|(month, (sale_amount, performance_amount))| MonthlyAggregate {
            month,
            sale_amount,
            performance_amount,
        })
        .collect()
}

pub fn monthly_dealer_champions(orders: &[OrderRecord]) -> Vec<ChampionRecord> {
    monthly_champions(
        orders
            .iter()
            .map(|o| (o.month(), o.store_name.as_str(), o.paid_amount)),
    )
}

pub fn monthly_product_champions(records: &[SalesDetailRecord]) -> Vec<ChampionRecord> {
    monthly_champions(
        records
            .iter()
            .map(|r| (r.month(), r.category.as_str(), r.sale_amount)),
    )
}

fn monthly_champions<'a>(
    rows: impl Iterator<Item = (String, &'a str, f64)>,
) -> Vec<ChampionRecord> {
    let mut sums: BTreeMap<(String, &str), f64> = BTreeMap::new();
    for (month, name, amount) in rows {
        *sums.entry((month, name)).or_insert(0.0) += amount;
    }

    let mut champions: Vec<ChampionRecord> = Vec::new();
    for ((month, name), amount) in sums {
        match champions.last_mut() {
            Some(best) if best.month == month => {
                if amount > best.amount {
                    best.name = name.to_string();
                    best.amount = amount;
                }
            }
            _ => champions.push(ChampionRecord {
                month,
                name: name.to_string(),
                amount,
            }),
        }
    }
    champions
}

pub fn dealer_sales_ranking(orders: &[OrderRecord]) -> Vec<RankedTotal> {
    rank_totals(orders.iter().map(|o| (o.store_name.as_str(), o.paid_amount)))
}

pub fn product_sales_ranking(records: &[SalesDetailRecord]) -> Vec<RankedTotal> {
    rank_totals(
        records
            .iter()
            .map(|r| (r.category.as_str(), r.sale_amount)),
    )
}

/// Sum per key and rank descending. The sort is stable, so equal totals keep
/// ascending key order and ranks run 1..=len without gaps.
fn rank_totals<'a>(rows: impl Iterator<Item = (&'a str, f64)>) -> Vec<RankedTotal> {
    let mut sums: BTreeMap<&str, f64> = BTreeMap::new();
    for (name, amount) in rows {
        *sums.entry(name).or_insert(0.0) += amount;
    }

    let mut totals: Vec<(&str, f64)> = sums.into_iter().collect();
    totals.sort_by(|a, b| b.1.total_cmp(&a.1));

    totals
        .into_iter()
        .enumerate()
        .map(|(i, (name, amount))| RankedTotal {
            name: name.to_string(),
            amount,
            rank: i + 1,
        })
        .collect()
}

fn top_keys<'a>(rows: impl Iterator<Item = (&'a str, f64)>, top_n: usize) -> Vec<String> {
    rank_totals(rows)
        .into_iter()
        .take(top_n)
        .map(|r| r.name)
        .collect()
}

pub fn top_dealers_monthly_trend(orders: &[OrderRecord], top_n: usize) -> Vec<TrendSeries> {
    let dealers = top_keys(
        orders.iter().map(|o| (o.store_name.as_str(), o.paid_amount)),
        top_n,
    );

    dealers
        .into_iter()
        .map(|dealer| {
            let points = monthly_series(
                orders
                    .iter()
                    .filter(|o| o.store_name == dealer)
                    .map(|o| (o.month(), o.paid_amount)),
            );
            TrendSeries {
                name: dealer,
                points,
            }
        })
        .collect()
}

pub fn top_products_monthly_trend(
    records: &[SalesDetailRecord],
    top_n: usize,
) -> Vec<TrendSeries> {
    let products = top_keys(
        records
            .iter()
            .map(|r| (r.category.as_str(), r.sale_amount)),
        top_n,
    );

    products
        .into_iter()
        .map(|product| {
            let points = monthly_series(
                records
                    .iter()
                    .filter(|r| r.category == product)
                    .map(|r| (r.month(), r.sale_amount)),
            );
            TrendSeries {
                name: product,
                points,
            }
        })
        .collect()
}

fn monthly_series(rows: impl Iterator<Item = (String, f64)>) -> Vec<TrendPoint> {
    let mut by_month: BTreeMap<String, f64> = BTreeMap::new();
    for (month, amount) in rows {
        *by_month.entry(month).or_insert(0.0) += amount;
    }
    by_month
        .into_iter()
        .map(|(month, amount)| TrendPoint { month, amount })
        .collect()
}

/// Category mix of the `top_n` dealers by sales-detail amount, among dealers
/// with a positive net total.
pub fn top_dealers_product_composition(
    records: &[SalesDetailRecord],
    top_n: usize,
) -> Vec<CompositionBreakdown> {
    // Dealers whose returns cancel their sales have no share to split
    let dealers: Vec<String> = rank_totals(
        records
            .iter()
            .map(|r| (r.store_name.as_str(), r.sale_amount)),
    )
    .into_iter()
    .filter(|r| r.amount > 0.0)
    .take(top_n)
    .map(|r| r.name)
    .collect();

    dealers
        .into_iter()
        .map(|dealer| {
            let mut by_category: BTreeMap<&str, f64> = BTreeMap::new();
            for record in records.iter().filter(|r| r.store_name == dealer) {
                *by_category.entry(record.category.as_str()).or_insert(0.0) +=
                    record.sale_amount;
            }
            let rows = composition_rows(by_category);
            CompositionBreakdown { dealer, rows }
        })
        .collect()
}

fn composition_rows(by_category: BTreeMap<&str, f64>) -> Vec<CompositionRow> {
    let total: f64 = by_category.values().sum();

    let mut major: Vec<CompositionRow> = Vec::new();
    let mut minor: Option<CompositionRow> = None;

    for (category, amount) in by_category {
        let percentage = if total != 0.0 {
            amount / total * 100.0
        } else {
            0.0
        };

        if percentage >= MINOR_SHARE_PERCENT {
            major.push(CompositionRow {
                category: category.to_string(),
                amount,
                percentage,
            });
        } else {
            let other = minor.get_or_insert_with(|| CompositionRow {
                category: OTHER_CATEGORY.to_string(),
                amount: 0.0,
                percentage: 0.0,
            });
            other.amount += amount;
            other.percentage += percentage;
        }
    }

    major.extend(minor);
    major.sort_by(|a, b| b.amount.total_cmp(&a.amount));
    major
}
