use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyAggregate {
    pub month: String,
    pub sale_amount: f64,
    pub performance_amount: f64,
}

/// The key with the highest summed amount within one month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChampionRecord {
    pub month: String,
    pub name: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedTotal {
    pub name: String,
    pub amount: f64,
    pub rank: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub month: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendSeries {
    pub name: String,
    pub points: Vec<TrendPoint>,
}

impl TrendSeries {
    pub fn total(&self) -> f64 {
        self.points.iter().map(|p| p.amount).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompositionRow {
    pub category: String,
    pub amount: f64,
    pub percentage: f64,
}

/// Per-category share of one dealer's sales.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompositionBreakdown {
    pub dealer: String,
    pub rows: Vec<CompositionRow>,
}

impl CompositionBreakdown {
    pub fn total(&self) -> f64 {
        self.rows.iter().map(|r| r.amount).sum()
    }
}
