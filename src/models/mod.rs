pub mod report;
pub mod sales;

pub use report::{
    ChampionRecord, CompositionBreakdown, CompositionRow, MonthlyAggregate, RankedTotal,
    TrendPoint, TrendSeries,
};
pub use sales::{OrderRecord, SalesDetailRecord, ORDER_STATUSES, SALES_DETAIL_STATUSES};
