//! Chart images and summaries for each report view.
//!
//! Every view short-circuits on empty input: no chart is rendered and the
//! summary is the [`NO_DATA`] sentinel.

use serde::Serialize;

use crate::error::AppResult;
use crate::models::{ChampionRecord, CompositionBreakdown, MonthlyAggregate, RankedTotal, TrendSeries};
use crate::services::charts::{
    self, Bar, BarChart, ChartSize, LinePanel, Slice, CHAMPION_COLOR, DEALER_COLOR, PERFORMANCE_COLOR,
    PRODUCT_COLOR, SALES_COLOR, TREND_COLOR,
};
use crate::services::summary::{self, format_currency, Subject, NO_DATA};

/// Rankings chart only the leading rows to keep bars readable.
pub const RANKING_CHART_ROWS: usize = 20;

const TEN_THOUSAND: f64 = 10000.0;

const TREND_SIZE: ChartSize = ChartSize::new(1200, 1000);
const CHAMPION_SIZE: ChartSize = ChartSize::new(1400, 800);
const RANKING_SIZE: ChartSize = ChartSize::new(1500, 800);
const SERIES_SIZE: ChartSize = ChartSize::new(1000, 600);
const PIE_SIZE: ChartSize = ChartSize::new(1000, 800);

const MONTH_AXIS: &str = "月份";
const SALES_AXIS: &str = "销售金额（万元）";

/// A view with one chart. `chart` is `None` when there is no data.
#[derive(Debug, Clone, Serialize)]
pub struct SingleView {
    pub chart: Option<String>,
    pub analysis: String,
}

impl SingleView {
    fn empty() -> Self {
        Self {
            chart: None,
            analysis: NO_DATA.to_string(),
        }
    }
}

/// One chart of a multi-chart view, keyed by dealer or product.
#[derive(Debug, Clone, Serialize)]
pub struct ChartEntry {
    pub name: String,
    pub chart: String,
    pub analysis: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MultiView {
    pub charts: Vec<ChartEntry>,
    pub analysis: String,
}

impl MultiView {
    fn from_entries(heading: &str, charts: Vec<ChartEntry>) -> Self {
        let parts: Vec<String> = charts.iter().map(|c| c.analysis.clone()).collect();
        Self {
            analysis: summary::overall_summary(heading, &parts),
            charts,
        }
    }
}

fn in_ten_thousands(amount: f64) -> f64 {
    amount / TEN_THOUSAND
}

/// "前五名" for small counts, "前12名" beyond ten.
fn top_phrase(top_n: usize) -> String {
    const NUMERALS: [&str; 10] = ["一", "二", "三", "四", "五", "六", "七", "八", "九", "十"];
    match top_n {
        1..=10 => format!("前{}名", NUMERALS[top_n - 1]),
        n => format!("前{}名", n),
    }
}

pub fn monthly_trend_view(data: &[MonthlyAggregate]) -> AppResult<SingleView> {
    if data.is_empty() {
        return Ok(SingleView::empty());
    }

    let sales: Vec<(String, f64)> = data
        .iter()
        .map(|m| (m.month.clone(), in_ten_thousands(m.sale_amount)))
        .collect();
    let performance: Vec<(String, f64)> = data
        .iter()
        .map(|m| (m.month.clone(), in_ten_thousands(m.performance_amount)))
        .collect();

    let chart = charts::stacked_line_chart(
        TREND_SIZE,
        &LinePanel {
            title: "每月销售金额趋势",
            x_desc: "",
            y_desc: SALES_AXIS,
            points: &sales,
            color: SALES_COLOR,
        },
        &LinePanel {
            title: "每月业绩额趋势",
            x_desc: MONTH_AXIS,
            y_desc: "业绩额（万元）",
            points: &performance,
            color: PERFORMANCE_COLOR,
        },
    )?;

    Ok(SingleView {
        chart: Some(chart),
        analysis: summary::monthly_trend_summary(data),
    })
}

/// Bar per month labelled with the value and the winning dealer or product.
pub fn champions_view(data: &[ChampionRecord], subject: Subject) -> AppResult<SingleView> {
    if data.is_empty() {
        return Ok(SingleView::empty());
    }

    let bars: Vec<Bar> = data
        .iter()
        .map(|c| {
            let value = in_ten_thousands(c.amount);
            Bar {
                label: c.month.clone(),
                value,
                annotation: format!("{:.1} {}", value, c.name),
            }
        })
        .collect();
    let title = format!("月度销冠{}销售情况", subject.noun());

    let chart = charts::bar_chart(
        CHAMPION_SIZE,
        &BarChart {
            title: &title,
            x_desc: MONTH_AXIS,
            y_desc: SALES_AXIS,
            bars: &bars,
            color: CHAMPION_COLOR,
        },
    )?;

    Ok(SingleView {
        chart: Some(chart),
        analysis: summary::champions_summary(data, subject),
    })
}

pub fn ranking_view(data: &[RankedTotal], subject: Subject) -> AppResult<SingleView> {
    if data.is_empty() {
        return Ok(SingleView::empty());
    }

    let bars: Vec<Bar> = data
        .iter()
        .take(RANKING_CHART_ROWS)
        .map(|r| {
            let value = in_ten_thousands(r.amount);
            Bar {
                label: r.name.clone(),
                value,
                annotation: format!("{:.1}", value),
            }
        })
        .collect();
    let noun = subject.noun();
    let title = format!("{}销售金额排名（前{}名）", noun, RANKING_CHART_ROWS);
    let x_desc = format!("{}名称", noun);
    let color = match subject {
        Subject::Dealer => DEALER_COLOR,
        Subject::Product => PRODUCT_COLOR,
    };

    let chart = charts::bar_chart(
        RANKING_SIZE,
        &BarChart {
            title: &title,
            x_desc: &x_desc,
            y_desc: SALES_AXIS,
            bars: &bars,
            color,
        },
    )?;

    Ok(SingleView {
        chart: Some(chart),
        analysis: summary::ranking_summary(data, subject),
    })
}

/// One line chart per series, in series order.
pub fn trend_views(series: &[TrendSeries], subject: Subject, top_n: usize) -> AppResult<MultiView> {
    if series.is_empty() {
        return Ok(MultiView {
            charts: Vec::new(),
            analysis: NO_DATA.to_string(),
        });
    }

    let mut entries = Vec::with_capacity(series.len());
    for s in series {
        let points: Vec<(String, f64)> = s
            .points
            .iter()
            .map(|p| (p.month.clone(), in_ten_thousands(p.amount)))
            .collect();
        let title = format!("{} - 月度销售趋势", s.name);

        let chart = charts::line_chart(
            SERIES_SIZE,
            &LinePanel {
                title: &title,
                x_desc: MONTH_AXIS,
                y_desc: SALES_AXIS,
                points: &points,
                color: TREND_COLOR,
            },
        )?;

        entries.push(ChartEntry {
            name: s.name.clone(),
            chart,
            analysis: summary::trend_series_summary(s),
        });
    }

    let heading = format!("{}{}逐月变化分析：", top_phrase(top_n), subject.noun());
    Ok(MultiView::from_entries(&heading, entries))
}

/// One pie chart per dealer with the dealer total in the title.
pub fn composition_views(breakdowns: &[CompositionBreakdown], top_n: usize) -> AppResult<MultiView> {
    if breakdowns.is_empty() {
        return Ok(MultiView {
            charts: Vec::new(),
            analysis: NO_DATA.to_string(),
        });
    }

    let mut entries = Vec::with_capacity(breakdowns.len());
    for breakdown in breakdowns {
        let slices: Vec<Slice> = breakdown
            .rows
            .iter()
            .map(|r| Slice {
                label: r.category.clone(),
                value: r.amount,
                percentage: r.percentage,
            })
            .collect();
        let title = format!(
            "{} - 产品组成分析 总销售额：{}",
            breakdown.dealer,
            format_currency(breakdown.total())
        );

        let chart = charts::pie_chart(PIE_SIZE, &title, &slices)?;

        entries.push(ChartEntry {
            name: breakdown.dealer.clone(),
            chart,
            analysis: summary::composition_summary(breakdown),
        });
    }

    let heading = format!("{}经销商产品组成分析：", top_phrase(top_n));
    Ok(MultiView::from_entries(&heading, entries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CompositionRow, TrendPoint};

    fn series(name: &str, amounts: &[f64]) -> TrendSeries {
        TrendSeries {
            name: name.into(),
            points: amounts
                .iter()
                .enumerate()
                .map(|(i, a)| TrendPoint {
                    month: format!("2024-{:02}", i + 1),
                    amount: *a,
                })
                .collect(),
        }
    }

    #[test]
    fn test_top_phrase() {
        assert_eq!(top_phrase(5), "前五名");
        assert_eq!(top_phrase(3), "前三名");
        assert_eq!(top_phrase(12), "前12名");
    }

    #[test]
    fn test_empty_views_render_nothing() {
        let view = monthly_trend_view(&[]).unwrap();
        assert!(view.chart.is_none());
        assert_eq!(view.analysis, NO_DATA);

        assert!(champions_view(&[], Subject::Dealer).unwrap().chart.is_none());
        assert!(ranking_view(&[], Subject::Product).unwrap().chart.is_none());

        let multi = trend_views(&[], Subject::Dealer, 5).unwrap();
        assert!(multi.charts.is_empty());
        assert_eq!(multi.analysis, NO_DATA);

        let multi = composition_views(&[], 5).unwrap();
        assert!(multi.charts.is_empty());
        assert_eq!(multi.analysis, NO_DATA);
    }

    #[test]
    fn test_ranking_view_renders_chart() {
        let data: Vec<RankedTotal> = (0..25)
            .map(|i| RankedTotal {
                name: format!("店{}", i),
                amount: 1000.0 * (25 - i) as f64,
                rank: i + 1,
            })
            .collect();
        let view = ranking_view(&data, Subject::Dealer).unwrap();
        assert!(view.chart.is_some_and(|c| !c.is_empty()));
        assert!(view.analysis.contains("共有25个经销商产生销售"));
    }

    #[test]
    fn test_trend_views_one_chart_per_series() {
        let data = vec![series("A店", &[100.0, 200.0]), series("B店", &[50.0])];
        let view = trend_views(&data, Subject::Dealer, 5).unwrap();

        let names: Vec<&str> = view.charts.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["A店", "B店"]);
        assert!(view.analysis.starts_with("前五名经销商逐月变化分析："));
        assert!(view.analysis.contains("A店销售趋势分析"));
        assert!(view.analysis.contains("B店销售趋势分析"));
    }

    #[test]
    fn test_composition_views() {
        let data = vec![CompositionBreakdown {
            dealer: "A店".into(),
            rows: vec![
                CompositionRow {
                    category: "雷力海德丰".into(),
                    amount: 600.0,
                    percentage: 60.0,
                },
                CompositionRow {
                    category: "雷力大美收".into(),
                    amount: 400.0,
                    percentage: 40.0,
                },
            ],
        }];
        let view = composition_views(&data, 5).unwrap();
        assert_eq!(view.charts.len(), 1);
        assert!(view.analysis.starts_with("前五名经销商产品组成分析："));
    }
}
