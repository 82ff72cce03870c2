use std::fmt;
use std::str::FromStr;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::date_utils::DateRange;
use crate::error::{AppError, AppResult};
use crate::services::aggregation;
use crate::services::data_access::SalesRepository;
use crate::services::presentation::{self, ChartEntry, MultiView, SingleView};
use crate::services::summary::Subject;
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisType {
    OverallTrend,
    MonthlyChampionDealer,
    MonthlyChampionProduct,
    DealerSalesDetails,
    ProductSalesDetails,
    TopDealersTrend,
    TopProductsTrend,
    DealerProductComposition,
}

impl AnalysisType {
    pub const ALL: [AnalysisType; 8] = [
        AnalysisType::OverallTrend,
        AnalysisType::MonthlyChampionDealer,
        AnalysisType::DealerSalesDetails,
        AnalysisType::TopDealersTrend,
        AnalysisType::DealerProductComposition,
        AnalysisType::ProductSalesDetails,
        AnalysisType::MonthlyChampionProduct,
        AnalysisType::TopProductsTrend,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisType::OverallTrend => "overall_trend",
            AnalysisType::MonthlyChampionDealer => "monthly_champion_dealer",
            AnalysisType::MonthlyChampionProduct => "monthly_champion_product",
            AnalysisType::DealerSalesDetails => "dealer_sales_details",
            AnalysisType::ProductSalesDetails => "product_sales_details",
            AnalysisType::TopDealersTrend => "top_dealers_trend",
            AnalysisType::TopProductsTrend => "top_products_trend",
            AnalysisType::DealerProductComposition => "dealer_product_composition",
        }
    }

    /// Menu label on the dashboard page.
    pub fn label(&self) -> &'static str {
        match self {
            AnalysisType::OverallTrend => "整体销售趋势",
            AnalysisType::MonthlyChampionDealer => "月度销冠经销商",
            AnalysisType::MonthlyChampionProduct => "月度销冠产品",
            AnalysisType::DealerSalesDetails => "经销商销售明细",
            AnalysisType::ProductSalesDetails => "产品销售明细",
            AnalysisType::TopDealersTrend => "前五名经销商逐月变化",
            AnalysisType::TopProductsTrend => "前五名产品逐月变化",
            AnalysisType::DealerProductComposition => "经销商产品组成",
        }
    }
}

impl fmt::Display for AnalysisType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AnalysisType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| AppError::Validation(format!("未知的分析类型: {}", s)))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub analysis_type: Option<String>,
    #[serde(default)]
    pub top_n: Option<usize>,
}

/// A validated analysis request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisParams {
    pub range: DateRange,
    pub analysis_type: AnalysisType,
    pub top_n: usize,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl AnalyzeRequest {
    /// Check required fields first, then date format, then the type name.
    pub fn validate(&self, default_top_n: usize) -> AppResult<AnalysisParams> {
        let (Some(start), Some(end), Some(kind)) = (
            non_empty(&self.start_date),
            non_empty(&self.end_date),
            non_empty(&self.analysis_type),
        ) else {
            return Err(AppError::missing_params());
        };

        let range = DateRange::parse(start, end)
            .map_err(|value| AppError::Validation(format!("日期格式错误: {}", value)))?;
        let analysis_type = kind.parse()?;

        Ok(AnalysisParams {
            range,
            analysis_type,
            top_n: self.top_n.unwrap_or(default_top_n),
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnalysisResponse {
    SingleChart {
        chart: Option<String>,
        analysis: String,
        table_data: serde_json::Value,
    },
    MultipleCharts {
        charts: Vec<ChartEntry>,
        analysis: String,
    },
}

impl AnalysisResponse {
    fn single<T: Serialize>(view: SingleView, rows: &[T]) -> AppResult<Self> {
        let table_data = serde_json::to_value(rows)
            .map_err(|e| AppError::Internal(format!("Failed to encode table data: {}", e)))?;
        Ok(AnalysisResponse::SingleChart {
            chart: view.chart,
            analysis: view.analysis,
            table_data,
        })
    }

    fn multiple(view: MultiView) -> Self {
        AnalysisResponse::MultipleCharts {
            charts: view.charts,
            analysis: view.analysis,
        }
    }
}

pub async fn analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> AppResult<Json<AnalysisResponse>> {
    let Json(request) =
        payload.map_err(|e| AppError::Validation(format!("请求格式错误: {}", e.body_text())))?;
    let params = request.validate(state.config.top_n)?;

    info!(
        analysis_type = %params.analysis_type,
        from = %params.range.from,
        to = %params.range.to,
        top_n = params.top_n,
        "Running analysis"
    );

    // Store queries and chart rendering are blocking
    let repo = state.repo.clone();
    let response = tokio::task::spawn_blocking(move || run_analysis(&repo, &params)).await??;

    Ok(Json(response))
}

/// Fetch, aggregate and present one analysis.
pub fn run_analysis(repo: &SalesRepository, params: &AnalysisParams) -> AppResult<AnalysisResponse> {
    let range = params.range;
    let top_n = params.top_n;

    let response = match params.analysis_type {
        AnalysisType::OverallTrend => {
            let data = aggregation::monthly_sales_trend(&repo.fetch_sales_details(range)?);
            AnalysisResponse::single(presentation::monthly_trend_view(&data)?, &data)?
        }
        AnalysisType::MonthlyChampionDealer => {
            let data = aggregation::monthly_dealer_champions(&repo.fetch_orders(range)?);
            let view = presentation::champions_view(&data, Subject::Dealer)?;
            AnalysisResponse::single(view, &data)?
        }
        AnalysisType::MonthlyChampionProduct => {
            let data = aggregation::monthly_product_champions(&repo.fetch_sales_details(range)?);
            let view = presentation::champions_view(&data, Subject::Product)?;
            AnalysisResponse::single(view, &data)?
        }
        AnalysisType::DealerSalesDetails => {
            let data = aggregation::dealer_sales_ranking(&repo.fetch_orders(range)?);
            let view = presentation::ranking_view(&data, Subject::Dealer)?;
            AnalysisResponse::single(view, &data)?
        }
        AnalysisType::ProductSalesDetails => {
            let data = aggregation::product_sales_ranking(&repo.fetch_sales_details(range)?);
            let view = presentation::ranking_view(&data, Subject::Product)?;
            AnalysisResponse::single(view, &data)?
        }
        AnalysisType::TopDealersTrend => {
            let data = aggregation::top_dealers_monthly_trend(&repo.fetch_orders(range)?, top_n);
            AnalysisResponse::multiple(presentation::trend_views(&data, Subject::Dealer, top_n)?)
        }
        AnalysisType::TopProductsTrend => {
            let records = repo.fetch_sales_details(range)?;
            let data = aggregation::top_products_monthly_trend(&records, top_n);
            AnalysisResponse::multiple(presentation::trend_views(&data, Subject::Product, top_n)?)
        }
        AnalysisType::DealerProductComposition => {
            let records = repo.fetch_sales_details(range)?;
            let data = aggregation::top_dealers_product_composition(&records, top_n);
            AnalysisResponse::multiple(presentation::composition_views(&data, top_n)?)
        }
    };

    debug!(analysis_type = %params.analysis_type, "Analysis complete");
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MISSING_PARAMS_MESSAGE;

    fn request(start: &str, end: &str, kind: &str) -> AnalyzeRequest {
        AnalyzeRequest {
            start_date: Some(start.into()),
            end_date: Some(end.into()),
            analysis_type: Some(kind.into()),
            top_n: None,
        }
    }

    #[test]
    fn test_analysis_type_names_round_trip() {
        for kind in AnalysisType::ALL {
            assert_eq!(kind.as_str().parse::<AnalysisType>().unwrap(), kind);
        }
        assert!("sales_forecast".parse::<AnalysisType>().is_err());
    }

    #[test]
    fn test_validate_missing_fields() {
        for req in [
            AnalyzeRequest::default(),
            request("", "2024-01-31", "overall_trend"),
            request("2024-01-01", "  ", "overall_trend"),
            request("2024-01-01", "2024-01-31", ""),
        ] {
            let err = req.validate(5).unwrap_err();
            assert_eq!(err.to_string(), MISSING_PARAMS_MESSAGE);
        }
    }

    #[test]
    fn test_validate_bad_date_before_bad_type() {
        let err = request("2024-13-01", "2024-01-31", "nope").validate(5).unwrap_err();
        assert_eq!(err.to_string(), "日期格式错误: 2024-13-01");

        let err = request("2024-01-01", "2024-01-31", "nope").validate(5).unwrap_err();
        assert_eq!(err.to_string(), "未知的分析类型: nope");
    }

    #[test]
    fn test_validate_top_n_override() {
        let params = request("2024-01-01", "2024-01-31", "top_dealers_trend")
            .validate(5)
            .unwrap();
        assert_eq!(params.top_n, 5);
        assert_eq!(params.analysis_type, AnalysisType::TopDealersTrend);

        let params = AnalyzeRequest {
            top_n: Some(3),
            ..request("2024-01-01", "2024-01-31", "top_dealers_trend")
        }
        .validate(5)
        .unwrap();
        assert_eq!(params.top_n, 3);
    }

    #[test]
    fn test_response_type_tags() {
        let single = AnalysisResponse::single(
            SingleView {
                chart: None,
                analysis: "暂无数据".into(),
            },
            &Vec::<u32>::new(),
        )
        .unwrap();
        let value = serde_json::to_value(&single).unwrap();
        assert_eq!(value["type"], "single_chart");
        assert!(value["chart"].is_null());
        assert_eq!(value["table_data"], serde_json::json!([]));

        let multi = AnalysisResponse::multiple(MultiView {
            charts: Vec::new(),
            analysis: "暂无数据".into(),
        });
        let value = serde_json::to_value(&multi).unwrap();
        assert_eq!(value["type"], "multiple_charts");
        assert_eq!(value["charts"], serde_json::json!([]));
    }
}
