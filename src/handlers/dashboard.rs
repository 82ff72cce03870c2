use askama::Template;
use axum::extract::State;
use axum::response::Html;
use tracing::debug;

use crate::error::{AppResult, RenderHtml};
use crate::handlers::analyze::AnalysisType;
use crate::state::AppState;
use crate::VERSION;

pub struct AnalysisOption {
    pub id: &'static str,
    pub label: &'static str,
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct DashboardTemplate {
    pub title: String,
    pub version: &'static str,
    pub analyses: Vec<AnalysisOption>,
    pub default_start: String,
    pub default_end: String,
}

pub async fn index(State(state): State<AppState>) -> AppResult<Html<String>> {
    debug!(top_n = state.config.top_n, "Loading dashboard");

    let today = chrono::Local::now().date_naive();
    let year_start = today.format("%Y-01-01").to_string();

    let template = DashboardTemplate {
        title: "销售数据分析".into(),
        version: VERSION,
        analyses: AnalysisType::ALL
            .iter()
            .map(|t| AnalysisOption {
                id: t.as_str(),
                label: t.label(),
            })
            .collect(),
        default_start: year_start,
        default_end: today.format("%Y-%m-%d").to_string(),
    };

    template.render_html()
}
