use crate::infra::{deserialize_optional_date, AppState, ReportSettings};
use agility_points::document::PointsDocument;
use agility_points::error::AppError;
use agility_points::filter::VisibilityFilterState;
use agility_points::report::{PointsReportBuilder, ReportLineView};
use agility_points::runs::{visible_rows, RunColumn, RunComparator, RunRowView};
use agility_points::scoring::{RunEvaluator, ScoringResolver};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Deserialize)]
pub(crate) struct PointsReportRequest {
    pub(crate) document: PointsDocument,
    pub(crate) dog: String,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub(crate) today: Option<NaiveDate>,
    /// Replaces the document's active filter when present.
    #[serde(default)]
    pub(crate) filter: Option<VisibilityFilterState>,
}

#[derive(Debug, Serialize)]
pub(crate) struct PointsReportResponse {
    pub(crate) dog: String,
    pub(crate) today: NaiveDate,
    pub(crate) title: String,
    pub(crate) lines: Vec<ReportLineView>,
    pub(crate) html: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RunsSortRequest {
    pub(crate) document: PointsDocument,
    pub(crate) dog: String,
    #[serde(default)]
    pub(crate) column: Option<RunColumn>,
    #[serde(default)]
    pub(crate) descending: bool,
    #[serde(default)]
    pub(crate) filter: Option<VisibilityFilterState>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RunsSortResponse {
    pub(crate) dog: String,
    pub(crate) columns: Vec<&'static str>,
    pub(crate) rows: Vec<RunRowView>,
}

pub(crate) fn router() -> axum::Router {
    axum::Router::new()
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/points/report",
            axum::routing::post(points_report_endpoint),
        )
        .route("/api/v1/runs/sort", axum::routing::post(runs_sort_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn points_report_endpoint(
    Extension(settings): Extension<ReportSettings>,
    Json(payload): Json<PointsReportRequest>,
) -> Result<Json<PointsReportResponse>, AppError> {
    let PointsReportRequest {
        document,
        dog,
        today,
        filter,
    } = payload;

    let dog = document.dog(&dog)?;
    let state = filter.as_ref().unwrap_or(&document.filter);
    let today = today.unwrap_or_else(|| Local::now().date_naive());

    let report = PointsReportBuilder::new(
        &document.configuration,
        state.filter(),
        settings.scoring,
        settings.report,
    )
    .build(dog, today);

    Ok(Json(PointsReportResponse {
        dog: dog.call_name.clone(),
        today,
        title: report.title(),
        lines: report.views(),
        html: report.html(),
    }))
}

pub(crate) async fn runs_sort_endpoint(
    Extension(settings): Extension<ReportSettings>,
    Json(payload): Json<RunsSortRequest>,
) -> Result<Json<RunsSortResponse>, AppError> {
    let RunsSortRequest {
        document,
        dog,
        column,
        descending,
        filter,
    } = payload;

    let dog = document.dog(&dog)?;
    let state = filter.as_ref().unwrap_or(&document.filter);
    let resolver = ScoringResolver::new(&document.configuration);
    let evaluator = RunEvaluator::new(settings.scoring);

    let mut rows = visible_rows(dog, resolver, &evaluator, state.filter());
    if let Some(column) = column {
        RunComparator::for_column(column, descending).sort(&mut rows);
    }

    let columns = RunColumn::ordered();
    Ok(Json(RunsSortResponse {
        dog: dog.call_name.clone(),
        columns: columns.iter().map(|column| column.label()).collect(),
        rows: rows.iter().map(|row| row.view(&columns)).collect(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    fn document() -> PointsDocument {
        serde_json::from_value(json!({
            "configuration": {
                "venues": [{
                    "name": "AKC",
                    "divisions": [{"name": "Standard", "levels": [{"name": "Novice"}]}],
                    "events": [{
                        "name": "Jumpers",
                        "rules": [{
                            "style": "faults_then_time",
                            "title_points": [{"faults": 0, "points": 1}]
                        }]
                    }]
                }]
            },
            "dogs": [{
                "call_name": "Pip",
                "trials": [{
                    "clubs": [{"name": "Hounds", "venue": "AKC"}],
                    "runs": [
                        {"date": "2024-05-04", "division": "Standard", "level": "Novice",
                         "event": "Jumpers", "judge": "Smith", "q": "qualified",
                         "scoring": {"time": 30, "sct": 40}},
                        {"date": "2024-05-05", "division": "Standard", "level": "Novice",
                         "event": "Jumpers", "judge": "Jones", "q": "not_qualified",
                         "scoring": {"course_faults": 5, "time": 36, "sct": 40}}
                    ]
                }]
            }]
        }))
        .expect("document")
    }

    #[tokio::test]
    async fn points_report_endpoint_returns_line_views() {
        let request = PointsReportRequest {
            document: document(),
            dog: "Pip".to_string(),
            today: NaiveDate::from_ymd_opt(2024, 6, 1),
            filter: None,
        };

        let Json(body) = points_report_endpoint(Extension(ReportSettings::default()), Json(request))
            .await
            .expect("report builds");

        assert_eq!(body.title, "Titling Points 2024-06-01");
        let event = body
            .lines
            .iter()
            .find(|line| line.kind_label == "Event")
            .expect("event line");
        assert_eq!(event.cells.len(), 9);
        assert_eq!(event.cells[4], "2 Runs, 2 Judges");
        assert_eq!(event.cells[6], "1");
        assert!(event.has_details);
        assert!(body.html.contains("<h2>AKC</h2>"));
    }

    #[tokio::test]
    async fn runs_sort_endpoint_orders_rows() {
        let request = RunsSortRequest {
            document: document(),
            dog: "Pip".to_string(),
            column: Some(RunColumn::Judge),
            descending: true,
            filter: None,
        };

        let Json(body) = runs_sort_endpoint(Extension(ReportSettings::default()), Json(request))
            .await
            .expect("rows sort");

        assert_eq!(body.columns.len(), RunColumn::ordered().len());
        let judge = RunColumn::ordered()
            .iter()
            .position(|column| *column == RunColumn::Judge)
            .expect("judge column");
        let judges: Vec<&str> = body
            .rows
            .iter()
            .map(|row| row.cells[judge].as_str())
            .collect();
        assert_eq!(judges, vec!["Smith", "Jones"]);
    }

    #[tokio::test]
    async fn unknown_dog_is_not_found() {
        let app = router().layer(Extension(ReportSettings::default()));
        let body = json!({ "document": document(), "dog": "Rex" });
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/points/report")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let payload: serde_json::Value = serde_json::from_slice(&bytes).expect("json");
        assert_eq!(
            payload["error"],
            "document error: no dog named 'Rex' in document"
        );
    }

    #[tokio::test]
    async fn health_route_reports_ok() {
        let response = router()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }
}
