// HTTP request handlers
use crate::domain::dashboard::TableKind;
use crate::infrastructure::http_response::ApiError;
use crate::infrastructure::json_mapper::{
    dashboard_to_json, dataset_to_json, table_to_json, JsonDashboard, JsonDatasetInfo, JsonTable,
};
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    pub start: Option<String>,
    pub end: Option<String>,
}

impl RangeQuery {
    fn bounds(&self) -> Result<(Option<NaiveDate>, Option<NaiveDate>), ApiError> {
        Ok((parse_bound(self.start.as_deref())?, parse_bound(self.end.as_deref())?))
    }
}

fn parse_bound(raw: Option<&str>) -> Result<Option<NaiveDate>, ApiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d").map(Some).map_err(|_| {
            ApiError::bad_request("INVALID_DATE", format!("expected YYYY-MM-DD, got {s:?}"))
        }),
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Size, span and columns of the loaded dataset
pub async fn dataset_info(State(state): State<Arc<AppState>>) -> Json<JsonDatasetInfo> {
    Json(dataset_to_json(state.dashboard_service.dataset()))
}

/// Every table plus the summary metrics for the requested range
pub async fn get_dashboard(
    Query(query): Query<RangeQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<JsonDashboard>, ApiError> {
    let (start, end) = query.bounds()?;

    match state.dashboard_service.build(start, end) {
        Ok(dashboard) => Ok(Json(dashboard_to_json(dashboard))),
        Err(e) => {
            tracing::warn!("Error building dashboard: {}", e);
            Err(e.into())
        }
    }
}

/// A single table for the requested range
pub async fn get_table(
    Path(name): Path<String>,
    Query(query): Query<RangeQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<JsonTable>, ApiError> {
    let kind = TableKind::from_slug(&name)
        .ok_or_else(|| ApiError::not_found(format!("unknown table `{name}`")))?;
    let (start, end) = query.bounds()?;

    match state.dashboard_service.table(kind, start, end) {
        Ok((range, table)) => Ok(Json(table_to_json(kind, range, table))),
        Err(e) => {
            tracing::warn!("Error building table {}: {}", name, e);
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dashboard_service::DashboardService;
    use crate::domain::dataset::Dataset;
    use crate::domain::record::{Column, Record, Schema};
    use axum::http::StatusCode;

    fn state(schema: Schema) -> State<Arc<AppState>> {
        let records = (1..=3u32)
            .flat_map(|day| {
                (0..2u8).map(move |hour| Record {
                    hour,
                    season: 2,
                    weather: 1,
                    working_day: 1,
                    casual_day: 5.0,
                    registered_day: 7.0 * f64::from(day),
                    cnt_day: 5.0 + 7.0 * f64::from(day),
                    cnt_hour: f64::from(hour),
                    ..Record::on(NaiveDate::from_ymd_opt(2011, 7, day).unwrap())
                })
            })
            .collect();
        let dataset = Arc::new(Dataset::new(records, schema));
        State(Arc::new(AppState {
            dashboard_service: DashboardService::new(dataset, 5),
        }))
    }

    fn query(start: Option<&str>, end: Option<&str>) -> Query<RangeQuery> {
        Query(RangeQuery {
            start: start.map(String::from),
            end: end.map(String::from),
        })
    }

    #[tokio::test]
    async fn test_health_check() {
        assert_eq!(health_check().await, "ok");
    }

    #[tokio::test]
    async fn test_dataset_info() {
        let Json(info) = dataset_info(state(Schema::complete())).await;
        assert_eq!(info.records, 6);
        assert_eq!(info.start.as_deref(), Some("2011-07-01"));
        assert_eq!(info.end.as_deref(), Some("2011-07-03"));
        assert!(info.missing_columns.is_empty());
    }

    #[tokio::test]
    async fn test_dashboard_full_span() {
        let Json(dashboard) = get_dashboard(query(None, None), state(Schema::complete()))
            .await
            .unwrap();

        assert_eq!(dashboard.record_count, 6);
        assert_eq!(dashboard.tables.len(), 8);
        assert_eq!(dashboard.summary.peak_day.as_deref(), Some("2011-07-03"));
        assert_eq!(dashboard.summary.total_casual, 30.0);
        assert_eq!(dashboard.tables[0].id, "daily");
    }

    #[tokio::test]
    async fn test_dashboard_range() {
        let Json(dashboard) = get_dashboard(
            query(Some("2011-07-02"), Some("2011-07-02")),
            state(Schema::complete()),
        )
        .await
        .unwrap();

        assert_eq!(dashboard.record_count, 2);
        assert_eq!(dashboard.range.start, "2011-07-02");
        assert_eq!(dashboard.summary.total_registered, 28.0);
    }

    #[tokio::test]
    async fn test_dashboard_bad_requests() {
        let err = get_dashboard(query(Some("07/02/2011"), None), state(Schema::complete()))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.body.code, "INVALID_DATE");

        let err = get_dashboard(
            query(Some("2011-07-03"), Some("2011-07-01")),
            state(Schema::complete()),
        )
        .await
        .unwrap_err();
        assert_eq!(err.body.code, "INVALID_RANGE");
    }

    #[tokio::test]
    async fn test_dashboard_schema_error() {
        let schema = Schema::new(Column::ALL.into_iter().filter(|c| *c != Column::CntHour));
        let err = get_dashboard(query(None, None), state(schema))
            .await
            .unwrap_err();

        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.body.code, "SCHEMA_ERROR");
    }

    #[tokio::test]
    async fn test_get_table() {
        let Json(table) = get_table(
            Path("seasonal".to_string()),
            query(None, None),
            state(Schema::complete()),
        )
        .await
        .unwrap();

        assert_eq!(table.id, "seasonal");
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].label, Some("Summer"));
        assert_eq!(table.rows[0].values, vec![30.0, 84.0, 114.0]);
    }

    #[tokio::test]
    async fn test_get_unknown_table() {
        let err = get_table(
            Path("monthly".to_string()),
            query(None, None),
            state(Schema::complete()),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }
}
