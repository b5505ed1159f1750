// HTTP error responses with a JSON body
use crate::application::dashboard_service::DashboardError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ApiErrorBody {
    /// Error code for programmatic handling
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ApiErrorBody,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ApiErrorBody {
                code,
                message: message.into(),
            },
        }
    }

    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, code, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }
}

impl From<DashboardError> for ApiError {
    fn from(err: DashboardError) -> Self {
        match err {
            DashboardError::Range(e) => ApiError::bad_request("INVALID_RANGE", e.to_string()),
            DashboardError::Schema(e) => {
                ApiError::new(StatusCode::UNPROCESSABLE_ENTITY, "SCHEMA_ERROR", e.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::{RangeError, SchemaError};
    use crate::domain::record::Column;

    #[test]
    fn test_error_mapping() {
        let err = ApiError::from(DashboardError::Range(RangeError::EmptyDataset));
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.body.code, "INVALID_RANGE");

        let err = ApiError::from(DashboardError::Schema(SchemaError::MissingColumn(
            Column::TempDay,
        )));
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.body.code, "SCHEMA_ERROR");
        assert_eq!(
            err.body.message,
            "required column `temp_day` is missing from the dataset"
        );
    }

    #[test]
    fn test_into_response_status() {
        let response = ApiError::not_found("unknown table `monthly`").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
