pub mod calendar;
pub mod status;
pub mod weather;

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// All dashboard endpoints.
pub fn router(state: AppState) -> Router {
    // The kiosk page may be served from a different origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(calendar::router())
        .merge(weather::router())
        .merge(status::router())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Standard API error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Converts errors into JSON responses, 500 unless a status is given
pub struct AppError {
    status: StatusCode,
    error: anyhow::Error,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        AppError {
            status: StatusCode::BAD_REQUEST,
            error: anyhow::anyhow!(message.into()),
        }
    }

    /// Data not fetched yet, or its last refresh failed with nothing cached.
    pub fn unavailable(message: impl Into<String>) -> Self {
        AppError {
            status: StatusCode::SERVICE_UNAVAILABLE,
            error: anyhow::anyhow!(message.into()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: format!("{:#}", self.error),
        });
        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        AppError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error: err.into(),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;
    use wallcal_core::config::DashboardConfig;

    use super::router;
    use crate::state::AppState;

    pub fn state(config: &str) -> AppState {
        let config = DashboardConfig::from_toml(config).expect("Test config should parse");
        AppState::new(config, chrono_tz::America::Chicago)
    }

    pub fn default_state() -> AppState {
        state(r#"feed_url = "https://example.com/basic.ics""#)
    }

    /// GET `uri` and return the status and body text.
    pub async fn get(state: &AppState, uri: &str) -> (StatusCode, String) {
        let response = router(state.clone())
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    pub async fn get_json(state: &AppState, uri: &str) -> (StatusCode, serde_json::Value) {
        let (status, body) = get(state, uri).await;
        (status, serde_json::from_str(&body).expect("Response should be JSON"))
    }
}
