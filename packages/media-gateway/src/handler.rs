use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::AppState;
use media_core::{PipelineResponse, RetrieveQuery};

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub async fn ingest(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> ApiResponse {
    let authorization = authorization(&headers);
    ApiResponse(state.pipeline.ingest(authorization, &body).await)
}

pub async fn retrieve(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<RetrieveQuery>, QueryRejection>,
) -> ApiResponse {
    // 読めないクエリは name 無しとして扱う
    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => {
            tracing::warn!(error = %rejection, "failed to parse query string");
            RetrieveQuery::default()
        }
    };

    let authorization = authorization(&headers);
    ApiResponse(state.pipeline.retrieve(authorization, query).await)
}

/// ASCII でない Authorization ヘッダは無いものとして扱う
fn authorization(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
}

/// パイプラインの結果をそのまま HTTP レスポンスにする
#[derive(Debug)]
pub struct ApiResponse(pub PipelineResponse);

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        let PipelineResponse {
            status,
            content_type,
            body,
        } = self.0;
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        (status, [(header::CONTENT_TYPE, content_type)], body).into_response()
    }
}
