//! Request handlers

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::info;

use super::error::ApiError;
use super::staging::read_upload_form;
use super::state::AppState;
use crate::relay::{self, HealthReport, RemoteTarget};

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub status: String,
    pub remote_path: String,
}

/// `POST /upload`
pub async fn upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let params = state.settings.connection_parameters()?;
    let form = read_upload_form(multipart).await?;
    let target = RemoteTarget::new(params.share_name.clone(), form.requested_path()?)?;

    info!(
        "Upload request: {} bytes to {} (overwrite={})",
        form.file.size,
        target.remote_path(),
        form.overwrite
    );

    let connector = state.connector.as_ref();
    let local_path = form.file.path();
    relay::with_retry("upload", &state.retry, || {
        relay::upload(connector, &params, local_path, &target, form.overwrite)
    })
    .await?;

    Ok(Json(UploadResponse {
        status: "ok".to_string(),
        remote_path: target.remote_path().to_string(),
    }))
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Response {
    let params = match state.settings.connection_parameters() {
        Ok(params) => params,
        Err(e) => {
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthReport::not_configured(e.to_string())),
            )
                .into_response()
        }
    };

    let result = relay::probe(state.connector.as_ref(), &params).await;
    let status = if result.healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(HealthReport::from(&result))).into_response()
}
