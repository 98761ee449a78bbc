// HTTP request handlers for the click ingest server

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use ddb2parquet_core::Row;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error, info};

use crate::{AppError, AppState};

/// Body of `POST /clicks`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ClickPayload {
    id: Option<String>,
    button: Option<String>,
    timestamp: Option<String>,
    page_url: Option<String>,
    device: Option<Device>,
    location: Option<Location>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Device {
    device_type: Option<String>,
    platform: Option<String>,
    browser: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Location {
    city: Option<String>,
    country: Option<String>,
}

impl ClickPayload {
    /// Flatten into the stored item; `None` when a required field is missing or empty
    pub(crate) fn into_row(self) -> Option<Row> {
        let id = non_empty(self.id)?;
        let button = non_empty(self.button)?;
        let timestamp = non_empty(self.timestamp)?;
        let page_url = non_empty(self.page_url)?;
        let device = self.device?;
        let location = self.location?;

        let mut row = Row::new()
            .with("id", id)
            .with("button", button)
            .with("timestamp", timestamp)
            .with("pageUrl", page_url);

        let optional = [
            ("deviceType", device.device_type),
            ("platform", device.platform),
            ("browser", device.browser),
            ("city", location.city),
            ("country", location.country),
        ];
        for (name, value) in optional {
            if let Some(value) = value {
                row.insert(name, value);
            }
        }

        Some(row)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// POST /clicks - log one click event
pub(crate) async fn handle_click(
    State(state): State<AppState>,
    body: axum::body::Bytes,
) -> Result<impl IntoResponse, AppError> {
    let payload: ClickPayload = serde_json::from_slice(&body).map_err(|e| {
        debug!(error = %e, "Rejected click body");
        AppError::bad_request("Invalid JSON body")
    })?;

    let row = payload
        .into_row()
        .ok_or_else(|| AppError::bad_request("Missing required fields"))?;
    let id = row.get("id").and_then(|v| v.as_str()).unwrap_or_default().to_string();

    state.store.put_click(row).await.map_err(|e| {
        error!(id = %id, error = %e, "DynamoDB write failed");
        AppError::internal("Could not log click")
    })?;

    info!(id = %id, "Click logged");
    Ok(Json(json!({"message": "Click logged successfully"})))
}

/// GET /health - Basic health check
pub(crate) async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "healthy"})))
}
