//! Plain liveness probe, independent of [`x402f_monitoring::SystemHealth`].

use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct LivenessResponse {
    pub status: &'static str,
}

pub async fn liveness() -> Json<LivenessResponse> {
    Json(LivenessResponse { status: "ok" })
}
