//! Audit log query endpoint.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};

use crate::models::audit::{AuditLogQuery, AuditLogsResponse};
use crate::models::settlement::ErrorResponse;
use crate::services::audit;
use crate::AppState;

/// Hard cap on one page of audit entries.
const MAX_PAGE_SIZE: u64 = 1000;

pub async fn get_bank_logs(
    State(state): State<AppState>,
    Query(query): Query<AuditLogQuery>,
) -> Result<Json<AuditLogsResponse>, (StatusCode, Json<ErrorResponse>)> {
    let limit = query.limit.min(MAX_PAGE_SIZE);

    let logs = audit::list(&state.db, limit, query.offset)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Failed to retrieve logs: {}", e),
                }),
            )
        })?;

    Ok(Json(AuditLogsResponse {
        count: logs.len(),
        logs,
        limit,
        offset: query.offset,
    }))
}
