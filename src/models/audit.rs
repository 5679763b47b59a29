//! Audit log query models.

use serde::{Deserialize, Serialize};

use crate::entities::audit_logs;

fn default_limit() -> u64 {
    100
}

/// Query params for GET /bank-logs.
#[derive(Debug, Clone, Deserialize)]
pub struct AuditLogQuery {
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

/// Page of audit log entries, newest first.
#[derive(Debug, Clone, Serialize)]
pub struct AuditLogsResponse {
    pub logs: Vec<audit_logs::Model>,
    pub count: usize,
    pub limit: u64,
    pub offset: u64,
}
