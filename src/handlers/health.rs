use axum::Json;
use serde_json::{json, Value};

pub async fn service_banner() -> Json<Value> {
    Json(json!({
        "service": "Offline Payment Bank Service",
        "status": "running",
        "endpoints": {
            "verify": "/verify-ledger",
            "settle": "/settle-ledger",
            "logs": "/bank-logs",
            "key": "/bank-key"
        }
    }))
}
