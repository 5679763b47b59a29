//! Append-only audit log.
//!
//! `append` is generic over the connection so settlement-success entries
//! share the engine's transaction (and roll back with it), while failure
//! entries are written on the plain connection and stay durable.

use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, QueryOrder,
    QuerySelect, Set,
};
use serde_json::Value;

use crate::entities::{audit_logs, prelude::*};

pub mod actors {
    pub const BANK: &str = "bank";
    pub const SENDER: &str = "sender";
    pub const RECEIVER: &str = "receiver";
}

pub mod actions {
    pub const DECRYPT_ENVELOPE: &str = "decrypt_envelope";
    pub const VERIFY_LEDGER: &str = "verify_ledger";
    pub const SETTLE: &str = "settle";
    pub const SETTLE_LEDGER: &str = "settle_ledger";
    pub const REJECT: &str = "reject";
}

pub mod statuses {
    pub const SUCCESS: &str = "success";
    pub const ERROR: &str = "error";
}

/// Append one audit entry, returning its id.
pub async fn append<C: ConnectionTrait>(
    conn: &C,
    actor: &str,
    action: &str,
    txn_id: Option<&str>,
    status: &str,
    details: Value,
) -> Result<i32, DbErr> {
    let row = audit_logs::ActiveModel {
        actor: Set(actor.to_string()),
        action: Set(action.to_string()),
        txn_id: Set(txn_id.map(str::to_string)),
        status: Set(status.to_string()),
        details: Set(details),
        ..Default::default()
    };
    let model = row.insert(conn).await?;
    Ok(model.id)
}

/// Page of audit entries, newest first.
pub async fn list(
    db: &DatabaseConnection,
    limit: u64,
    offset: u64,
) -> Result<Vec<audit_logs::Model>, DbErr> {
    AuditLogs::find()
        .order_by_desc(audit_logs::Column::CreatedAt)
        .order_by_desc(audit_logs::Column::Id)
        .limit(limit)
        .offset(offset)
        .all(db)
        .await
}
