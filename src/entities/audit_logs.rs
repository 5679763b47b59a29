//! SeaORM Entity for the audit_logs table

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "audit_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// "bank", "sender" or "receiver"
    pub actor: String,
    /// Short verb: decrypt_envelope, verify_ledger, settle, reject, ...
    pub action: String,
    pub txn_id: Option<String>,
    /// "success" or "error"
    pub status: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub details: Json,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
