//! SeaORM Entity for the users table
//!
//! Provisioned by the admin console; read-only from the settlement core.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    pub full_name: String,
    pub email_or_phone: String,
    /// "sender" or "receiver"
    pub role: String,
    /// User-visible bank identifier; transactions carry this as from_id/to_id
    pub bank_id: String,
    /// ECDSA public key in JWK form
    #[sea_orm(column_type = "JsonBinary")]
    pub public_key: Json,
    pub kyc_status: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::wallets::Entity")]
    Wallets,
}

impl Related<super::wallets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Wallets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
