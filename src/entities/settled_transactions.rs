//! SeaORM Entity for the settled_transactions table
//!
//! One row per settled txn_id, created exactly once, never mutated. The
//! primary key doubles as the replay/double-spend guard.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "settled_transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub txn_id: String,
    pub wallet_id: String,
    pub from_user_id: String,
    pub to_user_id: String,
    #[sea_orm(column_type = "Decimal(Some((20, 2)))")]
    pub amount: Decimal,
    pub ledger_index: i64,
    /// Merchant that submitted the ledger containing this transaction
    pub receiver_id: String,
    pub settled_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::wallets::Entity",
        from = "Column::WalletId",
        to = "super::wallets::Column::WalletId"
    )]
    Wallets,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::FromUserId",
        to = "super::users::Column::UserId"
    )]
    Users,
}

impl Related<super::wallets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Wallets.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
